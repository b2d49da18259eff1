/// SOAP 1.1 envelope construction for XMLA `Execute`
///
/// The MDX statement travels in a CDATA section so XML-significant characters
/// in the query need no escaping. Output format is fixed to `Tabular` (flat
/// `row` elements), not the multidimensional axis format.

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XMLA_NS: &str = "urn:schemas-microsoft-com:xml-analysis";
const RESULT_FORMAT: &str = "Tabular";

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Wrap text in CDATA, splitting any `]]>` so it cannot close the section early
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

pub fn build_execute_envelope(mdx: &str, catalog: Option<&str>) -> String {
    let mut sb = String::with_capacity(512 + mdx.len());
    sb.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    sb.push_str(&format!(
        "<soap:Envelope xmlns:soap=\"{}\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\">\n",
        SOAP_ENV_NS
    ));
    sb.push_str("<soap:Body>\n");
    sb.push_str(&format!("<Execute xmlns=\"{}\">\n", XMLA_NS));
    sb.push_str("<Command>\n<Statement>");
    sb.push_str(&cdata(mdx));
    sb.push_str("</Statement>\n</Command>\n");
    sb.push_str("<Properties>\n<PropertyList>\n");
    if let Some(catalog) = catalog.filter(|c| !c.trim().is_empty()) {
        sb.push_str(&format!("<Catalog>{}</Catalog>\n", escape_xml(catalog)));
    }
    sb.push_str(&format!("<Format>{}</Format>\n", RESULT_FORMAT));
    sb.push_str("</PropertyList>\n</Properties>\n");
    sb.push_str("</Execute>\n</soap:Body>\n</soap:Envelope>");
    sb
}
