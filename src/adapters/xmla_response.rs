//! XMLA tabular response parsing
//!
//! The parser is hardened against XXE: DOCTYPE declarations are rejected and
//! only the five predefined XML entities plus character references are
//! expanded, so external or custom entity references fail the parse. Names
//! are taken verbatim (namespace-unaware), matching the unqualified element
//! names of the tabular rowset format.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use crate::query_port::OlapError;
use crate::result_model::{AggregationResponse, AggregationRow};

const ROW_ELEMENT: &str = "row";

/// Deepest element nesting accepted; the tree is walked recursively
const MAX_DEPTH: usize = 256;

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug)]
struct Element {
    name: String,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        self.append_text(&mut out);
        out
    }

    fn append_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.append_text(out),
            }
        }
    }

    /// Depth-first search in document order
    fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(pred))
    }
}

fn parse_error(message: impl Into<String>) -> OlapError {
    OlapError::parse(format!("Error parsing XMLA response: {}", message.into()))
}

/// Parse a complete document into an element tree
fn parse_document(xml: &str) -> Result<Element, OlapError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    fn attach(
        element: Element,
        stack: &mut [Element],
        root: &mut Option<Element>,
    ) -> Result<(), OlapError> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(Node::Element(element));
            Ok(())
        } else if root.is_some() {
            Err(parse_error("multiple root elements"))
        } else {
            *root = Some(element);
            Ok(())
        }
    }

    fn push_text(text: String, stack: &mut [Element]) -> Result<(), OlapError> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(Node::Text(text));
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(parse_error("text content outside the root element")),
        }
    }

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(parse_error("multiple root elements"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(parse_error(format!(
                        "elements nested deeper than {}",
                        MAX_DEPTH
                    )));
                }
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Ok(Event::Empty(empty)) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                attach(Element::new(name), &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| parse_error("unexpected closing tag"))?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| parse_error(format!("at position {}: {}", position, e)))?;
                push_text(text.into_owned(), &mut stack)?;
            }
            Ok(Event::CData(data)) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| parse_error(format!("invalid UTF-8 in CDATA: {}", e)))?;
                push_text(text.to_owned(), &mut stack)?;
            }
            Ok(Event::DocType(_)) => {
                return Err(parse_error("DOCTYPE declarations are not allowed"));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(parse_error(format!("at position {}: {}", position, e)));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(parse_error(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| parse_error("document has no root element"))
}

fn collect_rows(element: &Element, rows: &mut Vec<AggregationRow>) {
    if element.name == ROW_ELEMENT {
        rows.push(AggregationRow::new(
            element
                .child_elements()
                .map(|col| (col.name.clone(), Value::String(col.text_content()))),
        ));
    }
    for child in element.child_elements() {
        collect_rows(child, rows);
    }
}

fn find_fault_string(root: &Element) -> Option<String> {
    let fault = root.find(&|el: &Element| el.local_name() == "Fault")?;
    let text = fault
        .find(&|el: &Element| el.local_name() == "faultstring")
        .map(Element::text_content)
        .unwrap_or_else(|| fault.text_content());
    Some(text.trim().to_string())
}

/// Extract the SOAP `faultstring` from a body, if it is a well-formed fault
pub fn fault_string(body: &str) -> Option<String> {
    parse_document(body)
        .ok()
        .and_then(|root| find_fault_string(&root))
}

/// Turn every `row` element into an [`AggregationRow`].
///
/// Each direct element child of a row is one column; its text content becomes
/// a string value without numeric coercion. A blank body is an empty result.
pub fn parse_rows(xml: &str) -> Result<AggregationResponse, OlapError> {
    if xml.trim().is_empty() {
        return Ok(AggregationResponse::empty());
    }

    let root = parse_document(xml)?;
    let mut rows = Vec::new();
    collect_rows(&root, &mut rows);

    if rows.is_empty() {
        if let Some(fault) = find_fault_string(&root) {
            return Err(OlapError::backend(format!("XMLA fault: {}", fault)));
        }
    }

    Ok(AggregationResponse::new(rows))
}
