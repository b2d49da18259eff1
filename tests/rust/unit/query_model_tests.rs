//! Unit tests for the query entity and the tabular result model

#[cfg(test)]
mod query_model_tests {
    use std::collections::HashMap;

    use cubegate::query_port::{OlapError, Query, QueryParams, QueryType};
    use cubegate::result_model::{AggregationResponse, AggregationRow};
    use serde_json::json;

    #[test]
    fn test_query_type_from_untyped_tag() {
        assert_eq!("sql".parse::<QueryType>().unwrap(), QueryType::Sql);
        assert_eq!(" Mdx ".parse::<QueryType>().unwrap(), QueryType::Mdx);
        assert!(matches!(
            "dax".parse::<QueryType>(),
            Err(OlapError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_query_parameters_are_copied() {
        let mut params: QueryParams = HashMap::new();
        params.insert("year".to_string(), json!(2024));

        let query = Query::new("SELECT 1", QueryType::Sql, Some(&params)).unwrap();
        params.insert("region".to_string(), json!("EMEA"));

        assert_eq!(query.parameters().len(), 1);
        assert!(query.has_parameters());
    }

    #[test]
    fn test_mdx_port_text_is_prefixed_once() {
        let query = Query::new("SELECT {} ON 0 FROM [Sales]", QueryType::Mdx, None).unwrap();
        assert_eq!(query.port_text(), "MDX: SELECT {} ON 0 FROM [Sales]");

        let already =
            Query::new("MDX: SELECT {} ON 0 FROM [Sales]", QueryType::Mdx, None).unwrap();
        assert_eq!(already.port_text(), "MDX: SELECT {} ON 0 FROM [Sales]");

        let sql = Query::new("SELECT 1", QueryType::Sql, None).unwrap();
        assert_eq!(sql.port_text(), "SELECT 1");
    }

    #[test]
    fn test_row_is_isolated_from_source_map() {
        let mut source = HashMap::new();
        source.insert("Region".to_string(), json!("EMEA"));

        let row = AggregationRow::from_map(&source);
        source.insert("Sales".to_string(), json!(1));

        assert_eq!(row.len(), 1);
        assert!(!row.has("Sales"));
        assert_eq!(row.to_map().get("Region"), Some(&json!("EMEA")));
    }

    #[test]
    fn test_response_json_shape() {
        let response = AggregationResponse::new([AggregationRow::new([
            ("Region", json!("EMEA")),
            ("Sales", json!(1000)),
        ])]);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"rows": [{"values": {"Region": "EMEA", "Sales": 1000}}]})
        );
        assert!(AggregationResponse::empty().is_empty());
    }
}
