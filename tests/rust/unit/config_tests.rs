//! Unit tests for YAML configuration loading
//!
//! Environment-driven loading is covered next to `GatewayConfig` itself.

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use cubegate::config::{ConfigError, GatewayConfig};

    fn yaml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_full_yaml_config() {
        let file = yaml_file(
            r#"
http_host: 127.0.0.1
http_port: 9000
allowed_columns: "Region, Product, Sales"
max_filters: 5
request_timeout_secs: 15
clickhouse:
  url: http://localhost:8123
  user: analyst
  password: secret
  database: sales
  cube_view: vw_olap_cube
xmla:
  endpoint_url: http://olap.local/xmla
  catalog: Adventure Works
  username: olap
"#,
        );

        let config = GatewayConfig::from_yaml_file(file.path()).unwrap();

        assert_eq!(config.http_host, "127.0.0.1");
        assert_eq!(config.max_filters, 5);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.allowed_columns().len(), 3);

        let clickhouse = config.clickhouse.unwrap();
        assert_eq!(clickhouse.cube_view, "vw_olap_cube");
        assert_eq!(clickhouse.sql_timeout_secs, 30);

        let xmla = config.xmla.unwrap();
        assert_eq!(xmla.catalog, "Adventure Works");
        assert_eq!(xmla.password, None);
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let file = yaml_file("clickhouse:\n  url: http://localhost:8123\n");

        let config = GatewayConfig::from_yaml_file(file.path()).unwrap();

        assert_eq!(config.http_host, "0.0.0.0");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.max_filters, 3);
        assert!(config.allowed_columns().is_unrestricted());

        let clickhouse = config.clickhouse.unwrap();
        assert_eq!(clickhouse.user, "default");
        assert_eq!(clickhouse.database, "default");
        assert_eq!(clickhouse.cube_view, "cube_view");
        assert_eq!(clickhouse.password, "");
    }

    #[test]
    fn test_yaml_without_backend_fails_validation() {
        let file = yaml_file("http_port: 9000\n");
        assert!(matches!(
            GatewayConfig::from_yaml_file(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_yaml_xmla_with_blank_catalog_fails_validation() {
        let file = yaml_file("xmla:\n  endpoint_url: http://olap.local/xmla\n  catalog: \"\"\n");
        assert!(matches!(
            GatewayConfig::from_yaml_file(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_yaml_out_of_range_timeout_fails_validation() {
        let file = yaml_file(
            "request_timeout_secs: 7200\nclickhouse:\n  url: http://localhost:8123\n",
        );
        assert!(matches!(
            GatewayConfig::from_yaml_file(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let file = yaml_file("http_port: [not, a, port]\n");
        assert!(matches!(
            GatewayConfig::from_yaml_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
