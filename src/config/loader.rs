//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::FilterServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<FilterServerConfig, ConfigError> {
    let config: FilterServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<FilterServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FilterKind;
    use crate::mapping::DispatchPhase;

    const SAMPLE: &str = r#"
        [listener]
        bind_address = "127.0.0.1:9000"

        [[filters]]
        name = "failed"
        kind = "failed_request"

        [[filters]]
        name = "csrf"
        kind = "csrf_prevention"
        [filters.params]
        entry_points = "/, /login"
        nonce_cache_size = "7"

        [[mappings]]
        filter = "failed"
        url_patterns = ["*"]

        [[mappings]]
        filter = "csrf"
        url_patterns = ["/account/*", "*.do"]
        dispatchers = ["REQUEST", "forward"]

        [[servlets]]
        name = "transfer"
        url_patterns = ["/account/transfer"]
    "#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[1].kind, FilterKind::CsrfPrevention);
        assert!(config.filters[1].is_strict());
        assert!(!config.filters[0].is_strict());
        assert_eq!(config.filters[1].params["nonce_cache_size"], "7");
        assert_eq!(config.mappings[1].dispatchers, vec!["REQUEST", "forward"]);
        assert_eq!(config.session.cookie_name, "SESSIONID");

        let mapping = crate::config::validation::build_mapping(&config.mappings[1]).unwrap();
        assert!(mapping.dispatch_types().contains(DispatchPhase::Forward));
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let err = parse_config("[[filters]]\nname = \"x\"\nkind = \"gzip\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config("[[mappings]]\nfilter = \"ghost\"\nurl_patterns = [\"\"]\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
