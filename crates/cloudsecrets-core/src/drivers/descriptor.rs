//! Descriptor parsing shared by drivers
//!
//! A descriptor is a YAML mapping with a string `name` and a `spec` mapping.
//! The spec is backend specific: each driver decodes it into its own type
//! with [`decode_spec`].

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use super::traits::{DriverError, DriverResult};

/// Name and raw spec of a descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub name: String,
    pub spec: Mapping,
}

/// Parse the document and pull out `name` and `spec`
pub fn parse_descriptor(driver: &str, raw: &[u8]) -> DriverResult<Descriptor> {
    let document = parse_document(driver, raw)?;

    let name = match document.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        _ => {
            return Err(DriverError::MissingName {
                driver: driver.to_string(),
            })
        }
    };

    let spec = match document.get("spec") {
        Some(Value::Mapping(spec)) => spec.clone(),
        _ => {
            return Err(DriverError::MissingSpec {
                driver: driver.to_string(),
                name,
            })
        }
    };

    Ok(Descriptor { name, spec })
}

/// Parse raw bytes into a top-level mapping
pub fn parse_document(driver: &str, raw: &[u8]) -> DriverResult<Mapping> {
    let text = std::str::from_utf8(raw).map_err(|e| DriverError::Document {
        driver: driver.to_string(),
        detail: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
    })?;
    let document: Value = serde_yaml::from_str(text).map_err(|e| DriverError::Document {
        driver: driver.to_string(),
        detail: resolve_yaml_error(text, &e),
    })?;

    match document {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(DriverError::Document {
            driver: driver.to_string(),
            detail: "document must be a mapping".to_string(),
        }),
    }
}

/// Re-serialize `spec` and decode it strictly into `T`
///
/// Errors point at the offending line of the re-serialized spec.
pub fn decode_spec<T: DeserializeOwned>(driver: &str, name: &str, spec: &Mapping) -> DriverResult<T> {
    let invalid = |detail: String| DriverError::InvalidSpec {
        driver: driver.to_string(),
        name: name.to_string(),
        detail,
    };

    let text = serde_yaml::to_string(spec).map_err(|e| invalid(e.to_string()))?;
    serde_yaml::from_str(&text).map_err(|e| invalid(resolve_yaml_error(&text, &e)))
}

/// Render a YAML error together with the source line it points at
pub fn resolve_yaml_error(source: &str, err: &serde_yaml::Error) -> String {
    let Some(location) = err.location() else {
        return err.to_string();
    };

    let line_no = location.line();
    let Some(line) = source.lines().nth(line_no.saturating_sub(1)) else {
        return err.to_string();
    };

    let gutter = format!("{:>4} | ", line_no);
    let caret = format!("{}^", " ".repeat(gutter.len() + location.column().saturating_sub(1)));
    format!("{}\n{}{}\n{}", err, gutter, line, caret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    const DRIVER: &str = "test_driver";

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Spec {
        path: String,
        #[serde(default)]
        retries: u32,
    }

    #[test]
    fn test_parse_descriptor() {
        let raw = b"name: db-pass\nkind: Secret\nspec:\n  path: a/b\n";
        let descriptor = parse_descriptor(DRIVER, raw).unwrap();
        assert_eq!(descriptor.name, "db-pass");
        assert_eq!(descriptor.spec.get("path"), Some(&Value::String("a/b".to_string())));
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_descriptor(DRIVER, b"name: [unclosed").unwrap_err();
        assert!(matches!(err, DriverError::Document { .. }));

        let err = parse_descriptor(DRIVER, b"- just\n- a list\n").unwrap_err();
        assert!(err.to_string().contains("document must be a mapping"));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = parse_document(DRIVER, b"name: db-\xffpass\nspec: {}\n").unwrap_err();
        assert!(matches!(err, DriverError::Document { .. }));
        assert!(err.to_string().contains("invalid UTF-8 at byte 9"), "{}", err);
    }

    #[test]
    fn test_name_must_be_a_string() {
        let cases: [&[u8]; 3] = [b"spec: {}\n", b"name: 42\nspec: {}\n", b"name: ''\nspec: {}\n"];
        for raw in cases {
            let err = parse_descriptor(DRIVER, raw).unwrap_err();
            assert_eq!(err.to_string(), "test_driver: secret must contain string field 'name'");
        }
    }

    #[test]
    fn test_spec_must_be_a_mapping() {
        let err = parse_descriptor(DRIVER, b"name: db-pass\n").unwrap_err();
        assert_eq!(err.to_string(), "test_driver: secret 'db-pass' must contain field 'spec'");

        let err = parse_descriptor(DRIVER, b"name: db-pass\nspec: text\n").unwrap_err();
        assert!(matches!(err, DriverError::MissingSpec { .. }));
    }

    #[test]
    fn test_decode_spec() {
        let descriptor = parse_descriptor(DRIVER, b"name: s\nspec:\n  path: x\n").unwrap();
        let spec: Spec = decode_spec(DRIVER, &descriptor.name, &descriptor.spec).unwrap();
        assert_eq!(spec, Spec { path: "x".to_string(), retries: 0 });
    }

    #[test]
    fn test_decode_spec_error_points_at_line() {
        let raw = b"name: s\nspec:\n  path: x\n  retries: many\n";
        let descriptor = parse_descriptor(DRIVER, raw).unwrap();
        let err = decode_spec::<Spec>(DRIVER, &descriptor.name, &descriptor.spec).unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("test_driver: can't parse secret 's' spec: "));
        assert!(message.contains("retries"), "{}", message);
    }

    #[test]
    fn test_resolve_yaml_error_shows_source_line() {
        let source = "path: x: y\n";
        let err = serde_yaml::from_str::<Value>(source).unwrap_err();
        let rendered = resolve_yaml_error(source, &err);
        assert!(rendered.contains(" | "), "{}", rendered);
        assert!(rendered.ends_with('^'), "{}", rendered);
    }

    #[test]
    fn test_decode_spec_rejects_unknown_fields() {
        let raw = b"name: s\nspec:\n  path: x\n  pth: typo\n";
        let descriptor = parse_descriptor(DRIVER, raw).unwrap();
        let err = decode_spec::<Spec>(DRIVER, &descriptor.name, &descriptor.spec).unwrap_err();
        assert!(err.to_string().contains("pth"));
    }

    #[test]
    fn test_resolve_yaml_error_without_location() {
        let err = serde_yaml::from_str::<Spec>("").unwrap_err();
        assert!(!resolve_yaml_error("", &err).is_empty());
    }
}
