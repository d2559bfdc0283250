//! Connection details published from issued credentials
//!
//! With templates, each key is rendered from its template against the
//! credentials. Without templates, the credentials are flattened into
//! dotted keys.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{CoreError, Result};

/// Secret-ready key/value pairs
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

/// Build connection details from credentials.
///
/// An empty template map selects flattening. Rendering fails on any
/// template that references a missing credential field.
pub fn extract_connection_details(
    templates: &BTreeMap<String, String>,
    credentials: &Value,
) -> Result<ConnectionDetails> {
    if templates.is_empty() {
        return Ok(flatten(credentials));
    }

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    let context = minijinja::Value::from_serialize(credentials);

    let mut details = ConnectionDetails::new();
    for (key, template) in templates {
        let rendered = env
            .render_str(template, &context)
            .map_err(|source| CoreError::Template {
                key: key.clone(),
                source,
            })?;
        details.insert(key.clone(), rendered.into_bytes());
    }
    Ok(details)
}

/// Flatten a JSON document into dotted keys; array elements use their index
pub fn flatten(credentials: &Value) -> ConnectionDetails {
    let mut details = ConnectionDetails::new();
    flatten_into("", credentials, &mut details);
    details
}

fn flatten_into(prefix: &str, value: &Value, details: &mut ConnectionDetails) {
    match value {
        Value::Object(fields) => {
            for (name, field) in fields {
                flatten_into(&join(prefix, name), field, details);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(&join(prefix, &index.to_string()), item, details);
            }
        }
        leaf if !prefix.is_empty() => {
            details.insert(prefix.to_string(), leaf_text(leaf).into_bytes());
        }
        _ => {}
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn leaf_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(details: &ConnectionDetails, key: &str) -> String {
        String::from_utf8(details[key].clone()).unwrap()
    }

    fn credentials() -> Value {
        json!({
            "apikey": "k",
            "kafka_brokers_sasl": ["b1:9093", "b2:9093"],
            "port": 9093,
            "tls": true,
            "instance": {"region": "us-south", "id": null}
        })
    }

    #[test]
    fn test_flatten_credentials() {
        let details = extract_connection_details(&BTreeMap::new(), &credentials()).unwrap();

        assert_eq!(text(&details, "apikey"), "k");
        assert_eq!(text(&details, "kafka_brokers_sasl.0"), "b1:9093");
        assert_eq!(text(&details, "kafka_brokers_sasl.1"), "b2:9093");
        assert_eq!(text(&details, "port"), "9093");
        assert_eq!(text(&details, "tls"), "true");
        assert_eq!(text(&details, "instance.region"), "us-south");
        assert_eq!(text(&details, "instance.id"), "");
        assert_eq!(details.len(), 7);
    }

    #[test]
    fn test_flatten_scalar_document_is_empty() {
        assert!(flatten(&json!("just a string")).is_empty());
        assert!(flatten(&Value::Null).is_empty());
    }

    #[test]
    fn test_templates_render_credentials() {
        let templates = BTreeMap::from([
            ("user".to_string(), "token".to_string()),
            ("password".to_string(), "{{ apikey }}".to_string()),
            (
                "bootstrap".to_string(),
                "{{ kafka_brokers_sasl[0] }},{{ kafka_brokers_sasl[1] }}".to_string(),
            ),
        ]);

        let details = extract_connection_details(&templates, &credentials()).unwrap();

        assert_eq!(text(&details, "user"), "token");
        assert_eq!(text(&details, "password"), "k");
        assert_eq!(text(&details, "bootstrap"), "b1:9093,b2:9093");
        assert_eq!(details.len(), 3);
    }

    #[test]
    fn test_template_with_missing_field_fails() {
        let templates = BTreeMap::from([("password".to_string(), "{{ missing }}".to_string())]);

        let err = extract_connection_details(&templates, &credentials()).unwrap_err();

        assert!(matches!(err, CoreError::Template { ref key, .. } if key == "password"));
    }

    #[test]
    fn test_template_with_missing_nested_field_fails() {
        let templates = BTreeMap::from([("region".to_string(), "{{ instance.zone }}".to_string())]);

        assert!(extract_connection_details(&templates, &credentials()).is_err());
    }
}
