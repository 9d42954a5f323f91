//! Converts loaded YAML contexts into the value model the template engine
//! executes against.

use std::collections::HashMap;

use gtmpl_value::Value;

/// Converts a YAML mapping into an engine object. Keys must be strings on
/// the engine side: scalar keys are stringified, any other key kind is
/// dropped since no template expression could address it.
pub fn from_mapping(mapping: &serde_yaml::Mapping) -> Value {
    let mut object: HashMap<String, Value> = HashMap::new();
    for (key, value) in mapping {
        if let Some(key) = key_string(key) {
            object.insert(key, from_yaml(value));
        }
    }
    Value::Object(object)
}

/// Converts a single YAML value into an engine value.
pub fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Nil,
        serde_yaml::Value::Bool(b) => Value::from(*b),
        serde_yaml::Value::Number(n) => from_number(n),
        serde_yaml::Value::String(s) => Value::from(s.as_str()),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(mapping) => from_mapping(mapping),
    }
}

fn from_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        Value::from(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn key_string(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_mapping_nested() {
        let mapping = match serde_yaml::from_str(
            "name: world\ncount: 3\nsite:\n  title: Home\ntags: [a, b]",
        )
        .unwrap()
        {
            serde_yaml::Value::Mapping(m) => m,
            _ => panic!("expected a mapping"),
        };

        let object = match from_mapping(&mapping) {
            Value::Object(object) => object,
            _ => panic!("expected an object"),
        };
        assert_eq!(object["name"], Value::from("world"));
        assert_eq!(object["count"], Value::from(3i64));
        match &object["site"] {
            Value::Object(site) => {
                assert_eq!(site["title"], Value::from("Home"))
            }
            _ => panic!("expected a nested object"),
        }
        match &object["tags"] {
            Value::Array(tags) => assert_eq!(tags.len(), 2),
            _ => panic!("expected an array"),
        }
    }

    #[test]
    fn test_scalar_keys_are_stringified() {
        let mapping =
            match serde_yaml::from_str("1: one\ntrue: true").unwrap() {
                serde_yaml::Value::Mapping(m) => m,
                _ => panic!("expected a mapping"),
            };
        let object = match from_mapping(&mapping) {
            Value::Object(object) => object,
            _ => panic!("expected an object"),
        };
        assert_eq!(object["1"], Value::from("one"));
        assert_eq!(object["true"], Value::from(true));
    }
}
