//! Required-field extraction for submitted JSON bodies
//!
//! A field counts as missing when it is absent from the body or explicitly
//! `null`. No type coercion happens here; callers interpret the values.

use serde_json::{Map, Value};

/// Extract `fields` from `body` in order
///
/// Returns the present values in the same order as `fields`, or every
/// missing field name (also in `fields` order) if at least one is missing.
pub fn extract_fields<'a>(
    body: &'a Map<String, Value>,
    fields: &[&str],
) -> std::result::Result<Vec<&'a Value>, Vec<String>> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|field| matches!(body.get(**field), None | Some(Value::Null)))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(fields.iter().filter_map(|field| body.get(*field)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn returns_values_in_requested_order() {
        let body = object(json!({"b": 2, "a": "one", "extra": true}));
        let values = extract_fields(&body, &["a", "b"]).unwrap();
        assert_eq!(values, vec![&json!("one"), &json!(2)]);
    }

    #[test]
    fn reports_absent_and_null_fields() {
        let body = object(json!({"name": "AguaClara", "phone_number": null}));
        let missing = extract_fields(&body, &["name", "phone_number", "num_filters"]).unwrap_err();
        assert_eq!(missing, vec!["phone_number", "num_filters"]);
    }

    #[test]
    fn falsy_values_are_present() {
        let body = object(json!({"num_filters": 0, "name": "", "flag": false}));
        assert!(extract_fields(&body, &["num_filters", "name", "flag"]).is_ok());
    }

    #[test]
    fn empty_field_list_always_succeeds() {
        let body = Map::new();
        assert_eq!(extract_fields(&body, &[]).unwrap().len(), 0);
    }
}
