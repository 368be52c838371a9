use std::cmp::Ordering;

use serde_json::Value as JsonValue;

/// Ordering rank across json value kinds. Numbers sort before strings.
pub fn kind_rank(value: &JsonValue) -> u8 {
    match value {
        JsonValue::Null => 0,
        JsonValue::Bool(_) => 1,
        JsonValue::Number(_) => 2,
        JsonValue::String(_) => 3,
        JsonValue::Array(_) => 4,
        JsonValue::Object(_) => 5,
    }
}

/// Total order over json values used for sorting dynamic values.
pub fn compare_json(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a.cmp(b),
        (JsonValue::Number(a), JsonValue::Number(b)) => {
            match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => {
                    let a = a.as_f64().unwrap_or(f64::NAN);
                    let b = b.as_f64().unwrap_or(f64::NAN);
                    a.total_cmp(&b)
                }
            }
        }
        (JsonValue::String(a), JsonValue::String(b)) => a.cmp(b),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            for (a, b) in a.iter().zip(b) {
                let ord = compare_json(a, b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (a, b) if kind_rank(a) != kind_rank(b) => kind_rank(a).cmp(&kind_rank(b)),
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

/// Text form of a json value. Strings are rendered without quotes, everything
/// else as compact json.
pub fn json_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse text as json, falling back to a json string when the text is not
/// valid json.
pub fn parse_json_lenient(text: &str) -> JsonValue {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => JsonValue::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_before_strings() {
        let mut values = vec![json!("b"), json!(3), json!("a"), json!(1.5)];
        values.sort_by(compare_json);
        assert_eq!(vec![json!(1.5), json!(3), json!("a"), json!("b")], values);
    }

    #[test]
    fn text_rendering() {
        assert_eq!("abc", json_to_text(&json!("abc")));
        assert_eq!("[1,2]", json_to_text(&json!([1, 2])));
        assert_eq!(r#"{"a":1}"#, json_to_text(&json!({"a": 1})));
    }

    #[test]
    fn lenient_parse() {
        assert_eq!(json!([1, 2, 3]), parse_json_lenient("[1,2,3]"));
        assert_eq!(json!("not json"), parse_json_lenient("not json"));
    }
}
