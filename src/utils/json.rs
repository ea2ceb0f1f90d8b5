use serde_json::Value;

/// Flatten a JSON value into one readable line: arrays join with ", ",
/// objects render as `key: value` pairs, nulls vanish.
pub fn value_to_short_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(arr) => arr
            .iter()
            .map(value_to_short_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(obj) => obj
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| format!("{}: {}", k, value_to_short_string(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_values_flatten() {
        assert_eq!(value_to_short_string(&json!(["a", null, 2])), "a, 2");
        assert_eq!(value_to_short_string(&json!({"name": ["taken"], "x": null})), "name: taken");
    }
}
