use serde::de::DeserializeOwned;
use serde_json::Value;

/// Turns a list endpoint's body into a sequence: a bare array, a paginated
/// `{ "results": [...] }` envelope, or nothing. Any other shape yields an
/// empty list. Items that do not decode are skipped.
pub fn normalize_collection<T: DeserializeOwned>(body: Option<Value>) -> Vec<T> {
    let items = match body {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut obj)) => match obj.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!("collection response is an object without a results array");
                Vec::new()
            }
        },
        Some(other) => {
            tracing::warn!(kind = value_kind(&other), "unexpected collection response shape");
            Vec::new()
        }
        None => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(error = %e, "skipping collection item that failed to decode");
                None
            }
        })
        .collect()
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Server;
    use serde_json::json;

    #[test]
    fn bare_array_and_envelope_normalize_alike() {
        let row = json!({"id": 1, "hostname": "gpu01", "ip_address": "10.0.0.1", "is_active": true});
        let bare: Vec<Server> = normalize_collection(Some(json!([row.clone()])));
        let paged: Vec<Server> = normalize_collection(Some(json!({"count": 1, "next": null, "results": [row]})));
        assert_eq!(bare, paged);
        assert_eq!(bare[0].hostname, "gpu01");
    }

    #[test]
    fn ambiguous_shapes_become_empty() {
        for body in [
            None,
            Some(json!(null)),
            Some(json!("instances")),
            Some(json!(42)),
            Some(json!({"instances": []})),
            Some(json!({"results": {"a": 1}})),
        ] {
            let out: Vec<Server> = normalize_collection(body);
            assert!(out.is_empty());
        }
    }

    #[test]
    fn undecodable_items_are_skipped() {
        let out: Vec<Server> = normalize_collection(Some(json!([{"hostname": "a"}, "junk", 7])));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].hostname, "a");
    }
}
