use serde_json::{Map, Value};

/// Wrap a compiled document with its content identifier.
///
/// The id is computed over the bare document's canonical text, so it
/// matches what `asl id` prints for the same input.
pub fn build_manifest(definition: Value, id: &str) -> Value {
    let mut map = Map::new();
    map.insert("definition".to_string(), definition);
    map.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_comes_first() {
        let manifest = build_manifest(json!({"StartAt": "A"}), "abc");
        let keys: Vec<&String> = manifest.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["definition", "id"]);
        assert_eq!(manifest["definition"]["StartAt"], "A");
    }
}
