use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Trait for types that can be used as a Gemini structured-output schema.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate a Gemini-compatible response schema for this type.
    ///
    /// Gemini's `response_schema` field accepts an OpenAPI 3.0 subset:
    /// 1. No `$ref` references; schemas must be fully inlined
    /// 2. No `$schema` / `definitions` / `additionalProperties` keywords
    fn gemini_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);
        strip_additional_properties(&mut value);

        // Root-level metadata keywords only: "title" also appears as a
        // property NAME inside `properties` maps and must survive there.
        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn strip_additional_properties(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("additionalProperties");
            for (_, v) in map.iter_mut() {
                strip_additional_properties(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                strip_additional_properties(item);
            }
        }
        _ => {}
    }
}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = if let serde_json::Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if ref_path.starts_with("#/definitions/") {
                    let type_name = ref_path.trim_start_matches("#/definitions/");
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct TestMetadata {
        title: String,
        hashtags: Vec<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct TestNested {
        item: TestMetadata,
        note: Option<String>,
    }

    #[test]
    fn schema_is_object() {
        let schema = TestMetadata::gemini_schema();
        assert!(schema.is_object());
        assert_eq!(
            schema.get("type"),
            Some(&serde_json::Value::String("object".to_string()))
        );
    }

    #[test]
    fn unsupported_keywords_stripped() {
        let schema = TestNested::gemini_schema();
        let schema_str = serde_json::to_string(&schema).unwrap();
        assert!(!schema_str.contains("additionalProperties"));
        assert!(!schema_str.contains("$schema"));
    }

    #[test]
    fn property_named_title_survives() {
        let schema = TestMetadata::gemini_schema();
        let properties = schema.get("properties").unwrap().as_object().unwrap();
        assert!(properties.contains_key("title"));
        assert!(properties.contains_key("hashtags"));
    }

    #[test]
    fn nested_struct_inlined() {
        let schema = TestNested::gemini_schema();
        let schema_obj = schema.as_object().unwrap();

        assert!(!schema_obj.contains_key("definitions"));

        let properties = schema_obj.get("properties").unwrap().as_object().unwrap();
        let item = properties.get("item").unwrap().as_object().unwrap();

        assert!(!item.contains_key("$ref"));
        assert_eq!(
            item.get("type"),
            Some(&serde_json::Value::String("object".to_string()))
        );
    }
}
