//! Conversions between JSON text and [`ConfigMap`].

use serde_json::value::Value as JsonValue;

use flashcfg_core_store::{ConfigMap, Error, SectionMap};

/// Parse a config document.
///
/// The root must be an object. Each member whose value is an object becomes
/// a section; any other member is skipped with a warning. Values that are
/// not strings are kept as their compact JSON text.
///
/// # Errors
///
/// * [`Error::Malformed`] - The text is not JSON, or the root is not an object.
/// * [`Error::EmptyDocument`] - No member of the root was a section.
pub fn parse_config(text: &str) -> Result<ConfigMap, Error> {
    let root: JsonValue = serde_json::from_str(text).map_err(|error| Error::Malformed {
        message: error.to_string(),
    })?;

    let members = match root {
        JsonValue::Object(members) => members,
        other => {
            return Err(Error::Malformed {
                message: format!("root element is {}, not an object", kind_of(&other)),
            });
        }
    };

    let mut map = ConfigMap::new();
    for (section, value) in members {
        match value {
            JsonValue::Object(entries) => {
                let parsed: SectionMap = entries
                    .into_iter()
                    .map(|(key, value)| {
                        let text = value_text(&section, &key, value);
                        (key, text)
                    })
                    .collect();
                map.insert(section, parsed);
            }
            other => {
                log::warn!(
                    "Section '{}' is {}, not an object; skipping",
                    section,
                    kind_of(&other)
                );
            }
        }
    }

    if map.is_empty() {
        return Err(Error::EmptyDocument);
    }
    Ok(map)
}

/// Serialize a config map as pretty-printed JSON.
pub fn to_json_string(map: &ConfigMap) -> Result<String, Error> {
    serde_json::to_string_pretty(map).map_err(|error| Error::Malformed {
        message: error.to_string(),
    })
}

fn value_text(section: &str, key: &str, value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => value.to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            log::warn!(
                "Value of {}.{} is {}; storing its JSON text",
                section,
                key,
                kind_of(&value)
            );
            value.to_string()
        }
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    #[test]
    fn parses_sections_and_keys() {
        let map = parse_config(r#"{"wifi": {"ssid": "net", "channel": "6"}, "_auth": {}}"#)
            .unwrap();
        assert_eq!(
            map,
            btree! {
                "_auth".to_string() => SectionMap::new(),
                "wifi".to_string() => btree! {
                    "channel".to_string() => "6".to_string(),
                    "ssid".to_string() => "net".to_string(),
                },
            }
        );
    }

    #[test]
    fn non_object_sections_are_skipped() {
        let map = parse_config(r#"{"version": 3, "list": [1, 2], "wifi": {"ssid": "net"}}"#)
            .unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["wifi"]);
    }

    #[test]
    fn scalar_values_keep_their_json_text() {
        let map = parse_config(
            r#"{"s": {"n": 42, "f": 1.5, "b": true, "z": null, "arr": [1, "a"], "obj": {"k": 1}}}"#,
        )
        .unwrap();
        let section = &map["s"];
        assert_eq!(section["n"], "42");
        assert_eq!(section["f"], "1.5");
        assert_eq!(section["b"], "true");
        assert_eq!(section["z"], "null");
        assert_eq!(section["arr"], r#"[1,"a"]"#);
        assert_eq!(section["obj"], r#"{"k":1}"#);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(parse_config(""), Err(Error::Malformed { .. })));
        assert!(matches!(parse_config("{not json"), Err(Error::Malformed { .. })));
        assert!(matches!(parse_config("[1, 2]"), Err(Error::Malformed { .. })));
        assert!(matches!(parse_config("\"text\""), Err(Error::Malformed { .. })));
        assert!(matches!(parse_config("{}"), Err(Error::EmptyDocument)));
        assert!(matches!(
            parse_config(r#"{"a": 1, "b": "x"}"#),
            Err(Error::EmptyDocument)
        ));
    }

    #[test]
    fn serialized_text_parses_back_to_the_same_map() {
        let map: ConfigMap = btree! {
            "_auth".to_string() => btree! {
                "user".to_string() => "admin".to_string(),
            },
            "quotes".to_string() => btree! {
                "q".to_string() => "say \"hi\"\n\tand \\ leave".to_string(),
                "".to_string() => "".to_string(),
            },
        };
        let text = to_json_string(&map).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(parse_config(&text).unwrap(), map);
    }
}
