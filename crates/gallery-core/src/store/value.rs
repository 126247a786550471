//! Firestore typed-value codec.
//!
//! Firestore's REST API wraps every field in a single-key object naming its
//! type (`{"stringValue": "..."}`). The gallery works with plain JSON, so
//! values are unwrapped on read and wrapped again on write. Timestamps come
//! back as RFC 3339 strings.

use serde_json::{json, Map, Value};

use super::Record;

/// Unwrap a Firestore `fields` object into plain JSON.
pub fn decode_fields(fields: &Map<String, Value>) -> Record {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Wrap a plain JSON record into a Firestore `fields` object.
pub fn encode_fields(record: &Record) -> Map<String, Value> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

fn decode_value(value: &Value) -> Value {
    let Some(object) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = object.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" | "booleanValue"
        | "doubleValue" | "geoPointValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(raw) => raw
                .parse::<i64>()
                .map_or_else(|_| Value::String(raw.clone()), Value::from),
            other => other.clone(),
        },
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => number.as_i64().map_or_else(
            || json!({ "doubleValue": number }),
            |integer| json!({ "integerValue": integer.to_string() }),
        ),
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn decodes_scalar_and_nested_values() {
        let fields = object(json!({
            "title": { "stringValue": "Neon Samurai" },
            "timestamp": { "timestampValue": "2024-05-01T12:30:00.123456Z" },
            "views": { "integerValue": "12" },
            "score": { "doubleValue": 0.5 },
            "featured": { "booleanValue": true },
            "deleted": { "nullValue": null },
            "tags": { "arrayValue": { "values": [{ "stringValue": "neon" }] } },
            "empty": { "arrayValue": {} },
            "meta": { "mapValue": { "fields": { "w": { "integerValue": "640" } } } },
        }));

        assert_eq!(
            Value::Object(decode_fields(&fields)),
            json!({
                "title": "Neon Samurai",
                "timestamp": "2024-05-01T12:30:00.123456Z",
                "views": 12,
                "score": 0.5,
                "featured": true,
                "deleted": null,
                "tags": ["neon"],
                "empty": [],
                "meta": { "w": 640 },
            })
        );
    }

    #[test]
    fn encodes_plain_json_into_typed_values() {
        let record = object(json!({
            "title": "Neon Samurai",
            "count": 3,
            "ratio": 1.5,
            "tags": ["a"],
        }));

        assert_eq!(
            Value::Object(encode_fields(&record)),
            json!({
                "title": { "stringValue": "Neon Samurai" },
                "count": { "integerValue": "3" },
                "ratio": { "doubleValue": 1.5 },
                "tags": { "arrayValue": { "values": [{ "stringValue": "a" }] } },
            })
        );
    }

    #[test]
    fn unknown_shapes_decode_to_null() {
        let fields = object(json!({
            "weird": "bare string",
            "alien": { "fooValue": 1 },
        }));
        let decoded = decode_fields(&fields);
        assert_eq!(decoded.get("weird"), Some(&Value::Null));
        assert_eq!(decoded.get("alien"), Some(&Value::Null));
    }
}
