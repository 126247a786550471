//! Gallery item model

use std::cmp::Reverse;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Category, Identity};
use crate::store::{Document, Record};
use crate::util::{iso_timestamp, parse_timestamp};

/// Store-assigned identifier of a gallery item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The persisted shape of a gallery item, as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub title: String,
    pub url: String,
    pub prompt: String,
    pub category: Category,
    /// ISO-8601 creation time
    pub timestamp: String,
    pub created_by: Identity,
}

impl ItemRecord {
    /// Flatten into the schemaless field map the store accepts.
    pub fn into_fields(self) -> Result<Record, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(serde::ser::Error::custom(format!(
                "item record serialized to {other} instead of an object"
            ))),
        }
    }
}

/// A gallery entry as the UI sees it.
///
/// `is_unlocked` is local-only state; it is never written back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: ItemId,
    pub title: String,
    pub url: String,
    pub prompt: String,
    pub category: Category,
    pub timestamp: String,
    pub created_by: Identity,
    #[serde(skip)]
    pub is_unlocked: bool,
}

impl GalleryItem {
    /// Map a raw store document into a locked gallery item.
    ///
    /// A missing, null, or blank timestamp becomes `now`. Numeric timestamps
    /// are read as Unix milliseconds. Readable strings are rewritten as
    /// millisecond UTC; unreadable ones are kept verbatim.
    #[must_use]
    pub fn from_document(document: &Document, now: DateTime<Utc>) -> Self {
        let fields = &document.fields;
        Self {
            id: ItemId::new(document.id.clone()),
            title: text_field(fields, "title"),
            url: text_field(fields, "url"),
            prompt: text_field(fields, "prompt"),
            category: Category::from_wire(&text_field(fields, "category")),
            timestamp: timestamp_field(fields.get("timestamp"), now),
            created_by: Identity::new(text_field(fields, "createdBy")),
            is_unlocked: false,
        }
    }

    /// Parsed creation time, if the stored timestamp is readable.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Sort key: unreadable timestamps sort as the earliest possible instant.
    #[must_use]
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.created_at().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Stable sort, newest first.
pub fn sort_newest_first(items: &mut [GalleryItem]) {
    items.sort_by_key(|item| Reverse(item.sort_key()));
}

fn text_field(fields: &Record, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(value)) => value.clone(),
        _ => String::new(),
    }
}

fn timestamp_field(value: Option<&Value>, now: DateTime<Utc>) -> String {
    match value {
        Some(Value::String(raw)) if !raw.trim().is_empty() => {
            parse_timestamp(raw).map_or_else(|| raw.clone(), iso_timestamp)
        }
        Some(Value::Number(millis)) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map_or_else(|| iso_timestamp(now), iso_timestamp),
        _ => iso_timestamp(now),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn document(id: &str, fields: Value) -> Document {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object");
        };
        Document {
            id: id.to_string(),
            fields,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn from_document_maps_all_fields() {
        let doc = document(
            "abc",
            json!({
                "title": "Neon Samurai",
                "url": "https://example.com/a.png",
                "prompt": "a samurai in neon rain",
                "category": "Sci-Fi",
                "timestamp": "2024-05-01T12:30:00.000Z",
                "createdBy": "user-1",
            }),
        );

        let item = GalleryItem::from_document(&doc, fixed_now());
        assert_eq!(
            item,
            GalleryItem {
                id: ItemId::new("abc"),
                title: "Neon Samurai".to_string(),
                url: "https://example.com/a.png".to_string(),
                prompt: "a samurai in neon rain".to_string(),
                category: Category::SciFi,
                timestamp: "2024-05-01T12:30:00.000Z".to_string(),
                created_by: Identity::new("user-1"),
                is_unlocked: false,
            }
        );
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let item = GalleryItem::from_document(&document("a", json!({})), fixed_now());
        assert_eq!(item.timestamp, "2024-06-01T08:00:00.000Z");

        let item = GalleryItem::from_document(
            &document("b", json!({ "timestamp": null })),
            fixed_now(),
        );
        assert_eq!(item.timestamp, "2024-06-01T08:00:00.000Z");
    }

    #[test]
    fn numeric_timestamp_is_read_as_millis() {
        let item = GalleryItem::from_document(
            &document("a", json!({ "timestamp": 1_714_566_600_000_i64 })),
            fixed_now(),
        );
        assert_eq!(item.timestamp, "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn readable_timestamps_are_normalized_to_millis_utc() {
        let item = GalleryItem::from_document(
            &document("a", json!({ "timestamp": "2024-05-01T12:30:00.123456Z" })),
            fixed_now(),
        );
        assert_eq!(item.timestamp, "2024-05-01T12:30:00.123Z");

        let item = GalleryItem::from_document(
            &document("b", json!({ "timestamp": "2024-05-01T14:30:00+02:00" })),
            fixed_now(),
        );
        assert_eq!(item.timestamp, "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn unparseable_timestamp_is_kept_and_sorts_last() {
        let mut items = vec![
            GalleryItem::from_document(
                &document("junk", json!({ "timestamp": "not a date" })),
                fixed_now(),
            ),
            GalleryItem::from_document(
                &document("old", json!({ "timestamp": "2020-01-01T00:00:00Z" })),
                fixed_now(),
            ),
            GalleryItem::from_document(
                &document("new", json!({ "timestamp": "2024-01-01T00:00:00Z" })),
                fixed_now(),
            ),
        ];
        assert_eq!(items[0].timestamp, "not a date");

        sort_newest_first(&mut items);
        let order: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "junk"]);
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let stamp = json!({ "timestamp": "2024-01-01T00:00:00Z" });
        let mut items = vec![
            GalleryItem::from_document(&document("first", stamp.clone()), fixed_now()),
            GalleryItem::from_document(&document("second", stamp), fixed_now()),
        ];
        sort_newest_first(&mut items);
        assert_eq!(items[0].id.as_str(), "first");
        assert_eq!(items[1].id.as_str(), "second");
    }

    #[test]
    fn record_fields_use_camel_case_names() {
        let record = ItemRecord {
            title: "t".to_string(),
            url: "https://example.com/x.png".to_string(),
            prompt: "p".to_string(),
            category: Category::Abstract,
            timestamp: "2024-05-01T12:30:00.000Z".to_string(),
            created_by: Identity::new("user-1"),
        };
        let fields = record.into_fields().unwrap();
        assert_eq!(fields.get("createdBy"), Some(&json!("user-1")));
        assert_eq!(fields.get("category"), Some(&json!("Abstract")));
        assert!(!fields.contains_key("isUnlocked"));
    }
}
