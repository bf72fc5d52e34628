use crate::normalize::{
    normalize_date_token, normalize_duration, normalize_id, normalize_image_list, value_to_string,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Categories whose entries occupy every day of their duration.
pub const LODGING_CATEGORIES: &[&str] = &["飯店", "住宿", "hotel", "lodging"];

/// A single planned stop, stay, or activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryEntry {
    /// Backend row identifier; `None` until the backend has stored the entry.
    pub id: Option<String>,
    /// Calendar date (`YYYY-MM-DD` when well-formed).
    pub day: String,
    /// 24h `HHMM` token, or empty when unset.
    pub time: String,
    pub category: String,
    pub content: String,
    pub location: String,
    pub remark: String,
    /// Number of occupied days; always at least 1.
    pub duration: u32,
    pub images: Vec<String>,
}

impl ItineraryEntry {
    /// Builds an entry from a raw backend row.
    pub fn from_raw(raw: &Value) -> Self {
        let field = |name: &str| raw.get(name).unwrap_or(&Value::Null);
        Self {
            id: normalize_id(field("id")),
            day: normalize_date_token(field("day")),
            time: value_to_string(field("time")).trim().to_string(),
            category: value_to_string(field("category")),
            content: value_to_string(field("content")),
            location: value_to_string(field("location")),
            remark: value_to_string(field("remark")),
            duration: normalize_duration(field("duration")),
            images: normalize_image_list(field("image")),
        }
    }

    /// Encodes the entry with the backend's column names.
    ///
    /// The image list travels as a JSON-array string.
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.id,
            "day": self.day,
            "time": self.time,
            "category": self.category,
            "content": self.content,
            "location": self.location,
            "remark": self.remark,
            "duration": self.duration,
            "image": encode_image_list(&self.images),
        })
    }

    /// Whether this entry spans several calendar days.
    pub fn is_lodging(&self) -> bool {
        is_lodging_category(&self.category)
    }

    /// The time token used for ordering: left-zero-padded to four characters,
    /// `0000` when unset.
    pub fn time_sort_key(&self) -> String {
        let time = if self.time.is_empty() {
            "0000"
        } else {
            self.time.as_str()
        };
        format!("{:0>4}", time)
    }
}

/// Whether `category` is one of [`LODGING_CATEGORIES`] (ASCII case-insensitive).
pub fn is_lodging_category(category: &str) -> bool {
    let category = category.trim();
    LODGING_CATEGORIES
        .iter()
        .any(|lodging| lodging.eq_ignore_ascii_case(category))
}

pub(crate) fn encode_image_list(images: &[String]) -> String {
    serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
}

/// One row of the itinerary view.
///
/// Continuation rows are generated for every extra day of a multi-day stay and
/// are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryRow {
    pub entry: ItineraryEntry,
    pub is_extra_day: bool,
}
