use crate::checklist::{ChecklistItem, parse_checklist};
use crate::model::itinerary::encode_image_list;
use crate::normalize::{
    normalize_booleanish, normalize_id, normalize_image_list, split_list, value_to_string,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A wishlist entry. Its free-text content may embed checklist lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishItem {
    pub id: Option<String>,
    /// Comma-joined tag names.
    pub tag: String,
    pub content: String,
    pub is_done: bool,
    pub payer: String,
    pub images: Vec<String>,
    /// Last-update timestamp exactly as the backend reported it.
    pub update_time: String,
}

impl WishItem {
    /// Builds a wish from a raw backend row.
    ///
    /// The timestamp column has been seen both as `updateTime` and `updatetime`.
    pub fn from_raw(raw: &Value) -> Self {
        let field = |name: &str| raw.get(name).unwrap_or(&Value::Null);
        let update_time = [field("updatetime"), field("updateTime")]
            .into_iter()
            .map(value_to_string)
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default();

        Self {
            id: normalize_id(field("id")),
            tag: value_to_string(field("tag")),
            content: value_to_string(field("content")),
            is_done: normalize_booleanish(field("isDone")),
            payer: value_to_string(field("payer")),
            images: normalize_image_list(field("image")),
            update_time,
        }
    }

    /// Encodes the wish with the backend's column names.
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.id,
            "tag": self.tag,
            "content": self.content,
            "isDone": self.is_done,
            "payer": self.payer,
            "image": encode_image_list(&self.images),
            "updateTime": self.update_time,
        })
    }

    pub fn tags(&self) -> Vec<String> {
        split_list(&self.tag)
    }

    /// Checklist derived from the content; never stored separately.
    pub fn checklist(&self) -> Vec<ChecklistItem> {
        parse_checklist(&self.content)
    }

    pub fn has_checklist(&self) -> bool {
        !self.checklist().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_done_encodings() {
        for (raw, expected) in [
            (json!("TRUE"), true),
            (json!("false"), false),
            (json!(true), true),
            (Value::Null, false),
        ] {
            let wish = WishItem::from_raw(&json!({ "isDone": raw }));
            assert_eq!(wish.is_done, expected);
        }
    }

    #[test]
    fn test_update_time_either_spelling() {
        let lower = WishItem::from_raw(&json!({ "updatetime": "2024-05-01 10:00:00" }));
        let camel = WishItem::from_raw(&json!({ "updateTime": "2024-05-02 10:00:00" }));
        assert_eq!(lower.update_time, "2024-05-01 10:00:00");
        assert_eq!(camel.update_time, "2024-05-02 10:00:00");
    }

    #[test]
    fn test_checklist_is_derived_from_content() {
        let wish = WishItem::from_raw(&json!({ "content": "- [ ] pack\n- [x] book flight" }));
        let items = wish.checklist();
        assert_eq!(items.len(), 2);
        assert!(!items[0].done);
        assert_eq!(items[1].text, "book flight");
        assert!(wish.has_checklist());
    }
}
