//! Normalization of loosely-typed backend fields.
//!
//! The spreadsheet backend hands out the same logical field in several
//! encodings (a JSON-encoded string, a comma-joined string, a native array,
//! `"TRUE"` vs `true`, date-time strings for plain dates). Every read of a raw
//! record passes through this module so downstream code only ever sees the
//! canonical representation.
//!
//! Nothing here fails: malformed input degrades to an empty/default value and
//! is reported at `debug` level.

use crate::model::ExchangeRate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Thumbnail endpoint used for every recognised hosted-file URL.
const THUMBNAIL_URL_PREFIX: &str = "https://drive.google.com/thumbnail?id=";
const THUMBNAIL_SIZE_SUFFIX: &str = "&sz=s1000";

static FILE_PATH_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/d/([^/]+)").expect("valid regex"));
static FILE_QUERY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]id=([^&]+)").expect("valid regex"));

/// Renders any JSON scalar as the string the backend would display.
///
/// `null` becomes the empty string; arrays and objects fall back to their
/// JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Rewrites hosted-file URLs to their direct thumbnail form.
///
/// Applying it twice yields the same URL as applying it once.
pub fn canonicalize_image_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let id = FILE_PATH_ID
        .captures(url)
        .or_else(|| FILE_QUERY_ID.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    match id {
        Some(id) if !id.is_empty() => {
            format!("{}{}{}", THUMBNAIL_URL_PREFIX, id, THUMBNAIL_SIZE_SUFFIX)
        }
        _ => url.to_string(),
    }
}

/// Same as [`canonicalize_image_url`] but for an untyped value.
///
/// Anything that is not a non-empty string yields the empty string.
pub fn canonicalize_image_value(value: &Value) -> String {
    match value {
        Value::String(s) => canonicalize_image_url(s),
        _ => String::new(),
    }
}

/// Converts any image field encoding into an ordered list of URLs.
pub fn normalize_image_list(raw: &Value) -> Vec<String> {
    let candidates: Vec<String> = match raw {
        Value::Null => Vec::new(),
        Value::Bool(false) => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') || trimmed.starts_with('{') {
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(parsed) => flatten_image_json(&parsed),
                    Err(e) => {
                        tracing::debug!(
                            "[Normalizer] image field is not valid JSON, keeping raw value: {}",
                            e
                        );
                        vec![s.clone()]
                    }
                }
            } else {
                s.split(',')
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect()
            }
        }
        Value::Array(items) => items.iter().filter_map(image_element).collect(),
        other => vec![value_to_string(other)],
    };

    candidates
        .iter()
        .map(|url| canonicalize_image_url(url))
        .filter(|url| !url.is_empty())
        .collect()
}

fn flatten_image_json(parsed: &Value) -> Vec<String> {
    match parsed {
        Value::Array(items) => items.iter().filter_map(image_element).collect(),
        other => image_element(other).into_iter().collect(),
    }
}

fn image_element(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        other => Some(value_to_string(other)),
    }
}

/// Tolerant boolean parsing: native booleans pass through, everything else
/// is compared case-insensitively with `"true"`.
pub fn normalize_booleanish(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        other => value_to_string(other).trim().eq_ignore_ascii_case("true"),
    }
}

/// Reduces a date or date-time encoding to its date portion.
///
/// `2024-05-01T00:00:00.000Z` becomes `2024-05-01`; values without a time
/// separator are returned as their string form.
pub fn normalize_date_token(raw: &Value) -> String {
    let text = value_to_string(raw);
    date_token_str(&text).to_string()
}

/// String form of [`normalize_date_token`].
pub fn date_token_str(text: &str) -> &str {
    match text.split_once('T') {
        Some((date, _)) => date,
        None => text,
    }
}

/// Parses a numeric field that may arrive as a number or a numeric string.
pub fn normalize_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or_else(|_| {
            if !s.trim().is_empty() {
                tracing::debug!("[Normalizer] non-numeric value '{}' read as 0", s);
            }
            0.0
        }),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

/// Reads a stay length; anything missing, non-numeric, or below one becomes 1.
pub fn normalize_duration(value: &Value) -> u32 {
    let n = normalize_number(value);
    if n.is_finite() && n >= 1.0 {
        n.floor().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// Reads a record identifier. Empty and null identifiers mean "not yet persisted".
pub fn normalize_id(value: &Value) -> Option<String> {
    let text = value_to_string(value);
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits a comma-joined list, trimming each segment and dropping empties.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads a list field stored either as a comma-joined string or as an array.
pub fn normalize_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        other => split_list(&value_to_string(other)),
    }
}

/// Reads the exchange-rate table, which may be stored as a JSON string or
/// as a native array of `{code, rate}` objects.
pub fn normalize_rates(raw: &Value) -> Vec<ExchangeRate> {
    let parsed;
    let items = match raw {
        Value::Array(items) => items,
        Value::String(s) if !s.trim().is_empty() => {
            match serde_json::from_str::<Value>(s) {
                Ok(Value::Array(items)) => {
                    parsed = items;
                    &parsed
                }
                Ok(_) | Err(_) => {
                    tracing::debug!("[Normalizer] rates field is not a JSON array, ignoring");
                    return Vec::new();
                }
            }
        }
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let code = value_to_string(item.get("code")?).trim().to_string();
            if code.is_empty() {
                return None;
            }
            let rate = item.get("rate").map(normalize_number).unwrap_or(1.0);
            Some(ExchangeRate { code, rate })
        })
        .collect()
}
