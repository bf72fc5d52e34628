//! Display helpers and small derived lists for filter controls.

use crate::model::ItineraryEntry;
use crate::normalize::date_token_str;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeSet, HashMap};

/// Year the backend emits for blank date cells.
const NULL_DATE_YEAR: &str = "1899";
const CATEGORY_PALETTE_SIZE: usize = 6;
pub const DEFAULT_CATEGORY_COLOR: &str = "cat-color-0";
const WEEKDAY_LABELS: [&str; 7] = ["週日", "週一", "週二", "週三", "週四", "週五", "週六"];

/// Distinct itinerary days for the date picker, ascending.
pub fn available_dates(entries: &[ItineraryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| date_token_str(&e.day).trim().to_string())
        .filter(|day| !day.is_empty() && !day.contains(NULL_DATE_YEAR))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Palette classes per category, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryColors {
    classes: HashMap<String, String>,
}

impl CategoryColors {
    pub fn class_for(&self, category: &str) -> &str {
        self.classes
            .get(category)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

pub fn category_color_map(entries: &[ItineraryEntry]) -> CategoryColors {
    let mut classes = HashMap::new();
    for entry in entries.iter().filter(|e| !e.category.is_empty()) {
        if !classes.contains_key(&entry.category) {
            let slot = classes.len() % CATEGORY_PALETTE_SIZE;
            classes.insert(entry.category.clone(), format!("cat-color-{}", slot));
        }
    }
    CategoryColors { classes }
}

/// `2024-05-01` → `05/01`.
pub fn format_display_date(day: &str) -> String {
    let token = date_token_str(day);
    let parts: Vec<&str> = token.split('-').collect();
    parts.get(1..).map(|rest| rest.join("/")).unwrap_or_default()
}

/// `930` → `09:30`; unset → `--:--`.
pub fn format_display_time(time: &str) -> String {
    let time = time.trim();
    if time.is_empty() {
        return "--:--".to_string();
    }
    let padded = format!("{:0>4}", time);
    match (padded.get(..2), padded.get(2..4), padded.get(4..)) {
        (Some(hours), Some(minutes), Some(rest)) => format!("{}:{}{}", hours, minutes, rest),
        _ => padded,
    }
}

/// Weekday label for a `YYYY-MM-DD` day, empty when the day does not parse.
pub fn weekday_label(day: &str) -> String {
    NaiveDate::parse_from_str(date_token_str(day), "%Y-%m-%d")
        .map(|date| WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize].to_string())
        .unwrap_or_default()
}

/// Rounds to a whole unit and inserts thousands separators.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(days: &[&str]) -> Vec<ItineraryEntry> {
        days.iter()
            .map(|d| ItineraryEntry::from_raw(&json!({ "day": d })))
            .collect()
    }

    #[test]
    fn test_available_dates_excludes_sentinel() {
        let list = entries(&["2024-05-02", "1899-12-30", "", "2024-05-01", "2024-05-02"]);
        assert_eq!(available_dates(&list), vec!["2024-05-01", "2024-05-02"]);
    }

    #[test]
    fn test_category_colors_cycle() {
        let categories = ["a", "b", "a", "c", "d", "e", "f", "g", ""];
        let list: Vec<ItineraryEntry> = categories
            .iter()
            .map(|c| ItineraryEntry::from_raw(&json!({ "category": c })))
            .collect();
        let colors = category_color_map(&list);
        assert_eq!(colors.len(), 7);
        assert_eq!(colors.class_for("a"), "cat-color-0");
        assert_eq!(colors.class_for("c"), "cat-color-2");
        assert_eq!(colors.class_for("g"), "cat-color-0");
        assert_eq!(colors.class_for("unknown"), DEFAULT_CATEGORY_COLOR);
    }

    #[test]
    fn test_display_date_and_time() {
        assert_eq!(format_display_date("2024-05-01"), "05/01");
        assert_eq!(format_display_date("2024-05-01T00:00:00Z"), "05/01");
        assert_eq!(format_display_date(""), "");
        assert_eq!(format_display_time("930"), "09:30");
        assert_eq!(format_display_time("1415"), "14:15");
        assert_eq!(format_display_time(""), "--:--");
    }

    #[test]
    fn test_weekday_label() {
        assert_eq!(weekday_label("2024-05-01"), "週三");
        assert_eq!(weekday_label("2024-05-05"), "週日");
        assert_eq!(weekday_label("not a date"), "");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(800.0), "800");
        assert_eq!(format_thousands(1234.4), "1,234");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(-1500.0), "-1,500");
    }
}
