use crate::model::{ItineraryEntry, ItineraryRow};
use chrono::{Days, NaiveDate};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Builds the itinerary rows shown for `date_filter` (or every day when `None`).
///
/// Lodging entries staying `N > 1` days yield `N - 1` continuation rows on the
/// following calendar days. Rows are ordered by day, then by padded time; the
/// sort is stable so same-slot entries keep their input order.
pub fn compute_itinerary_view(
    entries: &[ItineraryEntry],
    date_filter: Option<&str>,
) -> Vec<ItineraryRow> {
    let date_filter = date_filter.map(str::trim).filter(|d| !d.is_empty());

    let mut rows: Vec<ItineraryRow> = entries
        .iter()
        .flat_map(expand_entry)
        .filter(|row| date_filter.is_none_or(|day| row.entry.day == day))
        .collect();

    rows.sort_by(|a, b| {
        a.entry
            .day
            .cmp(&b.entry.day)
            .then_with(|| a.entry.time_sort_key().cmp(&b.entry.time_sort_key()))
    });
    rows
}

fn expand_entry(entry: &ItineraryEntry) -> Vec<ItineraryRow> {
    let mut rows = vec![ItineraryRow {
        entry: entry.clone(),
        is_extra_day: false,
    }];

    if !entry.is_lodging() || entry.duration <= 1 {
        return rows;
    }

    let Ok(start) = NaiveDate::parse_from_str(&entry.day, DAY_FORMAT) else {
        tracing::debug!(
            "[ViewEngine] lodging entry has unparseable day '{}', not expanding",
            entry.day
        );
        return rows;
    };

    for offset in 1..entry.duration {
        let Some(day) = start.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        let mut continuation = entry.clone();
        continuation.day = day.format(DAY_FORMAT).to_string();
        rows.push(ItineraryRow {
            entry: continuation,
            is_extra_day: true,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: serde_json::Value) -> ItineraryEntry {
        ItineraryEntry::from_raw(&value)
    }

    #[test]
    fn test_hotel_stay_expands_one_row_per_day() {
        let entries = vec![entry(json!({
            "id": "1", "day": "2024-05-01", "duration": 3, "category": "Hotel", "content": "Inn"
        }))];
        let rows = compute_itinerary_view(&entries, None);
        let days: Vec<&str> = rows.iter().map(|r| r.entry.day.as_str()).collect();
        assert_eq!(days, vec!["2024-05-01", "2024-05-02", "2024-05-03"]);
        assert_eq!(rows.iter().filter(|r| !r.is_extra_day).count(), 1);
        assert!(rows.iter().all(|r| r.entry.content == "Inn"));
    }

    #[test]
    fn test_expansion_crosses_month_boundary() {
        let entries = vec![entry(json!({ "day": "2024-02-28", "duration": 3, "category": "飯店" }))];
        let rows = compute_itinerary_view(&entries, None);
        assert_eq!(rows[2].entry.day, "2024-03-01");
    }

    #[test]
    fn test_non_lodging_is_not_expanded() {
        let entries = vec![entry(json!({ "day": "2024-05-01", "duration": 3, "category": "景點" }))];
        assert_eq!(compute_itinerary_view(&entries, None).len(), 1);
    }

    #[test]
    fn test_unparseable_day_is_not_expanded() {
        let entries = vec![entry(json!({ "day": "someday", "duration": 3, "category": "Hotel" }))];
        assert_eq!(compute_itinerary_view(&entries, None).len(), 1);
    }

    #[test]
    fn test_sort_by_day_then_padded_time() {
        let entries = vec![
            entry(json!({ "id": "a", "day": "2024-05-02", "time": "0800" })),
            entry(json!({ "id": "b", "day": "2024-05-01", "time": "1400" })),
            entry(json!({ "id": "c", "day": "2024-05-01", "time": "930" })),
            entry(json!({ "id": "d", "day": "2024-05-01" })),
            entry(json!({ "id": "e", "day": "2024-05-01" })),
        ];
        let ids: Vec<String> = compute_itinerary_view(&entries, None)
            .into_iter()
            .filter_map(|r| r.entry.id)
            .collect();
        assert_eq!(ids, vec!["d", "e", "c", "b", "a"]);
    }

    #[test]
    fn test_date_filter_includes_continuations() {
        let entries = vec![
            entry(json!({ "id": "h", "day": "2024-05-01", "duration": 2, "category": "Lodging" })),
            entry(json!({ "id": "x", "day": "2024-05-02", "time": "1000" })),
        ];
        let rows = compute_itinerary_view(&entries, Some("2024-05-02"));
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_extra_day);
        assert_eq!(rows[1].entry.id.as_deref(), Some("x"));
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_itinerary_view(&[], Some("2024-05-01")).is_empty());
    }
}
