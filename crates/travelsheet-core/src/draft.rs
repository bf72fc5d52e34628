//! Pre-filled records for the add forms.

use crate::model::{ExpenseRecord, ItineraryEntry, Settings, WishItem};
use crate::normalize::split_list;

/// Category preselected for new itinerary entries.
pub const DEFAULT_ITINERARY_CATEGORY: &str = "景點";

pub fn new_itinerary_entry(today: &str) -> ItineraryEntry {
    ItineraryEntry {
        id: None,
        day: today.to_string(),
        time: String::new(),
        category: DEFAULT_ITINERARY_CATEGORY.to_string(),
        content: String::new(),
        location: String::new(),
        remark: String::new(),
        duration: 1,
        images: Vec::new(),
    }
}

/// A blank expense paid by, and owed by, the first traveler.
pub fn new_expense(settings: &Settings, today: &str) -> ExpenseRecord {
    let first_traveler = settings.travelers.first().cloned().unwrap_or_default();
    ExpenseRecord {
        id: None,
        date: today.to_string(),
        item: String::new(),
        amount: 0.0,
        currency: settings.default_currency().to_string(),
        twd: 0.0,
        payer: first_traveler.clone(),
        debtor: first_traveler,
        payment_method: settings
            .payment_methods
            .first()
            .cloned()
            .unwrap_or_default(),
        remark: String::new(),
        image: String::new(),
    }
}

pub fn new_wish(settings: &Settings) -> WishItem {
    WishItem {
        id: None,
        tag: String::new(),
        content: String::new(),
        is_done: false,
        payer: settings.travelers.first().cloned().unwrap_or_default(),
        images: Vec::new(),
        update_time: String::new(),
    }
}

/// Adds `item` to a comma-joined list, or removes it when already present.
pub fn toggle_selection(list: &str, item: &str) -> String {
    let mut items = split_list(list);
    match items.iter().position(|existing| existing == item) {
        Some(index) => {
            items.remove(index);
        }
        None => items.push(item.to_string()),
    }
    items.join(",")
}

pub fn is_selected(list: &str, item: &str) -> bool {
    split_list(list).iter().any(|existing| existing == item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExchangeRate;

    fn settings() -> Settings {
        Settings {
            travelers: vec!["Amy".into(), "Ben".into()],
            payment_methods: vec!["現金".into(), "信用卡".into()],
            rates: vec![ExchangeRate {
                code: "JPY".into(),
                rate: 0.21,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_expense_defaults() {
        let draft = new_expense(&settings(), "2024-05-01");
        assert_eq!(draft.currency, "JPY");
        assert_eq!(draft.payer, "Amy");
        assert_eq!(draft.debtor, "Amy");
        assert_eq!(draft.payment_method, "現金");
        assert!(draft.id.is_none());

        let bare = new_expense(&Settings::default(), "2024-05-01");
        assert_eq!(bare.currency, "TWD");
        assert_eq!(bare.payer, "");
    }

    #[test]
    fn test_itinerary_and_wish_defaults() {
        let entry = new_itinerary_entry("2024-05-01");
        assert_eq!(entry.category, "景點");
        assert_eq!(entry.duration, 1);

        let wish = new_wish(&settings());
        assert!(!wish.is_done);
        assert_eq!(wish.payer, "Amy");
    }

    #[test]
    fn test_toggle_selection() {
        assert_eq!(toggle_selection("", "Amy"), "Amy");
        assert_eq!(toggle_selection("Amy", "Ben"), "Amy,Ben");
        assert_eq!(toggle_selection("Amy,Ben", "Amy"), "Ben");
        assert!(is_selected("Amy,Ben", "Ben"));
        assert!(!is_selected("Amy,Ben", "Cleo"));
    }
}
