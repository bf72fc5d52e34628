use crate::normalize::{normalize_list, normalize_rates};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Payment methods offered when the trip settings do not list any.
pub const DEFAULT_PAYMENT_METHODS: &[&str] = &["現金", "信用卡"];

/// Units of the home currency per one unit of `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub code: String,
    pub rate: f64,
}

/// Per-trip option lists and the currency table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub travelers: Vec<String>,
    pub categories: Vec<String>,
    pub wish_tags: Vec<String>,
    pub payment_methods: Vec<String>,
    pub rates: Vec<ExchangeRate>,
}

impl Settings {
    pub fn from_raw(raw: &Value) -> Self {
        let field = |name: &str| raw.get(name).unwrap_or(&Value::Null);
        let mut payment_methods = normalize_list(field("paymentMethods"));
        if payment_methods.is_empty() {
            payment_methods = DEFAULT_PAYMENT_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect();
        }

        Self {
            travelers: normalize_list(field("travelers")),
            categories: normalize_list(field("categories")),
            wish_tags: normalize_list(field("wishTags")),
            payment_methods,
            rates: normalize_rates(field("rates")),
        }
    }

    /// Encodes settings for `updateSettings`: lists comma-joined, rates as an array.
    pub fn to_wire(&self) -> Value {
        json!({
            "travelers": self.travelers.join(","),
            "categories": self.categories.join(","),
            "wishTags": self.wish_tags.join(","),
            "paymentMethods": self.payment_methods.join(","),
            "rates": self.rates,
        })
    }

    pub fn rate_for(&self, code: &str) -> Option<f64> {
        self.rates.iter().find(|r| r.code == code).map(|r| r.rate)
    }

    /// Currency preselected for new expenses: the first configured one.
    pub fn default_currency(&self) -> &str {
        self.rates.first().map(|r| r.code.as_str()).unwrap_or("TWD")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_lists_and_defaults() {
        let settings = Settings::from_raw(&json!({
            "travelers": "Amy, Ben,",
            "categories": ["景點", "飯店"],
            "rates": "[{\"code\":\"JPY\",\"rate\":0.21}]"
        }));
        assert_eq!(settings.travelers, vec!["Amy", "Ben"]);
        assert_eq!(settings.categories, vec!["景點", "飯店"]);
        assert_eq!(settings.payment_methods, vec!["現金", "信用卡"]);
        assert_eq!(settings.default_currency(), "JPY");
        assert_eq!(settings.rate_for("JPY"), Some(0.21));
    }

    #[test]
    fn test_to_wire_joins_lists() {
        let settings = Settings {
            travelers: vec!["Amy".to_string(), "Ben".to_string()],
            ..Default::default()
        };
        let wire = settings.to_wire();
        assert_eq!(wire["travelers"], json!("Amy,Ben"));
        assert_eq!(wire["rates"], json!([]));
    }
}
