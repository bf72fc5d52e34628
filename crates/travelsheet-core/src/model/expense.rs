use crate::model::ExchangeRate;
use crate::normalize::{
    normalize_date_token, normalize_id, normalize_image_list, normalize_number, split_list,
    value_to_string,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One spending entry in the shared ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: Option<String>,
    pub date: String,
    pub item: String,
    /// Amount in `currency`.
    pub amount: f64,
    pub currency: String,
    /// Home-currency equivalent, fixed when the record was submitted.
    pub twd: f64,
    pub payer: String,
    /// Comma-joined traveler names who owe a share.
    pub debtor: String,
    pub payment_method: String,
    pub remark: String,
    /// Receipt image; expenses carry at most one.
    pub image: String,
}

impl ExpenseRecord {
    /// Builds a record from a raw backend row.
    pub fn from_raw(raw: &Value) -> Self {
        let field = |name: &str| raw.get(name).unwrap_or(&Value::Null);
        Self {
            id: normalize_id(field("id")),
            date: normalize_date_token(field("date")),
            item: value_to_string(field("item")),
            amount: normalize_number(field("amount")),
            currency: value_to_string(field("currency")),
            twd: normalize_number(field("twd")),
            payer: value_to_string(field("payer")),
            debtor: value_to_string(field("debtor")),
            payment_method: value_to_string(field("paymentMethod")),
            remark: value_to_string(field("remark")),
            image: normalize_image_list(field("image"))
                .into_iter()
                .next()
                .unwrap_or_default(),
        }
    }

    /// Encodes the record with the backend's column names.
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.id,
            "date": self.date,
            "item": self.item,
            "amount": self.amount,
            "currency": self.currency,
            "twd": self.twd,
            "payer": self.payer,
            "debtor": self.debtor,
            "paymentMethod": self.payment_method,
            "remark": self.remark,
            "image": self.image,
        })
    }

    /// The traveler names listed as debtors.
    pub fn debtors(&self) -> Vec<String> {
        split_list(&self.debtor)
    }

    /// Computes the home-currency amount from the given rate table.
    ///
    /// Unknown currencies convert at 1. The result is rounded to a whole unit.
    pub fn compute_twd(&self, rates: &[ExchangeRate]) -> f64 {
        let rate = rates
            .iter()
            .find(|r| r.code == self.currency)
            .map(|r| r.rate)
            .unwrap_or(1.0);
        (self.amount * rate).round()
    }

    /// Selecting a payer also makes them the sole default debtor.
    pub fn select_payer(&mut self, name: &str) {
        self.payer = name.to_string();
        self.debtor = name.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> Vec<ExchangeRate> {
        vec![ExchangeRate {
            code: "JPY".to_string(),
            rate: 0.215,
        }]
    }

    #[test]
    fn test_from_raw() {
        let raw = json!({
            "id": "3",
            "date": "2024-05-02T00:00:00.000Z",
            "amount": "1200",
            "currency": "JPY",
            "twd": 258,
            "debtor": "Amy,Ben",
            "paymentMethod": "信用卡",
            "image": "[\"https://drive.google.com/file/d/r1/view\"]"
        });
        let record = ExpenseRecord::from_raw(&raw);
        assert_eq!(record.date, "2024-05-02");
        assert_eq!(record.amount, 1200.0);
        assert_eq!(record.twd, 258.0);
        assert_eq!(record.debtors(), vec!["Amy", "Ben"]);
        assert_eq!(
            record.image,
            "https://drive.google.com/thumbnail?id=r1&sz=s1000"
        );
    }

    #[test]
    fn test_compute_twd_uses_rate_table() {
        let mut record = ExpenseRecord::from_raw(&json!({ "amount": 1000, "currency": "JPY" }));
        assert_eq!(record.compute_twd(&rates()), 215.0);
        record.currency = "EUR".to_string();
        assert_eq!(record.compute_twd(&rates()), 1000.0);
    }

    #[test]
    fn test_select_payer_sets_debtor() {
        let mut record = ExpenseRecord::from_raw(&json!({ "debtor": "Amy,Ben" }));
        record.select_payer("Ben");
        assert_eq!(record.payer, "Ben");
        assert_eq!(record.debtor, "Ben");
    }
}
