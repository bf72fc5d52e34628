use super::format::format_thousands;
use super::order::compare_numeric_ids;
use crate::model::ExpenseRecord;
use serde::Serialize;

/// Filter value that matches every traveler.
pub const ALL: &str = "all";

/// Filtered, ordered expenses with their home-currency total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseLedger {
    pub rows: Vec<ExpenseRecord>,
    pub total_twd: f64,
    /// `NT$ 1,234`
    pub formatted_total: String,
}

fn is_wildcard(filter: &str) -> bool {
    let filter = filter.trim();
    filter.is_empty() || filter == ALL
}

/// Computes the ledger for the given payer and debtor filters.
///
/// Newest dates come first; records on the same date are ordered by numeric
/// id, highest first.
pub fn compute_expense_view(
    records: &[ExpenseRecord],
    payer_filter: &str,
    debtor_filter: &str,
) -> ExpenseLedger {
    let payer = payer_filter.trim();
    let debtor = debtor_filter.trim();

    let mut rows: Vec<ExpenseRecord> = records
        .iter()
        .filter(|r| is_wildcard(payer) || r.payer == payer)
        .filter(|r| is_wildcard(debtor) || r.debtors().iter().any(|d| d == debtor))
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        b.date.cmp(&a.date).then_with(|| {
            compare_numeric_ids(
                b.id.as_deref().unwrap_or_default(),
                a.id.as_deref().unwrap_or_default(),
            )
        })
    });

    let total_twd: f64 = rows.iter().map(|r| r.twd).sum();
    ExpenseLedger {
        formatted_total: format!("NT$ {}", format_thousands(total_twd)),
        total_twd,
        rows,
    }
}
