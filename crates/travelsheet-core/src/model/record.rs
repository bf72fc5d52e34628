use super::{ExpenseRecord, ItineraryEntry, WishItem};
use crate::error::TravelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The backend sheets that hold mutable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetKind {
    Itinerary,
    Expenses,
    Wishes,
}

impl SheetKind {
    /// Sheet name as the backend spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Itinerary => "Itinerary",
            SheetKind::Expenses => "Expenses",
            SheetKind::Wishes => "Wishes",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetKind {
    type Err = TravelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "itinerary" => Ok(SheetKind::Itinerary),
            "expenses" | "expense" => Ok(SheetKind::Expenses),
            "wishes" | "wish" => Ok(SheetKind::Wishes),
            other => Err(TravelError::config(format!("unknown sheet '{}'", other))),
        }
    }
}

/// Any record the coordinator can mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Itinerary(ItineraryEntry),
    Expense(ExpenseRecord),
    Wish(WishItem),
}

impl Record {
    pub fn sheet(&self) -> SheetKind {
        match self {
            Record::Itinerary(_) => SheetKind::Itinerary,
            Record::Expense(_) => SheetKind::Expenses,
            Record::Wish(_) => SheetKind::Wishes,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Record::Itinerary(r) => r.id.as_deref(),
            Record::Expense(r) => r.id.as_deref(),
            Record::Wish(r) => r.id.as_deref(),
        }
    }

    pub fn set_id(&mut self, id: Option<String>) {
        match self {
            Record::Itinerary(r) => r.id = id,
            Record::Expense(r) => r.id = id,
            Record::Wish(r) => r.id = id,
        }
    }

    /// Backend column layout for `addData` / `updateData`.
    pub fn to_wire(&self) -> Value {
        match self {
            Record::Itinerary(r) => r.to_wire(),
            Record::Expense(r) => r.to_wire(),
            Record::Wish(r) => r.to_wire(),
        }
    }

    pub fn as_wish(&self) -> Option<&WishItem> {
        match self {
            Record::Wish(w) => Some(w),
            _ => None,
        }
    }
}

impl From<ItineraryEntry> for Record {
    fn from(value: ItineraryEntry) -> Self {
        Record::Itinerary(value)
    }
}

impl From<ExpenseRecord> for Record {
    fn from(value: ExpenseRecord) -> Self {
        Record::Expense(value)
    }
}

impl From<WishItem> for Record {
    fn from(value: WishItem) -> Self {
        Record::Wish(value)
    }
}
