use super::{ExpenseRecord, ItineraryEntry, Record, Settings, SheetKind, WishItem};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The backend's full-dataset response, kept loosely typed.
///
/// This is what the local cache stores verbatim and what the normalizer reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub itinerary: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expenses: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wishes: Vec<Value>,
    #[serde(default)]
    pub settings: Value,
    #[serde(
        default,
        rename = "appName",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_name: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The normalized in-memory dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub itinerary: Vec<ItineraryEntry>,
    pub expenses: Vec<ExpenseRecord>,
    pub wishes: Vec<WishItem>,
    pub settings: Settings,
    pub app_name: Option<String>,
}

impl Snapshot {
    /// Normalizes every record of a raw dataset.
    pub fn from_raw(raw: &RawDataset) -> Self {
        Self {
            itinerary: raw.itinerary.iter().map(ItineraryEntry::from_raw).collect(),
            expenses: raw.expenses.iter().map(ExpenseRecord::from_raw).collect(),
            wishes: raw.wishes.iter().map(WishItem::from_raw).collect(),
            settings: Settings::from_raw(&raw.settings),
            app_name: raw
                .app_name
                .as_ref()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        }
    }

    /// Returns a copy of the record stored under `(sheet, id)`.
    pub fn find(&self, sheet: SheetKind, id: &str) -> Option<Record> {
        match sheet {
            SheetKind::Itinerary => find_by_id(&self.itinerary, id, |r| r.id.as_deref())
                .map(|r| Record::Itinerary(r.clone())),
            SheetKind::Expenses => find_by_id(&self.expenses, id, |r| r.id.as_deref())
                .map(|r| Record::Expense(r.clone())),
            SheetKind::Wishes => find_by_id(&self.wishes, id, |r| r.id.as_deref())
                .map(|r| Record::Wish(r.clone())),
        }
    }

    pub fn find_wish(&self, id: &str) -> Option<&WishItem> {
        find_by_id(&self.wishes, id, |w| w.id.as_deref())
    }

    /// Replaces the record with the same id, or appends it when absent.
    ///
    /// Records without an id are always appended.
    pub fn put(&mut self, record: Record) {
        match record {
            Record::Itinerary(r) => put_by_id(&mut self.itinerary, r, |x| x.id.as_deref()),
            Record::Expense(r) => put_by_id(&mut self.expenses, r, |x| x.id.as_deref()),
            Record::Wish(r) => put_by_id(&mut self.wishes, r, |x| x.id.as_deref()),
        }
    }

    /// Removes a record, returning its former position so it can be restored.
    pub fn remove(&mut self, sheet: SheetKind, id: &str) -> Option<(usize, Record)> {
        match sheet {
            SheetKind::Itinerary => remove_by_id(&mut self.itinerary, id, |x| x.id.as_deref())
                .map(|(i, r)| (i, Record::Itinerary(r))),
            SheetKind::Expenses => remove_by_id(&mut self.expenses, id, |x| x.id.as_deref())
                .map(|(i, r)| (i, Record::Expense(r))),
            SheetKind::Wishes => remove_by_id(&mut self.wishes, id, |x| x.id.as_deref())
                .map(|(i, r)| (i, Record::Wish(r))),
        }
    }

    /// Puts a previously removed record back at its former position.
    pub fn restore_at(&mut self, index: usize, record: Record) {
        match record {
            Record::Itinerary(r) => insert_clamped(&mut self.itinerary, index, r),
            Record::Expense(r) => insert_clamped(&mut self.expenses, index, r),
            Record::Wish(r) => insert_clamped(&mut self.wishes, index, r),
        }
    }
}

fn find_by_id<'a, T>(items: &'a [T], id: &str, key: impl Fn(&T) -> Option<&str>) -> Option<&'a T> {
    items.iter().find(|item| key(item) == Some(id))
}

fn put_by_id<T>(items: &mut Vec<T>, record: T, key: impl Fn(&T) -> Option<&str>) {
    let position = key(&record).and_then(|id| items.iter().position(|item| key(item) == Some(id)));
    match position {
        Some(index) => items[index] = record,
        None => items.push(record),
    }
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    key: impl Fn(&T) -> Option<&str>,
) -> Option<(usize, T)> {
    let index = items.iter().position(|item| key(item) == Some(id))?;
    Some((index, items.remove(index)))
}

fn insert_clamped<T>(items: &mut Vec<T>, index: usize, record: T) {
    let index = index.min(items.len());
    items.insert(index, record);
}
