//! Domain records and the normalized snapshot.

pub mod expense;
pub mod itinerary;
pub mod record;
pub mod settings;
pub mod snapshot;
pub mod wish;

pub use expense::ExpenseRecord;
pub use itinerary::{ItineraryEntry, ItineraryRow, LODGING_CATEGORIES, is_lodging_category};
pub use record::{Record, SheetKind};
pub use settings::{DEFAULT_PAYMENT_METHODS, ExchangeRate, Settings};
pub use snapshot::{RawDataset, Snapshot};
pub use wish::WishItem;
