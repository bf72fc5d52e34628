//! Derived views over the normalized snapshot.
//!
//! Every function here is pure and total: it borrows the snapshot collections,
//! returns freshly owned rows, and never fails on any input.

pub mod expense;
pub mod format;
pub mod itinerary;
pub mod order;
pub mod wish;

pub use expense::{ALL, ExpenseLedger, compute_expense_view};
pub use format::{
    CategoryColors, available_dates, category_color_map, format_display_date,
    format_display_time, format_thousands, weekday_label,
};
pub use itinerary::compute_itinerary_view;
pub use order::{compare_numeric_ids, parse_loose_timestamp};
pub use wish::compute_wish_view;
