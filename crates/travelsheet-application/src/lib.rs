//! Application layer for travelsheet.
//!
//! Owns the session, the optimistic mutation coordinator, and image uploads;
//! coordinates the pure core with whatever backend and cache implementations
//! the caller wires in.

pub mod coordinator;
pub mod notice;
pub mod session;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use coordinator::{MutationCoordinator, RecordKey, RefreshOutcome, SyncState};
pub use notice::{Notice, NoticeLevel, NoticeSender};
pub use session::SessionContext;
pub use upload::{ImageUploader, UploadProgress, UploadReport};
