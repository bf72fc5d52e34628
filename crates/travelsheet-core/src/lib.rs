pub mod api;
pub mod cache;
pub mod checklist;
pub mod config;
pub mod credential;
pub mod draft;
pub mod error;
pub mod model;
pub mod normalize;
pub mod view;

// Re-export common error type
pub use error::TravelError;
