//! Business logic services for the back office.
//!
//! # Services
//!
//! - `listing` - Claude-assisted product listing drafts

pub mod listing;

pub use listing::{ListingDraft, ListingError, ListingImage, ListingService};
