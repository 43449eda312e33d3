//! E-ink canvas client and photo sync engine
//!
//! Typed async client for BLOOMIN8-style e-ink photo displays, plus a sync
//! pipeline that discovers photos in a host media tree, dedups them against
//! the device gallery, and uploads them with bounded retries.

pub mod controller;
pub mod device;
pub mod error;
pub mod logbook;
pub mod media;
pub mod sync;
pub mod types;

pub use controller::Controller;
pub use device::{DeviceClient, GalleryStore};
pub use error::{CanvasError, Result};
pub use media::{MediaLibrary, MediaNode, PhotoCandidate, PhotoFetcher};
pub use sync::{RetryPolicy, SyncEngine, SyncOptions, SyncReport};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
