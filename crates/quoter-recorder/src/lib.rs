//! Fill recording: bounded-queue drain worker and JSON Lines storage.

pub mod error;
pub mod recorder;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use recorder::{FillRecorder, DRAIN_PAUSE};
pub use store::{FillStore, JsonLinesStore, MemoryStore};
