//! Test doubles for the injected collaborators.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests under `tests/`.

pub mod fixtures;
pub mod object_store;
pub mod push_client;
pub mod registry;

pub use fixtures::{jpeg_bytes, png_bytes};
pub use object_store::MemoryObjectStore;
pub use push_client::{PushBehavior, ScriptedPushClient};
pub use registry::UnavailableRegistry;
