//! Per-user session state: authentication gate, persistence, containers.
pub mod auth;
pub mod container;
pub mod storage;

pub use auth::{landing_path, AuthGate, AuthStatus, GateDecision, Identity, LoginRedirect, Navigator, RecordingNavigator, Role};
pub use container::{CartContainer, Outcome, Reducer, StateContainer, WishlistContainer};
pub use storage::{storage_key, FileStore, KeyValueStore, MemoryStore, SnapshotStore, StorageError};
