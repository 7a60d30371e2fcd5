//! Pathstore: a path-addressed, filesystem-backed hierarchical document store.
//!
//! Logical paths (`"games/42/info/name"`) map to nodes that are either
//! directories or leaf values. Each node may carry a nested metadata record
//! kept in a side file next to its primary value.

pub mod config;
pub mod ephemeral;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod node;
pub mod path;
pub mod protection;
pub mod snapshot;
pub mod store;
pub mod tooling;
pub mod types;
pub mod value;

pub use config::{ConfigLoader, StoreConfig};
pub use ephemeral::EphemeralStore;
pub use error::{Result, StoreError};
pub use metadata::{MetaKey, Metadata, MetadataStore};
pub use node::Node;
pub use path::LogicalPath;
pub use protection::{ProtectedPaths, ProtectionPolicy, Unprotected};
pub use snapshot::{TreeSnapshot, TreeSource};
pub use store::Store;
pub use types::NodeKind;
pub use value::{Encoding, Value};
