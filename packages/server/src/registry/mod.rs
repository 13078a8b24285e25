//! Metadata registries for pushers and plugins.
//!
//! Writes are independent upserts; nothing here spans a transaction across
//! registries or the artifact store.

mod plugin;
mod pusher;

pub use plugin::{ExistingPlugin, PluginFields, PluginRegistry};
pub use pusher::PusherRegistry;
