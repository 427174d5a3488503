use std::collections::HashMap;
use std::sync::Arc;

use crate::channel::DynChannel;

/// Maps channel names (`"email"`, `"push"`) to their implementations.
///
/// Built once at startup and shared behind an `Arc`; not meant for
/// concurrent mutation.
pub struct ChannelRegistry {
    channels: HashMap<String, Arc<dyn DynChannel>>,
}

impl ChannelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Register a channel under [`DynChannel::name`]. Replaces an existing
    /// entry with the same name.
    pub fn register(&mut self, channel: Arc<dyn DynChannel>) {
        let name = channel.name().to_owned();
        self.channels.insert(name, channel);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn DynChannel>> {
        self.channels.get(name).cloned()
    }

    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
