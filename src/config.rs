use std::collections::HashMap;

/// Read-only, process-wide key/value lookup.
///
/// Keys use the dotted `<protocol>.proxyHost` convention inherited from the
/// desktop tooling this probe ships with, so the lookup is a seam rather than
/// a hardcoded `std::env` call.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvConfig;

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory configuration, for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct StaticConfig {
    entries: HashMap<String, String>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for StaticConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}
