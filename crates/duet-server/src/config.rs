use std::path::Path;

use serde::Deserialize;

use crate::api::check_room_id;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "duet.toml";

/// Top-level server configuration, loaded from `duet.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Room used when a request does not name one.
    pub default_room_id: String,
    pub limits: LimitsConfig,
    pub stream: StreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            default_room_id: "duet-room".to_string(),
            limits: LimitsConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

/// Connection caps and size limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_sse_subscribers: usize,
    pub signal_queue_capacity: usize,
    pub max_signal_payload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sse_subscribers: 100,
            signal_queue_capacity: 150,
            max_signal_payload_bytes: 16 * 1024,
        }
    }
}

/// Event stream settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub keep_alive_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: 15,
        }
    }
}

impl ServerConfig {
    /// Check the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }
        check_room_id(self.default_room_id.trim())
            .map_err(|e| format!("default_room_id {:?}: {e}", self.default_room_id))?;

        let zero_checks = [
            ("limits.max_sse_subscribers", self.limits.max_sse_subscribers),
            ("limits.signal_queue_capacity", self.limits.signal_queue_capacity),
            (
                "limits.max_signal_payload_bytes",
                self.limits.max_signal_payload_bytes,
            ),
        ];
        for (name, value) in zero_checks {
            if value == 0 {
                return Err(format!("{name} must be > 0"));
            }
        }
        if self.stream.keep_alive_secs == 0 {
            return Err("stream.keep_alive_secs must be > 0".to_string());
        }
        Ok(())
    }

    /// Load config from `duet.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file(Path::new(CONFIG_FILE));
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn load_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Failed to parse config: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                ServerConfig::default()
            },
        }
    }

    /// Apply `DUET_*` overrides. `lookup` resolves a variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("DUET_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        }
        if let Some(room) = lookup("DUET_DEFAULT_ROOM")
            && !room.trim().is_empty()
        {
            self.default_room_id = room.trim().to_string();
        }
        if let Some(val) = lookup("DUET_MAX_SSE_SUBSCRIBERS") {
            match val.parse::<usize>() {
                Ok(n) => self.limits.max_sse_subscribers = n,
                Err(e) => tracing::warn!(value = %val, "Ignoring DUET_MAX_SSE_SUBSCRIBERS: {e}"),
            }
        }
        if let Some(val) = lookup("DUET_KEEP_ALIVE_SECS") {
            match val.parse::<u64>() {
                Ok(n) => self.stream.keep_alive_secs = n,
                Err(e) => tracing::warn!(value = %val, "Ignoring DUET_KEEP_ALIVE_SECS: {e}"),
            }
        }
    }
}
