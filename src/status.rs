use std::sync::Arc;

use parking_lot::RwLock;

/// Last human-readable status line, shared by all drivers.
///
/// Every message is also emitted as a `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    message: Arc<RwLock<String>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        *self.message.write() = message;
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        *self.message.write() = message;
    }

    pub fn current(&self) -> String {
        self.message.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_message() {
        let status = StatusBoard::new();
        assert_eq!(status.current(), "");
        let other = status.clone();
        other.info("Starting...");
        status.warn("WiFi scan failed");
        assert_eq!(other.current(), "WiFi scan failed");
    }
}
