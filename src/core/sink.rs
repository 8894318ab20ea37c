//! Injected output sink for scan narration.

use std::sync::Arc;
use tracing::Level;

pub trait EventSink: Send + Sync {
    fn emit(&self, level: Level, message: &str);
}

pub type SharedSink = Arc<dyn EventSink>;

/// Forwards to the global `tracing` subscriber.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            _ => tracing::trace!("{}", message),
        }
    }
}

pub struct SilentSink;

impl EventSink for SilentSink {
    fn emit(&self, _level: Level, _message: &str) {}
}

#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    events: std::sync::Mutex<Vec<(Level, String)>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl EventSink for MemorySink {
    fn emit(&self, level: Level, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::default();
        sink.emit(Level::INFO, "first");
        sink.emit(Level::DEBUG, "second");
        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], (Level::INFO, "first".to_string()));
        assert_eq!(messages[1].1, "second");
    }
}
