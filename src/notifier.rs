use crate::error::AppError;

/// Outbound side of the chat transport: posts text to a channel.
pub trait Notifier: Send + Sync {
    fn send(&self, channel_id: &str, content: &str) -> Result<(), AppError>;
}

/// Writes every outbound message to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, channel_id: &str, content: &str) -> Result<(), AppError> {
        tracing::info!(channel_id, "{}", content);
        Ok(())
    }
}

/// Keeps sent messages in memory, newest last.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryNotifier {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl MemoryNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
impl Notifier for MemoryNotifier {
    fn send(&self, channel_id: &str, content: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((channel_id.to_string(), content.to_string()));
        Ok(())
    }
}

/// Sends and logs a failure instead of returning it; a lost notification
/// never fails the event that produced it.
pub fn deliver(notifier: &dyn Notifier, channel_id: &str, content: &str) {
    if let Err(e) = notifier.send(channel_id, content) {
        tracing::error!("Failed to notify channel {}: {}", channel_id, e);
    }
}
