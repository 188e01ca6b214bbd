//! Notification Sink
//!
//! Fire-and-forget channel for surfacing outcomes to the user.

/// Where success and error messages go
pub trait NotificationSink: Send + Sync {
    fn notify_success(&self, title: &str, detail: &str);
    fn notify_error(&self, title: &str, detail: &str);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify_success(&self, title: &str, detail: &str) {
        log::info!("{}: {}", title, detail);
    }

    fn notify_error(&self, title: &str, detail: &str) {
        log::error!("{}: {}", title, detail);
    }
}
