/// Transient user notifications ("toasts")

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { severity: Severity::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }
}

/// A non-blocking message surface; notifications are fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Routes notifications to the `log` facade
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Info => log::info!("{}", n.message),
            Severity::Success => log::info!("success: {}", n.message),
            Severity::Error => log::error!("{}", n.message),
        }
    }
}

/// Keeps every notification in memory for tests
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.notifications()
            .into_iter()
            .map(|n| (n.severity, n.message))
            .collect()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.notifications().iter().filter(|n| n.severity == severity).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_counts_by_severity() {
        let n = RecordingNotifier::new();
        n.notify(Notification::info("a"));
        n.notify(Notification::success("b"));
        n.notify(Notification::success("c"));
        assert_eq!(n.count(Severity::Success), 2);
        assert_eq!(n.count(Severity::Error), 0);
        assert_eq!(n.notifications()[0].message, "a");
    }
}
