use derive_more::Display;

use crate::domain::logging::LogComponent;
use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NotificationLevel {
    #[display(fmt = "info")]
    Info,
    #[display(fmt = "warning")]
    Warning,
    #[display(fmt = "error")]
    Error,
}

/// Transient user-facing messages (toasts).
pub trait Notifier {
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Fallback when no notification container exists: messages only reach the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        let component = LogComponent::Application("Notify");
        match level {
            NotificationLevel::Info => log_info!(component, "{}", message),
            NotificationLevel::Warning => log_warn!(component, "{}", message),
            NotificationLevel::Error => log_error!(component, "{}", message),
        }
    }
}
