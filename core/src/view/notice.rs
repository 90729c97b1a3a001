use crate::prelude::GatewayError;
use crate::telemetry::log::LogManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Pending notices of one screen. Each failure is reported exactly once.
pub struct Notices {
    pending: Vec<Notice>,
    logger: LogManager,
}

impl Notices {
    pub fn new(scope: &'static str) -> Self {
        Self {
            pending: Vec::new(),
            logger: LogManager::new(scope),
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.logger.record(&message);
        self.pending.push(Notice {
            level: NoticeLevel::Success,
            message,
        });
    }

    /// Logs the cause and queues a generic message for the user.
    pub fn failure(&mut self, action: &str, err: &GatewayError) {
        self.logger.warn(&format!("failed to {action}: {err}"));
        let message = match err {
            GatewayError::NotAuthenticated => format!("Please sign in to {action}."),
            GatewayError::Validation(reason) => format!("Could not {action}: {reason}."),
            _ => format!("Could not {action}. Please try again."),
        };
        self.pending.push(Notice {
            level: NoticeLevel::Error,
            message,
        });
    }

    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
