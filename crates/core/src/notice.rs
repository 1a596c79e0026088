//! User-facing notifications.
//!
//! A [`Notice`] is a value: the UI layer decides how to show it and is
//! responsible for dismissing it after [`Notice::dismiss_after`].

use std::time::Duration;

use serde::Serialize;

/// How long menu notices stay on screen.
pub const MENU_NOTICE_DURATION: Duration = Duration::from_secs(3);

/// How long checkout and admin notices stay on screen.
pub const FORM_NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// A timed, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip)]
    pub dismiss_after: Duration,
}

impl Notice {
    /// Create a notice with the form duration.
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            dismiss_after: FORM_NOTICE_DURATION,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    /// Override how long the notice stays visible.
    #[must_use]
    pub const fn lasting(mut self, duration: Duration) -> Self {
        self.dismiss_after = duration;
        self
    }
}
