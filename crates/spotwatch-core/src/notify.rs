//! Side channel for reporting fetch failures to the user.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::api::FetchError;

/// A user-facing failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    pub title: String,
    pub message: String,
}

impl ErrorNotice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Simplify common failures into messages a dashboard user can act on.
    pub fn from_error(err: &FetchError) -> Self {
        match err {
            FetchError::Network(_) => Self::new(
                "Network error",
                "Network error. Check your connection.",
            ),
            FetchError::RateLimited => Self::new(
                "Server busy",
                "Server is busy. Please wait a moment and try again.",
            ),
            FetchError::ServerError(_) => Self::new(
                "Server error",
                "The server failed to answer. Please try again later.",
            ),
            FetchError::InvalidResponse(_) => Self::new(
                "Unexpected response",
                "Received data the dashboard could not read.",
            ),
            other => Self::new("Error", other.to_string()),
        }
    }
}

/// Receives one notice per failed resolution.
///
/// Implementations must return quickly and must not block; they run on
/// the task that resolved the request, not on the caller's.
pub trait ErrorNotifier: Send + Sync {
    fn notify(&self, notice: &ErrorNotice);
}

/// Logs notices through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ErrorNotifier for TracingNotifier {
    fn notify(&self, notice: &ErrorNotice) {
        error!(title = %notice.title, "{}", notice.message);
    }
}

/// Forwards notices to the presentation layer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<ErrorNotice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ErrorNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ErrorNotifier for ChannelNotifier {
    fn notify(&self, notice: &ErrorNotice) {
        if self.tx.send(notice.clone()).is_err() {
            debug!(title = %notice.title, "Notice dropped - receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_for_rate_limit() {
        let notice = ErrorNotice::from_error(&FetchError::RateLimited);
        assert_eq!(notice.title, "Server busy");
        assert!(notice.message.contains("wait"));
    }

    #[test]
    fn test_notice_falls_back_to_error_text() {
        let notice = ErrorNotice::from_error(&FetchError::NotFound("/api/weekly".to_string()));
        assert_eq!(notice.title, "Error");
        assert_eq!(notice.message, "Resource not found: /api/weekly");
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(&ErrorNotice::new("Error", "boom"));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.message, "boom");
    }

    #[test]
    fn test_channel_notifier_closed_receiver_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(&ErrorNotice::new("Error", "nobody listening"));
    }
}
