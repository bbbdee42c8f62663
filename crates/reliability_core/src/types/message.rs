//! Messages collected during a calculation.

use std::fmt;

/// Severity of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MessageKind {
    /// Diagnostic detail
    Debug,
    /// Informational
    Info,
    /// Something the caller should look at, the result is still usable
    Warning,
    /// A sample or step failed
    Error,
}

/// Message attached to a design point.
///
/// # Examples
/// ```
/// use reliability_core::types::{Message, MessageKind};
///
/// let msg = Message::warning("no convergence after 50 iterations");
/// assert_eq!(msg.kind, MessageKind::Warning);
/// assert_eq!(msg.to_string(), "[warning] no convergence after 50 iterations");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Severity
    pub kind: MessageKind,
    /// Human readable text
    pub text: String,
}

impl Message {
    /// Creates a message.
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Informational message.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Info, text)
    }

    /// Warning message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Warning, text)
    }

    /// Error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, text)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Debug => "debug",
            MessageKind::Info => "info",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.text)
    }
}
