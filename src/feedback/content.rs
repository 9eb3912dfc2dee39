//! Notification content for session completion.

use uuid::Uuid;

use crate::types::SessionType;

/// Prefix of every completion notification identifier.
pub const COMPLETION_ID_PREFIX: &str = "session-complete-";

/// Title and body shown when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Unique request identifier.
    pub id: String,
    /// Session whose completion is announced.
    pub session_type: SessionType,
    pub title: &'static str,
    pub body: &'static str,
}

impl NotificationContent {
    /// Builds the completion content for `session_type` with a fresh identifier.
    #[must_use]
    pub fn completion(session_type: SessionType) -> Self {
        let (title, body) = match session_type {
            SessionType::Work => (
                "Work Session Complete!",
                "Great job! Time for a well-deserved break.",
            ),
            SessionType::ShortBreak => ("Break Complete!", "Ready to get back to work? Let's go!"),
            SessionType::LongBreak => (
                "Long Break Complete!",
                "Refreshed and ready for the next session!",
            ),
        };

        Self {
            id: format!("{}{}", COMPLETION_ID_PREFIX, Uuid::new_v4()),
            session_type,
            title,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_content() {
        let content = NotificationContent::completion(SessionType::Work);
        assert_eq!(content.title, "Work Session Complete!");
        assert!(content.body.contains("break"));
        assert_eq!(content.session_type, SessionType::Work);
    }

    #[test]
    fn test_break_content() {
        let short = NotificationContent::completion(SessionType::ShortBreak);
        let long = NotificationContent::completion(SessionType::LongBreak);
        assert_eq!(short.title, "Break Complete!");
        assert_eq!(long.title, "Long Break Complete!");
    }

    #[test]
    fn test_identifiers_are_unique() {
        let a = NotificationContent::completion(SessionType::Work);
        let b = NotificationContent::completion(SessionType::Work);
        assert!(a.id.starts_with(COMPLETION_ID_PREFIX));
        assert_ne!(a.id, b.id);
    }
}
