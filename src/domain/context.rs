//! Moderator Context
//!
//! Metadata about the current operation for the action log and tracing.
//! Filled in by the session middleware and threaded through every handler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Table;

/// Context for a moderator action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorContext {
    /// Display name the moderator logged in with
    pub author: String,

    /// Table the session is bound to
    pub table: Table,

    /// Session this request belongs to
    pub session_id: Uuid,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl ModeratorContext {
    /// Create a context for a logged-in moderator.
    pub fn new(author: impl Into<String>, table: Table, session_id: Uuid) -> Self {
        Self {
            author: author.into(),
            table,
            session_id,
            correlation_id: None,
        }
    }

    /// Attach a correlation ID.
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present.
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let session_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let context = ModeratorContext::new("alice", Table::Britain, session_id)
            .with_correlation_id(correlation_id);

        assert_eq!(context.author, "alice");
        assert_eq!(context.table, Table::Britain);
        assert_eq!(context.session_id, session_id);
        assert_eq!(context.correlation_id, Some(correlation_id));
    }

    #[test]
    fn test_ensure_correlation_id() {
        let mut context = ModeratorContext::new("bob", Table::Island, Uuid::new_v4());
        assert!(context.correlation_id.is_none());

        let id = context.ensure_correlation_id();
        assert_eq!(context.correlation_id, Some(id));

        // Calling again returns the same ID
        let id2 = context.ensure_correlation_id();
        assert_eq!(id, id2);
    }
}
