//! Boundary between catalog operations and user-facing notifications.

use async_trait::async_trait;

use crate::error::CatalogError;

/// Mutation families whose failures surface as blocking alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Creating a new record.
    Create,
    /// Replacing an existing record.
    Update,
    /// Removing a record.
    Delete,
}

impl MutationKind {
    /// Fixed alert text shown when this mutation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            MutationKind::Create => {
                "Failed to create game. Please check your input and try again."
            }
            MutationKind::Update => "Failed to update game status. Please try again.",
            MutationKind::Delete => "Failed to delete game. Please try again.",
        }
    }
}

/// Presentation-side sink for alerts and confirmation prompts.
///
/// Catalog operations never render anything themselves; they hand the typed
/// failure to this trait and move on. Implementations decide what a blocking
/// alert or a confirmation looks like.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a blocking failure alert for a mutation. Resolves once the user
    /// has dismissed it.
    async fn alert(&self, kind: MutationKind, error: &CatalogError);

    /// Ask the user to confirm a destructive action. `false` aborts it.
    async fn confirm(&self, prompt: &str) -> bool;
}
