//! Audit trail of workspace decisions.
//!
//! Every lifecycle call is recorded with its outcome, newest first. The log
//! is observational: nothing in the workspace reads it back to decide.

use chrono::{DateTime, Utc};
use draft_access::{DocumentId, EntityId, IdentityId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::WorkspaceError;

/// Maximum entries in the audit log before pruning.
const MAX_AUDIT_ENTRIES: usize = 10_000;

/// Lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    ChangeVisibility,
    Delete,
    AddComment,
    DeleteComment,
    ListVisible,
    GetComments,
    View,
    Statistics,
    OpenWorkspace,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::ChangeVisibility => "change visibility",
            Self::Delete => "delete",
            Self::AddComment => "add comment",
            Self::DeleteComment => "delete comment",
            Self::ListVisible => "list drafts",
            Self::GetComments => "read comments",
            Self::View => "view",
            Self::Statistics => "read statistics",
            Self::OpenWorkspace => "open workspace",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a recorded call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Forbidden,
    NotFound,
    /// Rejected by local validation
    Rejected,
    /// Storage collaborator failed
    Failed,
}

impl Outcome {
    pub fn of<T>(result: &Result<T, WorkspaceError>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(WorkspaceError::Forbidden { .. }) => Self::Forbidden,
            Err(WorkspaceError::NotFound(_)) => Self::NotFound,
            Err(WorkspaceError::InvalidVisibility(_) | WorkspaceError::InvalidInput(_)) => {
                Self::Rejected
            }
            Err(WorkspaceError::StorageUnavailable(_)) => Self::Failed,
        }
    }
}

/// An entry in the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// Unique entry ID
    pub entry_id: String,
    pub operation: Operation,
    /// Caller, `None` when anonymous
    pub identity: Option<IdentityId>,
    pub document: Option<DocumentId>,
    pub entity: Option<EntityId>,
    pub outcome: Outcome,
    /// Error message when the call failed
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(operation: Operation, identity: Option<IdentityId>, outcome: Outcome) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            operation,
            identity,
            document: None,
            entity: None,
            outcome,
            detail: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_document(mut self, document: Option<DocumentId>) -> Self {
        self.document = document;
        self
    }

    pub fn with_entity(mut self, entity: Option<EntityId>) -> Self {
        self.entity = entity;
        self
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }
}

/// Audit log of workspace decisions.
pub struct AuditLog {
    /// Log entries (newest first)
    entries: Arc<RwLock<VecDeque<AuditEntry>>>,
    /// Maximum entries to retain
    max_entries: usize,
}

impl AuditLog {
    /// Create a new audit log.
    pub fn new() -> Self {
        Self::with_max_entries(MAX_AUDIT_ENTRIES)
    }

    /// Create with custom max entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    /// Append an entry, pruning the oldest past the limit.
    pub async fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        while entries.len() > self.max_entries {
            entries.pop_back();
        }
    }

    /// Get recent entries.
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Get entries concerning one document.
    pub async fn for_document(&self, document: DocumentId) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.document == Some(document))
            .cloned()
            .collect()
    }

    /// Get entries made by one identity.
    pub async fn for_identity(&self, identity: IdentityId, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.identity == Some(identity))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Get statistics.
    pub async fn stats(&self) -> AuditStats {
        let entries = self.entries.read().await;
        let count = |outcome: Outcome| entries.iter().filter(|e| e.outcome == outcome).count();

        AuditStats {
            total: entries.len(),
            succeeded: count(Outcome::Succeeded),
            forbidden: count(Outcome::Forbidden),
            not_found: count(Outcome::NotFound),
            rejected: count(Outcome::Rejected),
            failed: count(Outcome::Failed),
        }
    }

    /// Clear the log.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from the audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditStats {
    pub total: usize,
    pub succeeded: usize,
    pub forbidden: usize,
    pub not_found: usize,
    pub rejected: usize,
    pub failed: usize,
}
