//! Draft documents, comments, and the request/response shapes around them.

use chrono::{DateTime, Utc};
use draft_access::{
    AccessTarget, ActorKind, CommentId, DocumentId, EntityId, IdentityId, Permissions, Visibility,
};
use serde::{Deserialize, Serialize};

/// A representative's draft bill.
///
/// There is no status field: `visibility` is the publication state, and a
/// deleted draft is removed outright together with its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDocument {
    pub id: DocumentId,
    pub owner: EntityId,
    pub title: String,
    pub body: String,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub visibility: Visibility,
    /// Prompt that produced a generated draft, kept for provenance
    pub llm_prompt_used: Option<String>,
    /// Bill numbers the draft was modelled on
    pub based_on_bills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftDocument {
    /// What access decisions about this draft depend on.
    pub fn access_target(&self) -> AccessTarget {
        AccessTarget::new(self.owner, self.visibility)
    }
}

/// A comment on one draft document. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub document_id: DocumentId,
    pub author: IdentityId,
    pub text: String,
    /// Whether the author was acting as the owner's staff when writing it.
    /// Fixed at creation; later changes to delegation do not touch it.
    pub is_delegate_comment: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a draft.
///
/// `visibility` is the raw value from the caller and is validated before
/// anything is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDraft {
    pub owner: EntityId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub llm_prompt_used: Option<String>,
    #[serde(default)]
    pub based_on_bills: Vec<String>,
}

impl NewDraft {
    pub fn new(owner: EntityId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            owner,
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_llm_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.llm_prompt_used = Some(prompt.into());
        self
    }

    pub fn based_on(mut self, bills: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.based_on_bills = bills.into_iter().map(Into::into).collect();
        self
    }
}

/// Fields to change on an existing draft. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub visibility: Option<String>,
}

impl DraftUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.description.is_none()
            && self.topic.is_none()
            && self.visibility.is_none()
    }
}

/// A draft as seen by one caller, with what they may do to it.
#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub document: DraftDocument,
    /// Oldest first
    pub comments: Vec<Comment>,
    pub actor: ActorKind,
    pub permissions: Permissions,
}

/// Summary of one entity's drafting workspace.
#[derive(Debug, Clone, Serialize)]
pub struct DraftStatistics {
    pub entity: EntityId,
    pub total_drafts: usize,
    pub hidden_count: usize,
    pub constituents_count: usize,
    pub public_count: usize,
    pub total_comments: usize,
    /// Most recently updated first
    pub recent_drafts: Vec<DraftDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_from_form_json() {
        let json = r#"{
            "owner": 3,
            "title": "Rural Broadband Act",
            "body": "Be it enacted...",
            "visibility": "constituents",
            "based_on_bills": ["HB 101", "SB 7"]
        }"#;
        let draft: NewDraft = serde_json::from_str(json).unwrap();

        assert_eq!(draft.owner, EntityId(3));
        assert_eq!(draft.visibility.as_deref(), Some("constituents"));
        assert_eq!(draft.based_on_bills, vec!["HB 101", "SB 7"]);
        assert!(draft.topic.is_none());
    }

    #[test]
    fn test_update_builder() {
        assert!(DraftUpdate::default().is_empty());

        let update = DraftUpdate::default().title("New title").visibility("public");
        assert!(!update.is_empty());
        assert_eq!(update.title.as_deref(), Some("New title"));
        assert!(update.body.is_none());
    }

    #[test]
    fn test_access_target_follows_document() {
        let now = Utc::now();
        let doc = DraftDocument {
            id: DocumentId(1),
            owner: EntityId(9),
            title: "t".into(),
            body: "b".into(),
            description: None,
            topic: None,
            visibility: Visibility::Public,
            llm_prompt_used: None,
            based_on_bills: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(doc.access_target(), AccessTarget::new(EntityId(9), Visibility::Public));
    }
}
