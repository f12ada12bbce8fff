//! DraftWorkspace - lifecycle of draft bills.
//!
//! Every operation resolves the caller afresh against the document it
//! concerns, asks [`draft_access::resolve`] for a decision, and only then
//! talks to the storage collaborator. Validation of caller-supplied values
//! happens before any storage call, so a rejected request writes nothing.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use draft_access::{
    resolve, resolve_actor, select_override_target, AccessTarget, Actor, ActorKind, CommentId,
    DocumentId, EntityId, IdentityId, OwningEntity, Permissions, ResolutionContext,
    SessionIdentity, Visibility,
};

use crate::audit::{AuditEntry, AuditLog, Operation, Outcome};
use crate::config::{LimitsConfig, WorkspaceConfig};
use crate::document::{
    Comment, DraftDocument, DraftStatistics, DraftUpdate, DraftView, NewDraft,
};
use crate::error::{Result, WorkspaceError};
use crate::store::{DraftStore, StorageError};

/// The caller as seen during one request.
///
/// Holds the reads resolution depends on (delegate linkage, entity list) so
/// they happen at most once per request. Never outlives the request.
struct Caller<'a> {
    identity: Option<&'a SessionIdentity>,
    delegate_link: Option<EntityId>,
    known_entities: Vec<EntityId>,
}

impl Caller<'_> {
    fn actor(&self, entity: &OwningEntity) -> Actor {
        let ctx = ResolutionContext::new(entity)
            .with_delegate_link(self.delegate_link)
            .with_known_entities(&self.known_entities);
        resolve_actor(self.identity, &ctx)
    }

    fn is_override(&self) -> bool {
        self.identity.is_some_and(|identity| identity.role.is_override())
    }

    fn override_target(&self) -> Option<EntityId> {
        let explicit = self.identity.and_then(|identity| identity.override_selection);
        select_override_target(explicit, &self.known_entities)
    }
}

/// Entry point for everything the presentation layer does with drafts.
pub struct DraftWorkspace {
    store: Arc<dyn DraftStore>,
    config: WorkspaceConfig,
    audit: Arc<AuditLog>,
}

impl DraftWorkspace {
    /// Create a workspace over the given store with default configuration.
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        Self {
            store,
            config: WorkspaceConfig::default(),
            audit: Arc::new(AuditLog::new()),
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: WorkspaceConfig) -> Self {
        self.audit = Arc::new(AuditLog::with_max_entries(config.audit.max_entries));
        self.config = config;
        self
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Decision audit trail.
    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    pub fn store(&self) -> &Arc<dyn DraftStore> {
        &self.store
    }

    /// Create a draft for `draft.owner`.
    ///
    /// Only the owner or an override caller may create. Returns the new id.
    pub async fn create(
        &self,
        identity: Option<&SessionIdentity>,
        draft: NewDraft,
    ) -> Result<DocumentId> {
        let owner = draft.owner;
        let result = self.create_inner(identity, draft).await;
        let document = result.as_ref().ok().copied();
        self.record(Operation::Create, identity, document, Some(owner), &result)
            .await;
        result
    }

    /// Change title, body, description, topic or visibility of a draft.
    pub async fn update(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        update: DraftUpdate,
    ) -> Result<DraftDocument> {
        let result = self.update_inner(identity, id, update).await;
        self.record(Operation::Update, identity, Some(id), None, &result)
            .await;
        result
    }

    /// Set a draft's visibility. Any level may follow any other.
    pub async fn change_visibility(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        visibility: &str,
    ) -> Result<DraftDocument> {
        let result = self.change_visibility_inner(identity, id, visibility).await;
        self.record(Operation::ChangeVisibility, identity, Some(id), None, &result)
            .await;
        result
    }

    /// Delete a draft and its comments.
    pub async fn delete(&self, identity: Option<&SessionIdentity>, id: DocumentId) -> Result<()> {
        let result = self.delete_inner(identity, id).await;
        self.record(Operation::Delete, identity, Some(id), None, &result)
            .await;
        result
    }

    /// Comment on a draft. Anonymous callers cannot comment.
    pub async fn add_comment(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        text: &str,
    ) -> Result<Comment> {
        let result = self.add_comment_inner(identity, id, text).await;
        self.record(Operation::AddComment, identity, Some(id), None, &result)
            .await;
        result
    }

    /// Remove one comment from a draft.
    pub async fn delete_comment(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        comment: CommentId,
    ) -> Result<()> {
        let result = self.delete_comment_inner(identity, id, comment).await;
        self.record(Operation::DeleteComment, identity, Some(id), None, &result)
            .await;
        result
    }

    /// Drafts the caller may view, newest first.
    ///
    /// Without a filter an override caller sees the drafts of the entity
    /// they selected (or the default entity); everyone else sees every
    /// owner's drafts that are visible to them.
    pub async fn list_visible(
        &self,
        identity: Option<&SessionIdentity>,
        owner: Option<EntityId>,
    ) -> Result<Vec<DraftDocument>> {
        let result = self.list_visible_inner(identity, owner).await;
        self.record(Operation::ListVisible, identity, None, owner, &result)
            .await;
        result
    }

    /// All comments on a draft, oldest first. Requires view access.
    pub async fn get_comments(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
    ) -> Result<Vec<Comment>> {
        let result = self.get_comments_inner(identity, id).await;
        self.record(Operation::GetComments, identity, Some(id), None, &result)
            .await;
        result
    }

    /// A draft with its comments and the caller's permissions on it.
    pub async fn view(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
    ) -> Result<DraftView> {
        let result = self.view_inner(identity, id).await;
        self.record(Operation::View, identity, Some(id), None, &result)
            .await;
        result
    }

    /// Entity whose workspace the caller works in.
    pub async fn workspace_entity(&self, identity: Option<&SessionIdentity>) -> Result<EntityId> {
        let result = match self.caller(identity).await {
            Ok(caller) => Self::workspace_entity_of(&caller),
            Err(err) => Err(err),
        };
        let entity = result.as_ref().ok().copied();
        self.record(Operation::OpenWorkspace, identity, None, entity, &result)
            .await;
        result
    }

    /// Drafting workspace summary for an entity's internal team.
    pub async fn statistics(
        &self,
        identity: Option<&SessionIdentity>,
        owner: Option<EntityId>,
    ) -> Result<DraftStatistics> {
        let result = self.statistics_inner(identity, owner).await;
        let entity = result.as_ref().map(|stats| stats.entity).ok().or(owner);
        self.record(Operation::Statistics, identity, None, entity, &result)
            .await;
        result
    }

    async fn create_inner(
        &self,
        identity: Option<&SessionIdentity>,
        draft: NewDraft,
    ) -> Result<DocumentId> {
        let visibility = match draft.visibility.as_deref() {
            Some(raw) => Visibility::parse(raw)?,
            None => self.config.default_visibility,
        };
        let limits = &self.config.limits;
        let title = required_text("title", &draft.title, Some(limits.max_title_len))?;
        let body = required_text("body", &draft.body, None)?;
        let topic = optional_text("topic", draft.topic, Some(limits.max_topic_len))?;
        let description = optional_text("description", draft.description, None)?;

        let caller = self.caller(identity).await?;
        let (actor, _) = self
            .authorize(&caller, &AccessTarget::unsaved(draft.owner))
            .await?;
        if !matches!(actor.kind, ActorKind::Owner | ActorKind::Override) {
            return Err(deny(Operation::Create, &actor, None));
        }

        let now = Utc::now();
        let document = DraftDocument {
            id: DocumentId::UNASSIGNED,
            owner: draft.owner,
            title,
            body,
            description,
            topic,
            visibility,
            llm_prompt_used: draft.llm_prompt_used,
            based_on_bills: draft.based_on_bills,
            created_at: now,
            updated_at: now,
        };
        let id = self.store.save_document(document).await?;

        info!(
            document_id = %id,
            owner = %draft.owner,
            visibility = %visibility,
            actor = %actor.kind,
            "Created draft"
        );
        Ok(id)
    }

    async fn update_inner(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        update: DraftUpdate,
    ) -> Result<DraftDocument> {
        let changes = ValidatedUpdate::new(update, &self.config.limits)?;

        let caller = self.caller(identity).await?;
        let mut document = self.store.load_document(id).await?;
        let (actor, perms) = self.authorize(&caller, &document.access_target()).await?;
        if !perms.can_edit {
            return Err(deny(Operation::Update, &actor, Some(id)));
        }

        changes.apply(&mut document);
        document.updated_at = Utc::now();
        self.store.save_document(document.clone()).await?;

        info!(document_id = %id, actor = %actor.kind, "Updated draft");
        Ok(document)
    }

    async fn change_visibility_inner(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        visibility: &str,
    ) -> Result<DraftDocument> {
        let visibility = Visibility::parse(visibility)?;

        let caller = self.caller(identity).await?;
        let mut document = self.store.load_document(id).await?;
        let (actor, perms) = self.authorize(&caller, &document.access_target()).await?;
        if !perms.can_edit {
            return Err(deny(Operation::ChangeVisibility, &actor, Some(id)));
        }

        if document.visibility == visibility {
            debug!(document_id = %id, visibility = %visibility, "Visibility unchanged");
            return Ok(document);
        }

        let previous = document.visibility;
        document.visibility = visibility;
        document.updated_at = Utc::now();
        self.store.save_document(document.clone()).await?;

        info!(
            document_id = %id,
            from = %previous,
            to = %visibility,
            actor = %actor.kind,
            "Changed draft visibility"
        );
        Ok(document)
    }

    async fn delete_inner(&self, identity: Option<&SessionIdentity>, id: DocumentId) -> Result<()> {
        let caller = self.caller(identity).await?;
        let document = self.store.load_document(id).await?;
        let (actor, perms) = self.authorize(&caller, &document.access_target()).await?;
        if !perms.can_delete {
            return Err(deny(Operation::Delete, &actor, Some(id)));
        }

        self.store.delete_document(id).await?;

        info!(document_id = %id, actor = %actor.kind, "Deleted draft");
        Ok(())
    }

    async fn add_comment_inner(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        text: &str,
    ) -> Result<Comment> {
        let text = required_text("comment", text, Some(self.config.limits.max_comment_len))?;
        let Some(author) = identity else {
            debug!(document_id = %id, "Anonymous caller cannot comment");
            return Err(WorkspaceError::forbidden(Operation::AddComment, ActorKind::Public));
        };

        let caller = self.caller(identity).await?;
        let document = self.store.load_document(id).await?;
        let (actor, perms) = self.authorize(&caller, &document.access_target()).await?;
        if !perms.can_comment {
            return Err(deny(Operation::AddComment, &actor, Some(id)));
        }

        let mut comment = Comment {
            id: CommentId::UNASSIGNED,
            document_id: id,
            author: author.identity_id,
            text,
            is_delegate_comment: actor.kind == ActorKind::Delegate,
            created_at: Utc::now(),
        };
        comment.id = self.store.save_comment(comment.clone()).await?;

        info!(
            document_id = %id,
            comment_id = %comment.id,
            actor = %actor.kind,
            delegate = comment.is_delegate_comment,
            "Added comment"
        );
        Ok(comment)
    }

    async fn delete_comment_inner(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
        comment: CommentId,
    ) -> Result<()> {
        let caller = self.caller(identity).await?;
        let document = self.store.load_document(id).await?;
        let (actor, perms) = self.authorize(&caller, &document.access_target()).await?;
        if !perms.can_delete {
            return Err(deny(Operation::DeleteComment, &actor, Some(id)));
        }

        let belongs = self
            .store
            .list_comments(id)
            .await?
            .iter()
            .any(|c| c.id == comment);
        if !belongs {
            return Err(WorkspaceError::NotFound(format!(
                "comment {comment} on document {id}"
            )));
        }

        self.store.delete_comment(comment).await?;

        info!(document_id = %id, comment_id = %comment, actor = %actor.kind, "Deleted comment");
        Ok(())
    }

    async fn list_visible_inner(
        &self,
        identity: Option<&SessionIdentity>,
        owner: Option<EntityId>,
    ) -> Result<Vec<DraftDocument>> {
        let caller = self.caller(identity).await?;

        let filter = match owner {
            Some(owner) => Some(owner),
            None if caller.is_override() => match caller.override_target() {
                Some(target) => Some(target),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        // Actors per owner, for this request only
        let mut actors: HashMap<EntityId, Option<Actor>> = HashMap::new();
        if let Some(owner) = filter {
            let entity = self.store.load_entity(owner).await?;
            actors.insert(owner, Some(caller.actor(&entity)));
        }

        let documents = self.store.list_documents(filter).await?;
        let total = documents.len();
        let mut visible = Vec::with_capacity(total);

        for document in documents {
            if !actors.contains_key(&document.owner) {
                let actor = match self.store.load_entity(document.owner).await {
                    Ok(entity) => Some(caller.actor(&entity)),
                    Err(StorageError::EntityNotFound(owner)) => {
                        warn!(document_id = %document.id, owner = %owner, "Draft has no owning entity, skipping");
                        None
                    }
                    Err(err) => return Err(err.into()),
                };
                actors.insert(document.owner, actor);
            }

            let can_view = actors
                .get(&document.owner)
                .and_then(Option::as_ref)
                .is_some_and(|actor| resolve(actor, &document.access_target()).can_view);
            if can_view {
                visible.push(document);
            }
        }

        sort_newest_first(&mut visible);

        debug!(
            owner = ?filter,
            total,
            visible = visible.len(),
            "Listed visible drafts"
        );
        Ok(visible)
    }

    async fn get_comments_inner(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
    ) -> Result<Vec<Comment>> {
        let caller = self.caller(identity).await?;
        let document = self.store.load_document(id).await?;
        let (actor, perms) = self.authorize(&caller, &document.access_target()).await?;
        if !perms.can_view {
            return Err(deny(Operation::GetComments, &actor, Some(id)));
        }

        Ok(self.store.list_comments(id).await?)
    }

    async fn view_inner(
        &self,
        identity: Option<&SessionIdentity>,
        id: DocumentId,
    ) -> Result<DraftView> {
        let caller = self.caller(identity).await?;
        let document = self.store.load_document(id).await?;
        let (actor, permissions) = self.authorize(&caller, &document.access_target()).await?;
        if !permissions.can_view {
            return Err(deny(Operation::View, &actor, Some(id)));
        }

        let comments = self.store.list_comments(id).await?;
        Ok(DraftView {
            document,
            comments,
            actor: actor.kind,
            permissions,
        })
    }

    async fn statistics_inner(
        &self,
        identity: Option<&SessionIdentity>,
        owner: Option<EntityId>,
    ) -> Result<DraftStatistics> {
        let caller = self.caller(identity).await?;
        let entity_id = match owner {
            Some(owner) => owner,
            None => Self::workspace_entity_of(&caller)?,
        };

        let entity = self.store.load_entity(entity_id).await?;
        let actor = caller.actor(&entity);
        if !actor.is_internal() {
            return Err(deny(Operation::Statistics, &actor, None));
        }

        let documents = self.store.list_documents(Some(entity_id)).await?;
        let count = |visibility: Visibility| {
            documents
                .iter()
                .filter(|d| d.visibility == visibility)
                .count()
        };

        let mut total_comments = 0;
        for document in &documents {
            total_comments += self.store.list_comments(document.id).await?.len();
        }

        let mut recent = documents.clone();
        recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        recent.truncate(self.config.limits.recent_drafts);

        Ok(DraftStatistics {
            entity: entity_id,
            total_drafts: documents.len(),
            hidden_count: count(Visibility::Hidden),
            constituents_count: count(Visibility::Constituents),
            public_count: count(Visibility::Public),
            total_comments,
            recent_drafts: recent,
        })
    }

    fn workspace_entity_of(caller: &Caller<'_>) -> Result<EntityId> {
        let Some(identity) = caller.identity else {
            return Err(WorkspaceError::forbidden(Operation::OpenWorkspace, ActorKind::Public));
        };

        if identity.role.is_override() {
            return caller
                .override_target()
                .ok_or_else(|| WorkspaceError::NotFound("any owning entity".to_string()));
        }
        if identity.role.is_owner_capable() {
            if let Some(entity) = identity.bound_entity {
                return Ok(entity);
            }
        }
        if let Some(entity) = caller.delegate_link {
            return Ok(entity);
        }

        debug!(identity = %identity.identity_id, role = %identity.role, "No workspace for caller");
        Err(WorkspaceError::forbidden(Operation::OpenWorkspace, ActorKind::Public))
    }

    /// Read what resolution needs for this caller: the entity list for an
    /// override caller, the delegate linkage for anyone else signed in.
    async fn caller<'a>(&self, identity: Option<&'a SessionIdentity>) -> Result<Caller<'a>> {
        let mut caller = Caller {
            identity,
            delegate_link: None,
            known_entities: Vec::new(),
        };

        match identity {
            None => {}
            Some(id) if id.role.is_override() => {
                caller.known_entities = self
                    .store
                    .list_owning_entities()
                    .await?
                    .into_iter()
                    .map(|entity| entity.id)
                    .collect();
            }
            Some(id) => {
                caller.delegate_link = self.store.load_delegate_linkage(id.identity_id).await?;
            }
        }

        Ok(caller)
    }

    async fn authorize(
        &self,
        caller: &Caller<'_>,
        target: &AccessTarget,
    ) -> Result<(Actor, Permissions)> {
        let entity = self.store.load_entity(target.owner).await?;
        let actor = caller.actor(&entity);
        let permissions = resolve(&actor, target);
        Ok((actor, permissions))
    }

    async fn record<T>(
        &self,
        operation: Operation,
        identity: Option<&SessionIdentity>,
        document: Option<DocumentId>,
        entity: Option<EntityId>,
        result: &Result<T>,
    ) {
        let outcome = Outcome::of(result);
        if let Err(WorkspaceError::StorageUnavailable(reason)) = result {
            warn!(operation = %operation, reason = %reason, "Storage unavailable");
        }

        if !self.config.audit.enabled {
            return;
        }

        let identity: Option<IdentityId> = identity.map(|id| id.identity_id);
        let entry = AuditEntry::new(operation, identity, outcome)
            .with_document(document)
            .with_entity(entity)
            .with_detail(result.as_ref().err().map(ToString::to_string));
        self.audit.record(entry).await;
    }
}

fn deny(operation: Operation, actor: &Actor, document: Option<DocumentId>) -> WorkspaceError {
    warn!(
        operation = %operation,
        actor = %actor.kind,
        entity = %actor.resolved_for,
        document = ?document,
        "Denied"
    );
    WorkspaceError::forbidden(operation, actor.kind)
}

fn sort_newest_first(documents: &mut [DraftDocument]) {
    documents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn check_len(field: &str, value: &str, max: Option<usize>) -> Result<()> {
    match max {
        Some(max) if value.chars().count() > max => Err(WorkspaceError::InvalidInput(format!(
            "{field} exceeds {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Trimmed, non-empty, within `max`.
fn required_text(field: &str, value: &str, max: Option<usize>) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkspaceError::InvalidInput(format!("{field} is required")));
    }
    check_len(field, value, max)?;
    Ok(value.to_string())
}

/// Trimmed; blank becomes `None`.
fn optional_text(field: &str, value: Option<String>, max: Option<usize>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    check_len(field, value, max)?;
    Ok(Some(value.to_string()))
}

/// A [`DraftUpdate`] that passed validation.
struct ValidatedUpdate {
    title: Option<String>,
    body: Option<String>,
    /// `Some(None)` clears the field
    description: Option<Option<String>>,
    topic: Option<Option<String>>,
    visibility: Option<Visibility>,
}

impl ValidatedUpdate {
    fn new(update: DraftUpdate, limits: &LimitsConfig) -> Result<Self> {
        let visibility = update
            .visibility
            .as_deref()
            .map(Visibility::parse)
            .transpose()?;
        let title = update
            .title
            .map(|title| required_text("title", &title, Some(limits.max_title_len)))
            .transpose()?;
        let body = update
            .body
            .map(|body| required_text("body", &body, None))
            .transpose()?;
        let description = update
            .description
            .map(|description| optional_text("description", Some(description), None))
            .transpose()?;
        let topic = update
            .topic
            .map(|topic| optional_text("topic", Some(topic), Some(limits.max_topic_len)))
            .transpose()?;

        Ok(Self {
            title,
            body,
            description,
            topic,
            visibility,
        })
    }

    fn apply(self, document: &mut DraftDocument) {
        if let Some(title) = self.title {
            document.title = title;
        }
        if let Some(body) = self.body {
            document.body = body;
        }
        if let Some(description) = self.description {
            document.description = description;
        }
        if let Some(topic) = self.topic {
            document.topic = topic;
        }
        if let Some(visibility) = self.visibility {
            document.visibility = visibility;
        }
    }
}
