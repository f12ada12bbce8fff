//! In-memory draft store.
//!
//! Concurrent maps keyed by id, with monotonically increasing ids handed out
//! on insert. Entity registration and delegate linking stand in for the
//! administrative processes that own those records in a deployment.

use async_trait::async_trait;
use dashmap::DashMap;
use draft_access::{CommentId, DocumentId, EntityId, IdentityId, OwningEntity};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

use super::traits::*;
use crate::document::{Comment, DraftDocument};

/// Draft store backed by concurrent hash maps.
pub struct MemoryDraftStore {
    documents: DashMap<DocumentId, DraftDocument>,
    comments: DashMap<CommentId, Comment>,
    entities: DashMap<EntityId, OwningEntity>,
    /// Staff identity -> entity served. At most one per identity.
    delegate_links: DashMap<IdentityId, EntityId>,
    next_document_id: AtomicU64,
    next_comment_id: AtomicU64,
    available: AtomicBool,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            comments: DashMap::new(),
            entities: DashMap::new(),
            delegate_links: DashMap::new(),
            next_document_id: AtomicU64::new(1),
            next_comment_id: AtomicU64::new(1),
            available: AtomicBool::new(true),
        }
    }

    /// Register (or replace) an owning entity.
    pub fn register_entity(&self, entity: OwningEntity) {
        debug!(entity = %entity.id, district = %entity.district, "Registering owning entity");
        self.entities.insert(entity.id, entity);
    }

    /// Bind a staff identity to an entity, replacing any previous binding.
    pub fn link_delegate(&self, identity: IdentityId, entity: EntityId) {
        debug!(identity = %identity, entity = %entity, "Linking delegate");
        self.delegate_links.insert(identity, entity);
    }

    /// Remove a staff identity's binding. Returns the entity it served.
    pub fn revoke_delegate(&self, identity: IdentityId) -> Option<EntityId> {
        debug!(identity = %identity, "Revoking delegate");
        self.delegate_links.remove(&identity).map(|(_, entity)| entity)
    }

    /// Simulate an outage: while unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        }
    }
}

impl Default for MemoryDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load_document(&self, id: DocumentId) -> StoreResult<DraftDocument> {
        self.check_available()?;
        self.documents
            .get(&id)
            .map(|doc| doc.clone())
            .ok_or(StorageError::DocumentNotFound(id))
    }

    async fn save_document(&self, mut document: DraftDocument) -> StoreResult<DocumentId> {
        self.check_available()?;

        if !document.id.is_assigned() {
            let id = DocumentId(self.next_document_id.fetch_add(1, Ordering::SeqCst));
            document.id = id;
            self.documents.insert(id, document);
            return Ok(id);
        }

        let id = document.id;
        match self.documents.get_mut(&id) {
            Some(mut slot) => {
                *slot = document;
                Ok(id)
            }
            None => Err(StorageError::DocumentNotFound(id)),
        }
    }

    async fn delete_document(&self, id: DocumentId) -> StoreResult<()> {
        self.check_available()?;

        if self.documents.remove(&id).is_none() {
            return Err(StorageError::DocumentNotFound(id));
        }
        self.comments.retain(|_, comment| comment.document_id != id);
        Ok(())
    }

    async fn list_documents(&self, owner: Option<EntityId>) -> StoreResult<Vec<DraftDocument>> {
        self.check_available()?;

        let mut documents: Vec<DraftDocument> = self
            .documents
            .iter()
            .filter(|entry| owner.map_or(true, |owner| entry.owner == owner))
            .map(|entry| entry.value().clone())
            .collect();

        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(documents)
    }

    async fn load_delegate_linkage(&self, identity: IdentityId) -> StoreResult<Option<EntityId>> {
        self.check_available()?;
        Ok(self.delegate_links.get(&identity).map(|entity| *entity))
    }

    async fn save_comment(&self, mut comment: Comment) -> StoreResult<CommentId> {
        self.check_available()?;

        // Hold the parent while inserting so a concurrent delete cannot orphan it
        let _parent = self
            .documents
            .get(&comment.document_id)
            .ok_or(StorageError::DocumentNotFound(comment.document_id))?;

        let id = CommentId(self.next_comment_id.fetch_add(1, Ordering::SeqCst));
        comment.id = id;
        self.comments.insert(id, comment);
        Ok(id)
    }

    async fn list_comments(&self, document: DocumentId) -> StoreResult<Vec<Comment>> {
        self.check_available()?;

        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.document_id == document)
            .map(|entry| entry.value().clone())
            .collect();

        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        self.check_available()?;
        self.comments
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::CommentNotFound(id))
    }

    async fn load_entity(&self, id: EntityId) -> StoreResult<OwningEntity> {
        self.check_available()?;
        self.entities
            .get(&id)
            .map(|entity| entity.clone())
            .ok_or(StorageError::EntityNotFound(id))
    }

    async fn list_owning_entities(&self) -> StoreResult<Vec<OwningEntity>> {
        self.check_available()?;

        let mut entities: Vec<OwningEntity> =
            self.entities.iter().map(|entry| entry.value().clone()).collect();
        entities.sort_by_key(|entity| entity.id);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use draft_access::{DistrictTag, Visibility};

    fn draft(owner: u64, minutes_ago: i64) -> DraftDocument {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        DraftDocument {
            id: DocumentId::UNASSIGNED,
            owner: EntityId(owner),
            title: format!("Draft {minutes_ago}"),
            body: "Be it enacted".to_string(),
            description: None,
            topic: None,
            visibility: Visibility::Hidden,
            llm_prompt_used: None,
            based_on_bills: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    fn comment(document_id: DocumentId, text: &str) -> Comment {
        Comment {
            id: CommentId::UNASSIGNED,
            document_id,
            author: IdentityId(1),
            text: text.to_string(),
            is_delegate_comment: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = MemoryDraftStore::new();

        let first = store.save_document(draft(1, 0)).await.unwrap();
        let second = store.save_document(draft(1, 0)).await.unwrap();

        assert!(first.is_assigned());
        assert_ne!(first, second);
        assert_eq!(store.load_document(first).await.unwrap().id, first);
    }

    #[tokio::test]
    async fn test_update_existing_and_reject_deleted() {
        let store = MemoryDraftStore::new();
        let id = store.save_document(draft(1, 0)).await.unwrap();

        let mut doc = store.load_document(id).await.unwrap();
        doc.title = "Renamed".to_string();
        assert_eq!(store.save_document(doc.clone()).await.unwrap(), id);
        assert_eq!(store.load_document(id).await.unwrap().title, "Renamed");

        store.delete_document(id).await.unwrap();
        assert_eq!(
            store.save_document(doc).await,
            Err(StorageError::DocumentNotFound(id))
        );
    }

    #[tokio::test]
    async fn test_list_documents_newest_first_and_filtered() {
        let store = MemoryDraftStore::new();
        let old = store.save_document(draft(1, 30)).await.unwrap();
        let new = store.save_document(draft(1, 1)).await.unwrap();
        let other = store.save_document(draft(2, 10)).await.unwrap();

        let mine: Vec<_> = store
            .list_documents(Some(EntityId(1)))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(mine, vec![new, old]);

        let all: Vec<_> = store
            .list_documents(None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(all, vec![new, other, old]);
    }

    #[tokio::test]
    async fn test_delete_cascades_comments() {
        let store = MemoryDraftStore::new();
        let keep = store.save_document(draft(1, 0)).await.unwrap();
        let doomed = store.save_document(draft(1, 0)).await.unwrap();

        store.save_comment(comment(keep, "stays")).await.unwrap();
        store.save_comment(comment(doomed, "goes")).await.unwrap();
        store.save_comment(comment(doomed, "goes too")).await.unwrap();
        assert_eq!(store.comment_count(), 3);

        store.delete_document(doomed).await.unwrap();

        assert_eq!(store.comment_count(), 1);
        assert!(store.list_comments(doomed).await.unwrap().is_empty());
        assert_eq!(
            store.delete_document(doomed).await,
            Err(StorageError::DocumentNotFound(doomed))
        );
    }

    #[tokio::test]
    async fn test_comment_requires_document() {
        let store = MemoryDraftStore::new();
        let missing = DocumentId(42);

        assert_eq!(
            store.save_comment(comment(missing, "orphan")).await,
            Err(StorageError::DocumentNotFound(missing))
        );
    }

    #[tokio::test]
    async fn test_comments_oldest_first() {
        let store = MemoryDraftStore::new();
        let doc = store.save_document(draft(1, 0)).await.unwrap();

        let first = store.save_comment(comment(doc, "first")).await.unwrap();
        let second = store.save_comment(comment(doc, "second")).await.unwrap();

        let ids: Vec<_> = store
            .list_comments(doc)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_delegate_links() {
        let store = MemoryDraftStore::new();
        let staffer = IdentityId(5);

        assert_eq!(store.load_delegate_linkage(staffer).await.unwrap(), None);

        store.link_delegate(staffer, EntityId(1));
        store.link_delegate(staffer, EntityId(2));
        assert_eq!(store.load_delegate_linkage(staffer).await.unwrap(), Some(EntityId(2)));

        assert_eq!(store.revoke_delegate(staffer), Some(EntityId(2)));
        assert_eq!(store.load_delegate_linkage(staffer).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entities_sorted_by_id() {
        let store = MemoryDraftStore::new();
        store.register_entity(OwningEntity::new(7, "B", DistrictTag::new("d7")));
        store.register_entity(OwningEntity::new(2, "A", DistrictTag::new("d2")));

        let ids: Vec<_> = store
            .list_owning_entities()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![EntityId(2), EntityId(7)]);

        assert_eq!(
            store.load_entity(EntityId(3)).await,
            Err(StorageError::EntityNotFound(EntityId(3)))
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryDraftStore::new();
        store.set_available(false);

        assert!(matches!(
            store.load_document(DocumentId(1)).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            store.list_owning_entities().await,
            Err(StorageError::Unavailable(_))
        ));

        store.set_available(true);
        assert!(store.list_documents(None).await.unwrap().is_empty());
    }
}
