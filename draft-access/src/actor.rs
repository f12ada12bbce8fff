//! Actor resolution.
//!
//! Turns the caller's session identity into exactly one [`ActorKind`] with
//! respect to one owning entity. Rules are applied in priority order and the
//! first match wins:
//!
//! 1. privileged override role → `Override`
//! 2. owner-capable role bound to the entity → `Owner`
//! 3. active delegate linkage to the entity → `Delegate`
//! 4. non-blank district tag equal to the entity's district → `Constituent`
//! 5. anything else, including anonymous callers → `Public`
//!
//! The actor is computed fresh for every request and must not be cached:
//! a revoked linkage or a changed district takes effect on the next call.

use crate::selector::select_override_target;
use crate::types::{DistrictTag, EntityId, OwningEntity, SessionIdentity};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How the caller relates to the owning entity a request concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// The representative who owns the documents
    Owner,
    /// Staff acting on the owner's behalf
    Delegate,
    /// Resident of the owner's district
    Constituent,
    /// Anyone else, including anonymous visitors
    Public,
    /// Administrator acting as some owning entity
    Override,
}

impl ActorKind {
    pub const ALL: [ActorKind; 5] = [
        Self::Owner,
        Self::Delegate,
        Self::Constituent,
        Self::Public,
        Self::Override,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Delegate => "delegate",
            Self::Constituent => "constituent",
            Self::Public => "public",
            Self::Override => "override",
        }
    }

    /// Owner, delegate or override: the team that bypasses the visibility gate.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Owner | Self::Delegate | Self::Override)
    }
}

impl std::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved caller, valid for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub kind: ActorKind,
    /// Entity this actor is scoped to: the owner itself, the entity a
    /// delegate serves, or the entity an override caller selected.
    pub delegation_target: Option<EntityId>,
    pub district: Option<DistrictTag>,
    /// Entity the resolution was performed against.
    pub resolved_for: EntityId,
}

impl Actor {
    /// Anonymous visitor looking at `entity`.
    pub fn anonymous(entity: EntityId) -> Self {
        Self {
            kind: ActorKind::Public,
            delegation_target: None,
            district: None,
            resolved_for: entity,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind.is_internal()
    }
}

/// Everything resolution needs beyond the identity itself.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Entity the operation concerns
    pub entity: &'a OwningEntity,
    /// Target of the caller's active delegate linkage, as read from storage
    pub delegate_link: Option<EntityId>,
    /// Every known entity id, for the override default
    pub known_entities: &'a [EntityId],
}

impl<'a> ResolutionContext<'a> {
    pub fn new(entity: &'a OwningEntity) -> Self {
        Self {
            entity,
            delegate_link: None,
            known_entities: &[],
        }
    }

    pub fn with_delegate_link(mut self, link: Option<EntityId>) -> Self {
        self.delegate_link = link;
        self
    }

    pub fn with_known_entities(mut self, known: &'a [EntityId]) -> Self {
        self.known_entities = known;
        self
    }
}

/// Resolve the caller against the entity in `ctx`.
pub fn resolve_actor(identity: Option<&SessionIdentity>, ctx: &ResolutionContext<'_>) -> Actor {
    let entity = ctx.entity;

    let Some(identity) = identity else {
        return Actor::anonymous(entity.id);
    };

    let district = identity.district.clone().filter(|tag| !tag.is_blank());

    let (kind, delegation_target) = if identity.role.is_override() {
        (
            ActorKind::Override,
            select_override_target(identity.override_selection, ctx.known_entities),
        )
    } else if identity.role.is_owner_capable() && identity.bound_entity == Some(entity.id) {
        (ActorKind::Owner, Some(entity.id))
    } else if ctx.delegate_link == Some(entity.id) {
        (ActorKind::Delegate, Some(entity.id))
    } else if district.as_ref() == Some(&entity.district) {
        (ActorKind::Constituent, None)
    } else {
        (ActorKind::Public, None)
    };

    trace!(
        identity = %identity.identity_id,
        role = %identity.role,
        entity = %entity.id,
        kind = %kind,
        "Resolved actor"
    );

    Actor {
        kind,
        delegation_target,
        district,
        resolved_for: entity.id,
    }
}
