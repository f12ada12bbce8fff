//! Draft Access - role-aware visibility for draft bills
//!
//! Decides who may view, edit, comment on and delete a representative's
//! draft bills. Everything in this crate is a pure function of its inputs:
//! callers load the owning entity and the caller's delegate linkage from
//! storage, then ask this crate for a decision.
//!
//! # Resolution pipeline
//!
//! ```text
//! SessionIdentity ──► resolve_actor ──► Actor ──┐
//!   (role, binding,      (owner, delegate,       │
//!    district,            constituent,           ▼
//!    selection)           public, override)   resolve ──► Permissions
//!                                                ▲
//! DraftDocument ──► AccessTarget ────────────────┘
//!                   (owner, visibility)
//! ```
//!
//! # Example
//!
//! ```
//! use draft_access::{
//!     resolve, resolve_actor, AccessTarget, ActorKind, DistrictTag, EntityId,
//!     OwningEntity, ResolutionContext, SessionIdentity, Visibility,
//! };
//!
//! let rep = OwningEntity::new(1, "Rep. Alvarez", DistrictTag::new("MO-05"));
//! let neighbour = SessionIdentity::member(42, DistrictTag::new("mo-05"));
//!
//! let actor = resolve_actor(Some(&neighbour), &ResolutionContext::new(&rep));
//! assert_eq!(actor.kind, ActorKind::Constituent);
//!
//! let draft = AccessTarget::new(EntityId(1), Visibility::Constituents);
//! let perms = resolve(&actor, &draft);
//! assert!(perms.can_view && perms.can_comment);
//! assert!(!perms.can_edit);
//! ```

pub mod actor;
pub mod error;
pub mod permissions;
pub mod selector;
pub mod types;
pub mod visibility;

pub use actor::{resolve_actor, Actor, ActorKind, ResolutionContext};
pub use error::{AccessError, Result};
pub use permissions::{resolve, AccessTarget, Permissions};
pub use selector::select_override_target;
pub use types::*;
pub use visibility::{at_least, Visibility};
