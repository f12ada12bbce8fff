//! Permission resolution for draft documents.
//!
//! Pure function of the resolved actor and the document's owner and
//! visibility. No I/O, no shared state, safe to call from any number of
//! tasks at once.
//!
//! | actor        | visibility              | view | edit | comment | delete |
//! |--------------|-------------------------|------|------|---------|--------|
//! | owner        | any                     | yes  | yes  | yes     | yes    |
//! | override     | any                     | yes  | yes  | yes     | yes    |
//! | delegate     | any                     | yes  | yes  | yes     | no     |
//! | constituent  | hidden                  | no   | no   | no      | no     |
//! | constituent  | constituents, public    | yes  | no   | yes     | no     |
//! | public       | hidden, constituents    | no   | no   | no      | no     |
//! | public       | public                  | yes  | no   | yes     | no     |

use crate::actor::{Actor, ActorKind};
use crate::types::EntityId;
use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};

/// Capabilities an actor holds on one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_comment: bool,
    pub can_delete: bool,
}

impl Permissions {
    /// Nothing allowed.
    pub const NONE: Permissions = Permissions {
        can_view: false,
        can_edit: false,
        can_comment: false,
        can_delete: false,
    };

    /// Everything allowed.
    pub const FULL: Permissions = Permissions {
        can_view: true,
        can_edit: true,
        can_comment: true,
        can_delete: true,
    };

    /// View and comment, nothing else.
    pub const READ_COMMENT: Permissions = Permissions {
        can_view: true,
        can_edit: false,
        can_comment: true,
        can_delete: false,
    };

    /// Everything except delete.
    pub const ASSIST: Permissions = Permissions {
        can_view: true,
        can_edit: true,
        can_comment: true,
        can_delete: false,
    };
}

/// The parts of a document that access decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessTarget {
    pub owner: EntityId,
    pub visibility: Visibility,
}

impl AccessTarget {
    pub fn new(owner: EntityId, visibility: Visibility) -> Self {
        Self { owner, visibility }
    }

    /// Stand-in for a document that does not exist yet.
    pub fn unsaved(owner: EntityId) -> Self {
        Self::new(owner, Visibility::Hidden)
    }
}

/// Resolve the permissions `actor` holds on `target`.
///
/// An actor resolved against a different entity than the target's owner is
/// judged by the public row: ownership, delegation and district membership
/// are all relative to one entity. Override actors are not entity-scoped.
pub fn resolve(actor: &Actor, target: &AccessTarget) -> Permissions {
    let kind = if actor.kind == ActorKind::Override || actor.resolved_for == target.owner {
        actor.kind
    } else {
        ActorKind::Public
    };

    match kind {
        ActorKind::Owner | ActorKind::Override => Permissions::FULL,
        ActorKind::Delegate => Permissions::ASSIST,
        ActorKind::Constituent => {
            if target.visibility.at_least(Visibility::Constituents) {
                Permissions::READ_COMMENT
            } else {
                Permissions::NONE
            }
        }
        ActorKind::Public => {
            if target.visibility.at_least(Visibility::Public) {
                Permissions::READ_COMMENT
            } else {
                Permissions::NONE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ENTITY: EntityId = EntityId(10);

    fn actor(kind: ActorKind) -> Actor {
        Actor {
            kind,
            delegation_target: kind.is_internal().then_some(ENTITY),
            district: None,
            resolved_for: ENTITY,
        }
    }

    fn perms(view: bool, edit: bool, comment: bool, delete: bool) -> Permissions {
        Permissions {
            can_view: view,
            can_edit: edit,
            can_comment: comment,
            can_delete: delete,
        }
    }

    fn visibility() -> impl Strategy<Value = Visibility> {
        prop::sample::select(Visibility::ALL.to_vec())
    }

    fn actor_kind() -> impl Strategy<Value = ActorKind> {
        prop::sample::select(ActorKind::ALL.to_vec())
    }

    #[test]
    fn test_decision_table_is_exhaustive() {
        use ActorKind::{Constituent, Delegate, Override, Owner};
        use Visibility::{Constituents, Hidden};

        let table = [
            (Owner, Hidden, perms(true, true, true, true)),
            (Owner, Constituents, perms(true, true, true, true)),
            (Owner, Visibility::Public, perms(true, true, true, true)),
            (Override, Hidden, perms(true, true, true, true)),
            (Override, Constituents, perms(true, true, true, true)),
            (Override, Visibility::Public, perms(true, true, true, true)),
            (Delegate, Hidden, perms(true, true, true, false)),
            (Delegate, Constituents, perms(true, true, true, false)),
            (Delegate, Visibility::Public, perms(true, true, true, false)),
            (Constituent, Hidden, perms(false, false, false, false)),
            (Constituent, Constituents, perms(true, false, true, false)),
            (Constituent, Visibility::Public, perms(true, false, true, false)),
            (ActorKind::Public, Hidden, perms(false, false, false, false)),
            (ActorKind::Public, Constituents, perms(false, false, false, false)),
            (ActorKind::Public, Visibility::Public, perms(true, false, true, false)),
        ];

        assert_eq!(table.len(), ActorKind::ALL.len() * Visibility::ALL.len());

        for (kind, vis, expected) in table {
            let got = resolve(&actor(kind), &AccessTarget::new(ENTITY, vis));
            assert_eq!(got, expected, "{kind} on {vis}");
        }
    }

    #[test]
    fn test_unsaved_target_is_hidden() {
        let target = AccessTarget::unsaved(ENTITY);
        assert_eq!(target.visibility, Visibility::Hidden);
        assert_eq!(resolve(&actor(ActorKind::Owner), &target), Permissions::FULL);
        assert_eq!(resolve(&actor(ActorKind::Public), &target), Permissions::NONE);
    }

    #[test]
    fn test_scope_mismatch_falls_back_to_public() {
        let other = AccessTarget::new(EntityId(11), Visibility::Constituents);

        assert_eq!(resolve(&actor(ActorKind::Owner), &other), Permissions::NONE);
        assert_eq!(resolve(&actor(ActorKind::Delegate), &other), Permissions::NONE);
        assert_eq!(resolve(&actor(ActorKind::Constituent), &other), Permissions::NONE);

        let public = AccessTarget::new(EntityId(11), Visibility::Public);
        assert_eq!(resolve(&actor(ActorKind::Owner), &public), Permissions::READ_COMMENT);

        // Override is not scoped to an entity
        assert_eq!(resolve(&actor(ActorKind::Override), &other), Permissions::FULL);
    }

    proptest! {
        #[test]
        fn owner_and_override_hold_everything(vis in visibility()) {
            let target = AccessTarget::new(ENTITY, vis);
            prop_assert_eq!(resolve(&actor(ActorKind::Owner), &target), Permissions::FULL);
            prop_assert_eq!(resolve(&actor(ActorKind::Override), &target), Permissions::FULL);
        }

        #[test]
        fn delegate_never_deletes(vis in visibility()) {
            let got = resolve(&actor(ActorKind::Delegate), &AccessTarget::new(ENTITY, vis));
            prop_assert!(!got.can_delete);
            prop_assert!(got.can_view && got.can_comment);
        }

        #[test]
        fn outsiders_never_edit_or_delete(
            kind in prop::sample::select(vec![ActorKind::Constituent, ActorKind::Public]),
            vis in visibility(),
        ) {
            let got = resolve(&actor(kind), &AccessTarget::new(ENTITY, vis));
            prop_assert!(!got.can_edit);
            prop_assert!(!got.can_delete);
        }

        #[test]
        fn outsider_view_is_monotone(
            kind in prop::sample::select(vec![ActorKind::Constituent, ActorKind::Public]),
            v1 in visibility(),
            v2 in visibility(),
        ) {
            let a = actor(kind);
            let low = resolve(&a, &AccessTarget::new(ENTITY, v1));
            let high = resolve(&a, &AccessTarget::new(ENTITY, v2));
            if v2.at_least(v1) && low.can_view {
                prop_assert!(high.can_view);
            }
        }

        #[test]
        fn outsiders_never_see_hidden(
            kind in prop::sample::select(vec![ActorKind::Constituent, ActorKind::Public]),
        ) {
            let got = resolve(&actor(kind), &AccessTarget::new(ENTITY, Visibility::Hidden));
            prop_assert_eq!(got, Permissions::NONE);
        }

        #[test]
        fn comment_mirrors_view_for_everyone(kind in actor_kind(), vis in visibility()) {
            let got = resolve(&actor(kind), &AccessTarget::new(ENTITY, vis));
            prop_assert_eq!(got.can_comment, got.can_view);
        }
    }
}
