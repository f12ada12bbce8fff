//! Override selection: which owning entity a privileged caller acts for.
//!
//! Selection is recomputed on every request from the explicit choice the
//! caller resubmits (if any) and the set of known entities. Nothing is
//! remembered between requests.

use crate::types::EntityId;
use tracing::debug;

/// Pick the entity a privileged caller operates on behalf of.
///
/// An explicit selection wins when it names a known entity. Otherwise the
/// first entity in `known` is the default, in the order the caller listed
/// them (storage lists owning entities by id). Returns `None` only when no
/// entity exists at all.
pub fn select_override_target(explicit: Option<EntityId>, known: &[EntityId]) -> Option<EntityId> {
    if let Some(selected) = explicit {
        if known.contains(&selected) {
            return Some(selected);
        }
        debug!(selected = %selected, "Override selection names no known entity, using default");
    }
    known.first().copied()
}
