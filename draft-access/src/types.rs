//! Identifiers and the request-scoped inputs to actor resolution.
//!
//! Nothing here is persisted by this crate. Owning entities and delegate
//! linkages are created out-of-band; session identities are handed over by
//! the presentation layer on every request.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Placeholder for a record storage has not assigned an id to yet.
            pub const UNASSIGNED: Self = Self(0);

            pub fn is_assigned(self) -> bool {
                self.0 != 0
            }

            /// Raw numeric value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of an owning entity (a representative).
    EntityId
);
numeric_id!(
    /// Identifier of a user account.
    IdentityId
);
numeric_id!(
    /// Identifier of a draft document.
    DocumentId
);
numeric_id!(
    /// Identifier of a comment on a draft document.
    CommentId
);

/// Geographic district tag used for constituent matching.
///
/// Tags compare case-insensitively with surrounding whitespace ignored, so
/// `"MO-05"` and `" mo-05 "` name the same district.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DistrictTag(String);

impl DistrictTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A blank tag names no district and never matches one.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for DistrictTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<DistrictTag> for String {
    fn from(tag: DistrictTag) -> Self {
        tag.0
    }
}

impl fmt::Display for DistrictTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The accountable party for a family of draft documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwningEntity {
    pub id: EntityId,
    /// Display name (e.g. the representative's name)
    pub name: String,
    pub district: DistrictTag,
}

impl OwningEntity {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, district: DistrictTag) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            district,
        }
    }
}

/// Role tag carried by a session.
///
/// Unrecognized tags deserialize to [`Role::Member`], which carries no
/// capability beyond district matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Site administrator, may act as any owning entity
    Admin,
    /// Representative, owner-capable for the entity they are bound to
    Representative,
    /// Staff member; delegation comes from the linkage, not from this tag
    Staffer,
    /// Any other signed-in account
    #[serde(other)]
    Member,
}

impl Role {
    /// Parse a free-form role tag. Anything unknown fails closed to `Member`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "rep" | "representative" => Self::Representative,
            "staffer" | "rep_staffer" => Self::Staffer,
            _ => Self::Member,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Representative => "representative",
            Self::Staffer => "staffer",
            Self::Member => "member",
        }
    }

    /// Whether this role grants the privileged override capability.
    pub fn is_override(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may own documents of the entity it is bound to.
    pub fn is_owner_capable(&self) -> bool {
        matches!(self, Self::Representative)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record of the signed-in caller, as supplied per request.
///
/// An anonymous request is represented by the absence of a
/// `SessionIdentity` (`Option::None`), not by a placeholder value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub identity_id: IdentityId,
    pub role: Role,
    /// Entity an owner-capable identity represents
    #[serde(default)]
    pub bound_entity: Option<EntityId>,
    #[serde(default)]
    pub district: Option<DistrictTag>,
    /// Entity explicitly chosen by a privileged caller for this request.
    /// Never remembered between requests.
    #[serde(default)]
    pub override_selection: Option<EntityId>,
}

impl SessionIdentity {
    pub fn new(identity_id: impl Into<IdentityId>, role: Role) -> Self {
        Self {
            identity_id: identity_id.into(),
            role,
            bound_entity: None,
            district: None,
            override_selection: None,
        }
    }

    /// Administrator identity.
    pub fn admin(identity_id: impl Into<IdentityId>) -> Self {
        Self::new(identity_id, Role::Admin)
    }

    /// Representative bound to `entity`.
    pub fn representative(identity_id: impl Into<IdentityId>, entity: EntityId) -> Self {
        Self::new(identity_id, Role::Representative).with_bound_entity(entity)
    }

    /// Staff account; its delegation is looked up separately.
    pub fn staffer(identity_id: impl Into<IdentityId>) -> Self {
        Self::new(identity_id, Role::Staffer)
    }

    /// Ordinary member living in `district`.
    pub fn member(identity_id: impl Into<IdentityId>, district: DistrictTag) -> Self {
        Self::new(identity_id, Role::Member).with_district(district)
    }

    pub fn with_bound_entity(mut self, entity: EntityId) -> Self {
        self.bound_entity = Some(entity);
        self
    }

    pub fn with_district(mut self, district: DistrictTag) -> Self {
        self.district = Some(district);
        self
    }

    pub fn with_override_selection(mut self, entity: EntityId) -> Self {
        self.override_selection = Some(entity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_tags_normalize() {
        assert_eq!(DistrictTag::new("MO-05"), DistrictTag::new(" mo-05 "));
        assert_ne!(DistrictTag::new("MO-05"), DistrictTag::new("MO-06"));
        assert_eq!(DistrictTag::new(" KS-3").as_str(), "ks-3");

        let parsed: DistrictTag = serde_json::from_str("\" MO-05\"").unwrap();
        assert_eq!(parsed, DistrictTag::new("mo-05"));
    }

    #[test]
    fn test_blank_district_tags() {
        assert!(DistrictTag::new("").is_blank());
        assert!(DistrictTag::new(" \t ").is_blank());
        assert!(!DistrictTag::new("MO-05").is_blank());
    }

    #[test]
    fn test_role_tags_fail_closed() {
        assert_eq!(Role::from_tag("rep"), Role::Representative);
        assert_eq!(Role::from_tag("ADMIN"), Role::Admin);
        assert_eq!(Role::from_tag("rep_staffer"), Role::Staffer);
        assert_eq!(Role::from_tag("superuser"), Role::Member);
        assert_eq!(Role::from_tag(""), Role::Member);
    }

    #[test]
    fn test_unknown_role_deserializes_to_member() {
        let role: Role = serde_json::from_str("\"candidate\"").unwrap();
        assert_eq!(role, Role::Member);

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_override());
    }

    #[test]
    fn test_identity_deserializes_with_defaults() {
        let identity: SessionIdentity =
            serde_json::from_str(r#"{"identity_id": 7, "role": "staffer"}"#).unwrap();

        assert_eq!(identity.identity_id, IdentityId(7));
        assert_eq!(identity.role, Role::Staffer);
        assert!(identity.bound_entity.is_none());
        assert!(identity.district.is_none());
        assert!(identity.override_selection.is_none());
    }
}
