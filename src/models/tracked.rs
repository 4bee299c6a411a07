//! Tracked entity model
//!
//! Characters and solar systems the notifier watches share one shape.

use serde::{Deserialize, Serialize};

use crate::cache::keys::KeyPart;
use crate::cache::MAX_KEY_LENGTH;
use crate::error::ValidationError;

/// Longest id whose derived keys all fit within [`MAX_KEY_LENGTH`].
/// `tracked:character:<id>` is the longest key built from an id.
pub const MAX_ID_LENGTH: usize = MAX_KEY_LENGTH - "tracked:character:".len();

/// Kind of tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    System,
}

impl EntityKind {
    /// Key segment for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::System => "system",
        }
    }
}

/// A tracked character or solar system.
///
/// `id` is the EVE identifier in string form, never an internal row id.
/// Deserialisation accepts a string or integer id and applies the same
/// checks as [`TrackedEntity::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTrackedEntity")]
pub struct TrackedEntity {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alliance_id: Option<i64>,
    pub tracked: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

impl From<RawId> for KeyPart {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Int(n) => KeyPart::Int(n),
            RawId::Str(s) => KeyPart::Str(s),
        }
    }
}

/// Wire shape of a tracked entity before validation.
#[derive(Deserialize)]
struct RawTrackedEntity {
    id: RawId,
    name: String,
    #[serde(default)]
    corporation_id: Option<i64>,
    #[serde(default)]
    alliance_id: Option<i64>,
    #[serde(default = "default_tracked")]
    tracked: bool,
}

fn default_tracked() -> bool {
    true
}

impl TryFrom<RawTrackedEntity> for TrackedEntity {
    type Error = ValidationError;

    fn try_from(raw: RawTrackedEntity) -> Result<Self, Self::Error> {
        let mut entity = TrackedEntity::new(raw.id, raw.name)?;
        entity.corporation_id = raw.corporation_id;
        entity.alliance_id = raw.alliance_id;
        entity.tracked = raw.tracked;
        Ok(entity)
    }
}

impl TrackedEntity {
    /// Creates a tracked entity, rejecting an empty id or name and ids too
    /// long to form a cache key.
    pub fn new(
        id: impl Into<KeyPart>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into().to_string();
        let name = name.into();

        if id.trim().is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        if id.len() > MAX_ID_LENGTH {
            return Err(ValidationError::TooLong {
                field: "id",
                max: MAX_ID_LENGTH,
            });
        }
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }

        Ok(Self {
            id,
            name,
            corporation_id: None,
            alliance_id: None,
            tracked: true,
        })
    }

    pub fn with_corporation(mut self, corporation_id: i64) -> Self {
        self.corporation_id = Some(corporation_id);
        self
    }

    pub fn with_alliance(mut self, alliance_id: i64) -> Self {
        self.alliance_id = Some(alliance_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_integer_and_string_ids() {
        let a = TrackedEntity::new(95465499i64, "Kael Tor").unwrap();
        let b = TrackedEntity::new("95465499", "Kael Tor").unwrap();
        assert_eq!(a, b);
        assert!(a.tracked);
    }

    #[test]
    fn test_new_rejects_empty_fields() {
        assert_eq!(
            TrackedEntity::new("", "name"),
            Err(ValidationError::EmptyField("id"))
        );
        assert_eq!(
            TrackedEntity::new(1, "  "),
            Err(ValidationError::EmptyField("name"))
        );
    }

    #[test]
    fn test_new_rejects_ids_too_long_for_keys() {
        let longest = "9".repeat(MAX_ID_LENGTH);
        let entity = TrackedEntity::new(longest.as_str(), "Edge").unwrap();
        assert_eq!(
            crate::cache::keys::character_tracked(&entity.id).len(),
            MAX_KEY_LENGTH
        );

        assert_eq!(
            TrackedEntity::new("9".repeat(300), "Too Long"),
            Err(ValidationError::TooLong {
                field: "id",
                max: MAX_ID_LENGTH
            })
        );
    }

    #[test]
    fn test_deserialize_integer_id() {
        let entity: TrackedEntity =
            serde_json::from_str(r#"{"id": 95465499, "name": "Kael Tor"}"#).unwrap();
        assert_eq!(entity, TrackedEntity::new(95465499i64, "Kael Tor").unwrap());
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let empty_id = serde_json::from_str::<TrackedEntity>(r#"{"id": "", "name": "Jita"}"#);
        assert!(empty_id.unwrap_err().to_string().contains("`id`"));

        let blank_name = serde_json::from_str::<TrackedEntity>(r#"{"id": 1, "name": " "}"#);
        assert!(blank_name.is_err());
    }

    #[test]
    fn test_serialize_field_names() {
        let entity = TrackedEntity::new(1, "Jita")
            .unwrap()
            .with_corporation(98000001)
            .with_alliance(99000001);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["name"], "Jita");
        assert_eq!(json["corporation_id"], 98000001);
        assert_eq!(json["alliance_id"], 99000001);
        assert_eq!(json["tracked"], true);
    }

    #[test]
    fn test_deserialize_defaults() {
        let entity: TrackedEntity =
            serde_json::from_str(r#"{"id": "30000142", "name": "Jita"}"#).unwrap();
        assert!(entity.tracked);
        assert!(entity.corporation_id.is_none());

        let untracked: TrackedEntity = serde_json::from_str(
            r#"{"id": "30000142", "name": "Jita", "tracked": false, "alliance_id": 99000001}"#,
        )
        .unwrap();
        assert!(!untracked.tracked);
        assert_eq!(untracked.alliance_id, Some(99000001));
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(EntityKind::Character.as_str(), "character");
        assert_eq!(EntityKind::System.as_str(), "system");
    }
}
