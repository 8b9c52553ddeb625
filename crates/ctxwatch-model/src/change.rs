//! Change kinds and object identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The kind of change a save reported for an object.
///
/// Ordering follows [`ChangeKind::ALL`], so maps keyed by kind iterate
/// inserted, updated, deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The object was inserted by the save.
    Inserted,
    /// The object was updated by the save.
    Updated,
    /// The object was deleted by the save.
    Deleted,
}

impl ChangeKind {
    /// Every kind, in reporting order.
    pub const ALL: [ChangeKind; 3] = [ChangeKind::Inserted, ChangeKind::Updated, ChangeKind::Deleted];

    /// Stable tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Inserted => "inserted",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inserted" => Ok(ChangeKind::Inserted),
            "updated" => Ok(ChangeKind::Updated),
            "deleted" => Ok(ChangeKind::Deleted),
            other => Err(Error::UnknownChangeKind(other.to_string())),
        }
    }
}

/// Identity of a persisted object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub [u8; 16]);

impl ObjectId {
    /// Create an id from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Build an id whose trailing eight bytes hold `n` big-endian.
    ///
    /// Handy for fixtures and sequential ids.
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[8..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Raw bytes of the id.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for ObjectId {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(|_| Error::InvalidObjectId(s.to_string()))?;
        let bytes: [u8; 16] = decoded
            .try_into()
            .map_err(|_| Error::InvalidObjectId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        for kind in ChangeKind::ALL {
            assert_eq!(kind.as_str().parse::<ChangeKind>().unwrap(), kind);
        }
        assert_eq!(
            "merged".parse::<ChangeKind>(),
            Err(Error::UnknownChangeKind("merged".into()))
        );
    }

    #[test]
    fn test_kind_ordering() {
        let mut kinds = vec![ChangeKind::Deleted, ChangeKind::Inserted, ChangeKind::Updated];
        kinds.sort();
        assert_eq!(kinds, ChangeKind::ALL.to_vec());
    }

    #[test]
    fn test_kind_serde_tag() {
        assert_eq!(serde_json::to_string(&ChangeKind::Updated).unwrap(), r#""updated""#);
    }

    #[test]
    fn test_object_id_hex() {
        let id = ObjectId::from_u64(255);
        let text = id.to_string();
        assert_eq!(text, "000000000000000000000000000000ff");
        assert_eq!(text.parse::<ObjectId>().unwrap(), id);
        assert!("abc".parse::<ObjectId>().is_err());
    }
}
