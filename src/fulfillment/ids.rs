use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::ItemId;

const GROUP_PREFIX: &str = "group_";

/// Locally generated identifier of a merged shipment, rendered `group_<uuid>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{GROUP_PREFIX}{}", self.0.simple())
    }
}

impl FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(GROUP_PREFIX)
            .ok_or_else(|| format!("Group id must start with '{GROUP_PREFIX}': {s}"))?;
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| format!("Invalid group id {s}: {e}"))
    }
}

impl Serialize for GroupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GroupId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Key of a shipment form: one item on its own, or a merged group.
///
/// On the wire a single item is its numeric id and a group is its `group_` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormKey {
    Single(ItemId),
    Group(GroupId),
}

impl FormKey {
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Single(id) => Some(*id),
            Self::Group(_) => None,
        }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Self::Group(id) => Some(*id),
            Self::Single(_) => None,
        }
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(id) => write!(f, "item_{id}"),
            Self::Group(id) => write!(f, "{id}"),
        }
    }
}

impl From<GroupId> for FormKey {
    fn from(id: GroupId) -> Self {
        Self::Group(id)
    }
}
