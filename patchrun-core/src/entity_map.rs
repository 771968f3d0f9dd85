//! The static table from a spec's top-level YAML key to the sync entity the
//! client data store knows it by.
//!
//! Every content schema the migration tool understands is one [`EntityKey`]
//! variant. Adding a schema means adding a variant and one arm in each of
//! [`EntityKey::yaml_key`] and [`EntityKey::sync_entity`]; nothing else in the
//! workspace branches on key names.

use std::fmt;
use std::str::FromStr;

/// A top-level spec key recognised by the migration tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKey {
    Items,
    Equipment,
    Evolutions,
    MaterialEnchants,
    Enchants,
    ItemStrings,
    Passivities,
    CCompensations,
    ECompensations,
    FCompensations,
    ICompensations,
}

impl EntityKey {
    /// Every key, in table order.
    pub fn all() -> &'static [EntityKey] {
        &[
            EntityKey::Items,
            EntityKey::Equipment,
            EntityKey::Evolutions,
            EntityKey::MaterialEnchants,
            EntityKey::Enchants,
            EntityKey::ItemStrings,
            EntityKey::Passivities,
            EntityKey::CCompensations,
            EntityKey::ECompensations,
            EntityKey::FCompensations,
            EntityKey::ICompensations,
        ]
    }

    /// The key exactly as it appears at the top level of a spec.
    pub fn yaml_key(self) -> &'static str {
        match self {
            EntityKey::Items => "items",
            EntityKey::Equipment => "equipment",
            EntityKey::Evolutions => "evolutions",
            EntityKey::MaterialEnchants => "materialEnchants",
            EntityKey::Enchants => "enchants",
            EntityKey::ItemStrings => "itemStrings",
            EntityKey::Passivities => "passivities",
            EntityKey::CCompensations => "cCompensations",
            EntityKey::ECompensations => "eCompensations",
            EntityKey::FCompensations => "fCompensations",
            EntityKey::ICompensations => "iCompensations",
        }
    }

    /// Sync-config entity name, or `None` for server-only data.
    pub fn sync_entity(self) -> Option<&'static str> {
        match self {
            EntityKey::Items => Some("ItemData"),
            EntityKey::Equipment => Some("EquipmentData"),
            EntityKey::Evolutions => Some("EquipmentEvolutionData"),
            EntityKey::MaterialEnchants => Some("MaterialEnchantData"),
            EntityKey::Enchants => Some("EquipmentEnchantData"),
            EntityKey::ItemStrings => Some("StrSheet_Item"),
            EntityKey::Passivities
            | EntityKey::CCompensations
            | EntityKey::ECompensations
            | EntityKey::FCompensations
            | EntityKey::ICompensations => None,
        }
    }

    /// `true` when changes under this key never reach the client.
    pub fn is_server_only(self) -> bool {
        self.sync_entity().is_none()
    }

    /// Look up a top-level key. Matching is case-sensitive.
    pub fn from_yaml_key(key: &str) -> Option<EntityKey> {
        Self::all().iter().copied().find(|k| k.yaml_key() == key)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.yaml_key())
    }
}

impl FromStr for EntityKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml_key(s).ok_or_else(|| format!("unknown entity key '{s}'"))
    }
}
