//! Resource kinds, bundles, and the player inventory.
//!
//! Counts are unsigned, so an inventory can never hold a negative amount.
//! Consumption goes through [`Inventory::try_consume`], which checks every
//! requirement before touching any count.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A kind of resource the player can hold.
///
/// The list is open: any name that is not one of the known kinds becomes
/// [`ResourceKind::Custom`]. Kinds serialize as plain lower-case strings so
/// that config tables read as `{"herb": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceKind {
    Herb,
    Bandage,
    Torch,
    Food,
    Weapon,
    Potion,
    Gem,
    Wood,
    Coin,
    Custom(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Herb => "herb",
            Self::Bandage => "bandage",
            Self::Torch => "torch",
            Self::Food => "food",
            Self::Weapon => "weapon",
            Self::Potion => "potion",
            Self::Gem => "gem",
            Self::Wood => "wood",
            Self::Coin => "coin",
            Self::Custom(name) => name,
        }
    }

    /// Capitalized label used on the HUD (`herb` → `Herb`).
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "herb" | "herbs" => Self::Herb,
            "bandage" | "bandages" => Self::Bandage,
            "torch" | "torches" => Self::Torch,
            "food" => Self::Food,
            "weapon" | "weapons" => Self::Weapon,
            "potion" | "potions" => Self::Potion,
            "gem" | "gems" => Self::Gem,
            "wood" => Self::Wood,
            "coin" | "coins" => Self::Coin,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<&str> for ResourceKind {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed set of resource quantities, such as a recipe's inputs or a loot drop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceBundle(BTreeMap<ResourceKind, u32>);

impl ResourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Repeated kinds accumulate.
    pub fn with(mut self, kind: impl Into<ResourceKind>, quantity: u32) -> Self {
        *self.0.entry(kind.into()).or_insert(0) += quantity;
        self
    }

    pub fn get(&self, kind: &ResourceKind) -> u32 {
        self.0.get(kind).copied().unwrap_or(0)
    }

    /// True when the bundle holds no non-zero quantity.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|&q| q == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, u32)> {
        self.0.iter().map(|(k, &q)| (k, q))
    }
}

impl<K: Into<ResourceKind>> FromIterator<(K, u32)> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |bundle, (k, q)| bundle.with(k, q))
    }
}

/// The first requirement an inventory could not cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub kind: ResourceKind,
    pub needed: u32,
    pub available: u32,
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "need {} {}, have {}",
            self.needed, self.kind, self.available
        )
    }
}

/// Resources held by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<ResourceKind, u32>);

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: &ResourceKind) -> u32 {
        self.0.get(kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: ResourceKind, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let slot = self.0.entry(kind).or_insert(0);
        *slot = slot.saturating_add(quantity);
    }

    /// Add every entry of `bundle`.
    pub fn grant(&mut self, bundle: &ResourceBundle) {
        for (kind, quantity) in bundle.iter() {
            self.add(kind.clone(), quantity);
        }
    }

    /// First requirement of `bundle` not covered by this inventory, in key order.
    pub fn shortfall(&self, bundle: &ResourceBundle) -> Option<Shortfall> {
        bundle.iter().find_map(|(kind, needed)| {
            let available = self.count(kind);
            (available < needed).then(|| Shortfall {
                kind: kind.clone(),
                needed,
                available,
            })
        })
    }

    /// Remove every entry of `bundle`, or nothing at all.
    pub fn try_consume(&mut self, bundle: &ResourceBundle) -> Result<(), Shortfall> {
        if let Some(missing) = self.shortfall(bundle) {
            return Err(missing);
        }
        for (kind, quantity) in bundle.iter() {
            if let Some(slot) = self.0.get_mut(kind) {
                *slot -= quantity;
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, u32)> {
        self.0.iter().map(|(k, &q)| (k, q))
    }
}

impl From<ResourceBundle> for Inventory {
    fn from(bundle: ResourceBundle) -> Self {
        let mut inventory = Inventory::new();
        inventory.grant(&bundle);
        inventory
    }
}

/// `Herb:5,Bandage:2`: non-empty entries in key order.
impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, quantity) in self.iter().filter(|(_, q)| *q > 0) {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", kind.label(), quantity)?;
            first = false;
        }
        if first {
            f.write_str("Empty")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_custom_kinds() {
        assert_eq!(ResourceKind::from("herbs"), ResourceKind::Herb);
        assert_eq!(ResourceKind::from("Bandage"), ResourceKind::Bandage);
        assert_eq!(
            ResourceKind::from("moonstone"),
            ResourceKind::Custom("moonstone".into())
        );
        assert_eq!(ResourceKind::Custom("moonstone".into()).label(), "Moonstone");
    }

    #[test]
    fn test_bundle_from_json() {
        let bundle: ResourceBundle = serde_json::from_str(r#"{"herb": 3, "bandage": 1}"#).unwrap();
        assert_eq!(bundle.get(&ResourceKind::Herb), 3);
        assert_eq!(bundle.get(&ResourceKind::Bandage), 1);
        assert_eq!(bundle.get(&ResourceKind::Gem), 0);
    }

    #[test]
    fn test_try_consume_all_or_nothing() {
        let mut inv: Inventory = ResourceBundle::new()
            .with(ResourceKind::Herb, 5)
            .with(ResourceKind::Bandage, 0)
            .into();
        let before = inv.clone();
        let cost = ResourceBundle::new()
            .with(ResourceKind::Herb, 3)
            .with(ResourceKind::Bandage, 1);

        let err = inv.try_consume(&cost).unwrap_err();
        assert_eq!(err.kind, ResourceKind::Bandage);
        assert_eq!(err.needed, 1);
        assert_eq!(err.available, 0);
        assert_eq!(inv, before);
    }

    #[test]
    fn test_try_consume_success() {
        let mut inv: Inventory = ResourceBundle::new().with("herb", 5).into();
        inv.try_consume(&ResourceBundle::new().with("herb", 5)).unwrap();
        assert_eq!(inv.count(&ResourceKind::Herb), 0);
    }

    #[test]
    fn test_display_skips_empty() {
        let mut inv = Inventory::new();
        assert_eq!(inv.to_string(), "Empty");
        inv.add(ResourceKind::Herb, 5);
        inv.add(ResourceKind::Bandage, 2);
        inv.add(ResourceKind::Gem, 0);
        assert_eq!(inv.to_string(), "Herb:5,Bandage:2");
    }
}
