//! Resource ledger — crafting with all-or-nothing semantics.
//!
//! A [`Recipe`] consumes a bundle of inputs and produces a bundle of outputs
//! plus optional health, health-ceiling and multiplier effects. [`craft`]
//! either applies all of it or leaves the state untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resources::{ResourceBundle, ResourceKind, Shortfall};
use crate::state::{SurvivalState, Terminal};

/// A fixed input/output transformation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    pub name: String,
    pub inputs: ResourceBundle,
    pub outputs: ResourceBundle,
    pub health: i32,
    pub max_health: i32,
    pub multiplier: f32,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn input(mut self, kind: impl Into<ResourceKind>, quantity: u32) -> Self {
        self.inputs = self.inputs.with(kind, quantity);
        self
    }

    pub fn output(mut self, kind: impl Into<ResourceKind>, quantity: u32) -> Self {
        self.outputs = self.outputs.with(kind, quantity);
        self
    }

    pub fn heals(mut self, health: i32, max_health: i32) -> Self {
        self.health = health;
        self.max_health = max_health;
        self
    }

    pub fn raises_multiplier(mut self, delta: f32) -> Self {
        self.multiplier = delta;
        self
    }

    fn has_effect(&self) -> bool {
        !self.outputs.is_empty() || self.health != 0 || self.max_health != 0 || self.multiplier != 0.0
    }

    /// A recipe must cost something and do something.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.inputs.is_empty() && self.has_effect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("not enough materials: {0}")]
    InsufficientResources(Shortfall),
    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),
    #[error("session is over ({0:?})")]
    SessionOver(Terminal),
}

/// What a successful craft applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftOutcome {
    pub recipe: String,
    pub consumed: ResourceBundle,
    pub produced: ResourceBundle,
    /// Health actually gained after clamping.
    pub health_gained: i32,
    pub max_health_gained: i32,
    pub multiplier_gained: f32,
}

/// Craft `recipe` against the player's inventory.
pub fn craft(state: &mut SurvivalState, recipe: &Recipe) -> Result<CraftOutcome, LedgerError> {
    if let Some(terminal) = state.terminal_or_fallen() {
        return Err(LedgerError::SessionOver(terminal));
    }
    if !recipe.is_valid() {
        return Err(LedgerError::InvalidRecipe(recipe.name.clone()));
    }

    state
        .inventory
        .try_consume(&recipe.inputs)
        .map_err(LedgerError::InsufficientResources)?;

    state.inventory.grant(&recipe.outputs);
    let max_before = state.max_health;
    state.change_max_health(recipe.max_health);
    let health_gained = state.change_health(recipe.health);
    state.change_multiplier(recipe.multiplier);

    state.last_message = format!("Crafted {}!", display_name(&recipe.name));
    if health_gained > 0 {
        state.last_message.push_str(&format!(" +{} HP", health_gained));
    }

    Ok(CraftOutcome {
        recipe: recipe.name.clone(),
        consumed: recipe.inputs.clone(),
        produced: recipe.outputs.clone(),
        health_gained,
        max_health_gained: state.max_health - max_before,
        multiplier_gained: recipe.multiplier,
    })
}

/// `health_potion` → `Health Potion`
pub fn display_name(recipe: &str) -> String {
    recipe
        .split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered set of recipes, looked up by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes the inventory can currently afford.
    pub fn craftable<'a>(&'a self, state: &'a SurvivalState) -> impl Iterator<Item = &'a Recipe> {
        self.recipes
            .iter()
            .filter(move |r| state.inventory.shortfall(&r.inputs).is_none())
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self::new(vec![
            Recipe::new("health_potion")
                .input("herb", 3)
                .input("bandage", 1)
                .output("potion", 1)
                .heals(70, 70),
            Recipe::new("bandage").input("herb", 2).output("bandage", 1),
            Recipe::new("torch").input("wood", 2).output("torch", 1),
            Recipe::new("bed").input("wood", 5).raises_multiplier(0.5),
        ])
    }
}

/// Look up `name` in `book` and craft it.
pub fn craft_named(
    state: &mut SurvivalState,
    book: &RecipeBook,
    name: &str,
) -> Result<CraftOutcome, LedgerError> {
    let recipe = book
        .get(name)
        .ok_or_else(|| LedgerError::InvalidRecipe(name.to_string()))?;
    craft(state, recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::on_victory;

    fn potion() -> Recipe {
        RecipeBook::default().get("health_potion").unwrap().clone()
    }

    #[test]
    fn test_health_potion_raises_ceiling_then_heals() {
        let mut state = SurvivalState::default();
        let out = craft(&mut state, &potion()).unwrap();
        assert_eq!(state.inventory.count(&ResourceKind::Herb), 2);
        assert_eq!(state.inventory.count(&ResourceKind::Bandage), 1);
        assert_eq!(state.inventory.count(&ResourceKind::Potion), 1);
        assert_eq!(state.max_health, 170);
        assert_eq!(state.health, 170);
        assert_eq!(out.health_gained, 70);
        assert_eq!(out.max_health_gained, 70);
        assert_eq!(state.last_message, "Crafted Health Potion! +70 HP");
    }

    #[test]
    fn test_insufficient_leaves_state_untouched() {
        let mut state = SurvivalState::default();
        state.inventory = ResourceBundle::new().with("herb", 2).with("bandage", 4).into();
        let before = state.clone();

        let err = craft(&mut state, &potion()).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientResources(Shortfall {
                kind: ResourceKind::Herb,
                needed: 3,
                available: 2,
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_bed_raises_multiplier() {
        let mut state = SurvivalState::default();
        state.inventory.add(ResourceKind::Wood, 5);
        craft_named(&mut state, &RecipeBook::default(), "bed").unwrap();
        assert!((state.multiplier - 1.5).abs() < 1e-6);
        assert_eq!(state.inventory.count(&ResourceKind::Wood), 0);
    }

    #[test]
    fn test_unknown_recipe() {
        let mut state = SurvivalState::default();
        let err = craft_named(&mut state, &RecipeBook::default(), "airship").unwrap_err();
        assert_eq!(err, LedgerError::InvalidRecipe("airship".into()));
    }

    #[test]
    fn test_free_or_empty_recipes_rejected() {
        let mut state = SurvivalState::default();
        let free = Recipe::new("free_gem").output("gem", 1);
        assert!(matches!(
            craft(&mut state, &free),
            Err(LedgerError::InvalidRecipe(_))
        ));
        let nothing = Recipe::new("nothing").input("herb", 1);
        assert!(matches!(
            craft(&mut state, &nothing),
            Err(LedgerError::InvalidRecipe(_))
        ));
        assert_eq!(state.inventory.count(&ResourceKind::Herb), 5);
    }

    #[test]
    fn test_terminal_rejects_craft() {
        let mut state = SurvivalState::default();
        on_victory(&mut state);
        let before = state.inventory.clone();
        assert_eq!(
            craft(&mut state, &potion()).unwrap_err(),
            LedgerError::SessionOver(Terminal::Victory)
        );
        assert_eq!(state.inventory, before);
    }

    #[test]
    fn test_fallen_player_cannot_heal() {
        let mut state = SurvivalState {
            health: 0,
            ..SurvivalState::default()
        };
        let before = state.clone();
        assert_eq!(
            craft(&mut state, &potion()).unwrap_err(),
            LedgerError::SessionOver(Terminal::Death)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_craftable_filter() {
        let state = SurvivalState::default();
        let book = RecipeBook::default();
        let names: Vec<_> = book.craftable(&state).map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["health_potion", "bandage"]);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("health_potion"), "Health Potion");
        assert_eq!(display_name("bed"), "Bed");
    }
}
