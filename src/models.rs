// 🧩 Team Models - Pokemon, types, and the fixed six-slot team
//
// A Pokemon is a value: fetched once, never mutated. The team holds copies,
// so refetching the same Pokemon yields an independent value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of slots in a team.
pub const TEAM_SIZE: usize = 6;

/// Size of the known type universe, used as the coverage denominator.
pub const TYPE_UNIVERSE: usize = 18;

/// The known Pokemon types, in catalog order.
///
/// Only used for filter chips and colors. Catalog data is never validated
/// against this list.
pub const KNOWN_TYPES: [&str; TYPE_UNIVERSE] = [
    "normal", "fire", "water", "electric", "grass", "ice",
    "fighting", "poison", "ground", "flying", "psychic", "bug",
    "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

// ============================================================================
// POKEMON
// ============================================================================

/// A type tag attached to a Pokemon. `url` is an opaque catalog locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonType {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    /// Stable catalog identity
    pub id: u32,

    /// Lowercase catalog name, secondary lookup key
    pub name: String,

    /// Types in catalog order
    pub types: Vec<PokemonType>,

    /// Sprite URL (empty when the catalog has no image)
    pub sprite: String,
}

impl Pokemon {
    /// Name with the first letter capitalized, for display.
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.name == type_name)
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// TEAM
// ============================================================================

/// Fixed six-slot team plus the sorted set of covered type names.
///
/// `covered_types` is always recomputed from every filled slot after a
/// mutation, never patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    slots: [Option<Pokemon>; TEAM_SIZE],
    covered_types: Vec<String>,
}

impl Default for Team {
    fn default() -> Self {
        Self::new()
    }
}

impl Team {
    /// Empty team: all slots empty, no covered types.
    pub fn new() -> Self {
        Team {
            slots: std::array::from_fn(|_| None),
            covered_types: Vec::new(),
        }
    }

    pub fn slots(&self) -> &[Option<Pokemon>; TEAM_SIZE] {
        &self.slots
    }

    pub fn slot(&self, position: usize) -> Option<&Pokemon> {
        self.slots.get(position).and_then(|p| p.as_ref())
    }

    /// Covered type names, sorted ascending.
    pub fn covered_types(&self) -> &[String] {
        &self.covered_types
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.covered_types.binary_search_by(|t| t.as_str().cmp(type_name)).is_ok()
    }

    /// Replace the slot at `position`. Returns false when out of range.
    pub fn set_slot(&mut self, position: usize, pokemon: Option<Pokemon>) -> bool {
        match self.slots.get_mut(position) {
            Some(slot) => {
                *slot = pokemon;
                self.recompute_covered_types();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Team::new();
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Summary statistics against a type universe of `type_universe` names.
    pub fn stats(&self, type_universe: usize) -> TeamStats {
        let filled_slots = self.filled_slots();
        let total_types = self.covered_types.len();

        TeamStats {
            filled_slots,
            empty_slots: TEAM_SIZE - filled_slots,
            total_types,
            type_coverage: coverage_percent(total_types, type_universe),
        }
    }

    fn recompute_covered_types(&mut self) {
        let types: BTreeSet<&str> = self
            .slots
            .iter()
            .flatten()
            .flat_map(|p| p.types.iter().map(|t| t.name.as_str()))
            .collect();

        self.covered_types = types.into_iter().map(String::from).collect();
    }
}

/// `round(100 * covered / universe)`. May exceed 100 when more names are
/// covered than the universe holds.
pub fn coverage_percent(covered: usize, universe: usize) -> u32 {
    if universe == 0 {
        return 0;
    }
    (100.0 * covered as f64 / universe as f64).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamStats {
    pub filled_slots: usize,
    pub empty_slots: usize,
    pub total_types: usize,
    /// Percentage of the type universe covered
    pub type_coverage: u32,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn pokemon(id: u32, name: &str, types: &[&str]) -> Pokemon {
        Pokemon {
            id,
            name: name.to_string(),
            types: types
                .iter()
                .map(|t| PokemonType {
                    name: t.to_string(),
                    url: format!("https://pokeapi.co/api/v2/type/{}/", t),
                })
                .collect(),
            sprite: format!("https://img.example/{}.png", id),
        }
    }

    #[test]
    fn test_new_team_is_empty() {
        let team = Team::new();

        assert_eq!(team.filled_slots(), 0);
        assert!(team.covered_types().is_empty());
        assert!(team.slots().iter().all(|s| s.is_none()));
    }

    #[test]
    fn test_covered_types_sorted_and_deduplicated() {
        let mut team = Team::new();
        team.set_slot(0, Some(pokemon(6, "charizard", &["fire", "flying"])));
        team.set_slot(3, Some(pokemon(130, "gyarados", &["water", "flying"])));

        assert_eq!(team.covered_types(), &["fire", "flying", "water"]);
        assert!(team.has_type("flying"));
        assert!(!team.has_type("grass"));
    }

    #[test]
    fn test_removing_slot_recomputes_coverage() {
        let mut team = Team::new();
        team.set_slot(0, Some(pokemon(6, "charizard", &["fire", "flying"])));
        team.set_slot(1, Some(pokemon(25, "pikachu", &["electric"])));

        team.set_slot(0, None);

        assert_eq!(team.covered_types(), &["electric"]);
        assert_eq!(team.filled_slots(), 1);
    }

    #[test]
    fn test_set_slot_out_of_range() {
        let mut team = Team::new();

        assert!(!team.set_slot(TEAM_SIZE, Some(pokemon(25, "pikachu", &["electric"]))));
        assert_eq!(team, Team::new());
    }

    #[test]
    fn test_stats_single_type() {
        let mut team = Team::new();
        team.set_slot(0, Some(pokemon(25, "pikachu", &["electric"])));

        let stats = team.stats(TYPE_UNIVERSE);

        assert_eq!(stats.filled_slots, 1);
        assert_eq!(stats.empty_slots, 5);
        assert_eq!(stats.total_types, 1);
        assert_eq!(stats.type_coverage, 6);
    }

    #[test]
    fn test_slot_counts_always_sum_to_team_size() {
        let mut team = Team::new();
        for i in 0..TEAM_SIZE {
            team.set_slot(i, Some(pokemon(i as u32 + 1, "mon", &["normal"])));
            let stats = team.stats(TYPE_UNIVERSE);
            assert_eq!(stats.filled_slots + stats.empty_slots, TEAM_SIZE);
        }
    }

    #[test]
    fn test_coverage_can_exceed_hundred() {
        // More distinct names than the fixed universe
        assert_eq!(coverage_percent(20, TYPE_UNIVERSE), 111);
        assert_eq!(coverage_percent(18, TYPE_UNIVERSE), 100);
        assert_eq!(coverage_percent(9, TYPE_UNIVERSE), 50);
        assert_eq!(coverage_percent(3, 0), 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut team = Team::new();
        team.set_slot(2, Some(pokemon(1, "bulbasaur", &["grass", "poison"])));

        team.clear();
        team.clear();

        assert_eq!(team, Team::new());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(pokemon(25, "pikachu", &[]).display_name(), "Pikachu");
        assert_eq!(capitalize(""), "");
    }
}
