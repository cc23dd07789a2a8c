//! Game parameters. Every numeric default here is the one quoted in the rules
//! reference rendered by [`crate::render::rules`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: i32,
    pub force_count: usize,

    pub starting_shih: i32,
    pub max_shih: i32,
    pub base_shih_income: i32,
    pub contentious_shih_bonus: i32,

    pub visibility_range: i32,
    pub scout_range: i32,
    pub supply_range: i32,
    pub max_supply_hops: u32,

    pub scout_cost: i32,
    pub fortify_cost: i32,
    pub ambush_cost: i32,
    pub charge_cost: i32,
    pub scout_accuracy: f64,

    pub charge_attack_bonus: i32,
    pub fortify_bonus: i32,
    pub ambush_bonus: i32,
    pub difficult_defense_bonus: i32,
    pub max_support_bonus: i32,
    pub retreat_threshold: i32,

    pub shrink_interval: u32,

    pub domination_hexes_required: usize,
    pub domination_turns_required: u32,

    /// Whether an exact Scout reveal also flips the target's public `revealed` flag.
    /// Default matches the source behavior: scout results stay private.
    pub scout_exact_public: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 7,
            force_count: 5,

            starting_shih: 6,
            max_shih: 10,
            base_shih_income: 1,
            contentious_shih_bonus: 2,

            visibility_range: 2,
            scout_range: 2,
            supply_range: 2,
            max_supply_hops: 2,

            scout_cost: 2,
            fortify_cost: 2,
            ambush_cost: 3,
            charge_cost: 2,
            scout_accuracy: 0.7,

            charge_attack_bonus: 2,
            fortify_bonus: 2,
            ambush_bonus: 2,
            difficult_defense_bonus: 1,
            max_support_bonus: 2,
            retreat_threshold: 2,

            shrink_interval: 5,

            domination_hexes_required: 2,
            domination_turns_required: 4,

            scout_exact_public: false,
        }
    }
}

/// Turn ceiling for a single game; upkeep reports `VictoryType::Timeout` past this.
pub const MAX_TURNS: u32 = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.board_size, 7);
        assert_eq!(cfg.force_count, 5);
        assert_eq!(cfg.starting_shih, 6);
        assert_eq!(cfg.max_shih, 10);
        assert_eq!(cfg.domination_hexes_required, 2);
        assert_eq!(cfg.domination_turns_required, 4);
        assert!(!cfg.scout_exact_public);
    }
}
