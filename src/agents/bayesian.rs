//! Perfect-memory baseline: every reveal seen across the whole game is
//! retained, and the permutation constraint (each of 1..5 used exactly once
//! per side) narrows what remains unknown.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;

use super::{build_report, step_toward, Agent, FIXED_DEPLOYMENT};
use crate::config::GameConfig;
use crate::model::{GameState, TokenId};
use crate::orders::Order;
use crate::telemetry::{AgentReport, BeliefState};
use crate::view::view_for;

#[derive(Debug, Default)]
pub struct PerfectMemoryAgent {
    known_exact: BTreeMap<TokenId, u8>,
}

impl PerfectMemoryAgent {
    fn belief_for(&self, enemy_id: &str, power: Option<u8>, band: Option<&[u8]>) -> BeliefState {
        if let Some(p) = power {
            return BeliefState::point_mass(p);
        }
        let assigned: std::collections::HashSet<u8> =
            self.known_exact.iter().filter(|(id, _)| id.as_str() != enemy_id).map(|(_, &p)| p).collect();
        let candidates: Vec<u8> = match band {
            Some(band) => band.iter().copied().filter(|p| !assigned.contains(p)).collect(),
            None => (1..=5u8).filter(|p| !assigned.contains(p)).collect(),
        };
        if candidates.is_empty() {
            return BeliefState::uniform();
        }
        let share = 1.0 / candidates.len() as f64;
        let mut distribution = BTreeMap::new();
        for p in 1..=5u8 {
            distribution.insert(p, if candidates.contains(&p) { share } else { 0.0 });
        }
        BeliefState { distribution }
    }
}

impl Agent for PerfectMemoryAgent {
    fn name(&self) -> &'static str {
        "baseline_perfect_memory"
    }

    fn deploy(&mut self, tokens: &[TokenId], _rng: &mut SmallRng) -> BTreeMap<TokenId, u8> {
        tokens.iter().cloned().zip(FIXED_DEPLOYMENT).collect()
    }

    fn observe_and_plan(
        &mut self,
        player_id: &str,
        state: &GameState,
        cfg: &GameConfig,
        _rng: &mut SmallRng,
    ) -> (Vec<Order>, AgentReport) {
        let view = view_for(state, player_id, cfg);
        let player = state.player(player_id).expect("player must exist");
        let center = state.board.center();

        for enemy in &view.visible_enemies {
            if let Some(p) = enemy.power {
                if enemy.power_band.is_none() {
                    self.known_exact.insert(enemy.id.clone(), p);
                }
            }
        }

        let beliefs: BTreeMap<String, BeliefState> = view
            .visible_enemies
            .iter()
            .map(|e| (e.id.clone(), self.belief_for(&e.id, e.power.filter(|_| e.power_band.is_none()), e.power_band.as_deref())))
            .collect();

        let mut orders = Vec::new();
        for token in player.alive_tokens() {
            if token.is_sovereign() {
                let threatened = view.visible_enemies.iter().any(|e| e.position.distance(token.position) <= 1);
                if threatened {
                    if crate::orders::has_supply(state, &token.id, cfg) && player.shih >= cfg.fortify_cost {
                        orders.push(Order::fortify(token.id.clone()));
                        continue;
                    }
                }
            }

            if token.power.map(|p| p <= 3).unwrap_or(false) {
                let target = view
                    .visible_enemies
                    .iter()
                    .filter(|e| !self.known_exact.contains_key(&e.id))
                    .filter(|e| e.position.distance(token.position) <= cfg.scout_range)
                    .min_by_key(|e| e.position.distance(token.position));
                if let Some(target) = target {
                    orders.push(Order::scout(token.id.clone(), target.id.clone()));
                    continue;
                }
            }

            if let Some(dest) = step_toward(state, token.position, center) {
                orders.push(Order::mv(token.id.clone(), dest));
            }
        }

        let report = build_report(state.turn, player_id, self.name(), beliefs, &orders, 0.7);
        (orders, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::initialize_game;
    use rand::SeedableRng;

    #[test]
    fn remembers_a_reveal_across_turns() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let p2_token = game.player("p2").unwrap().tokens[0].id.clone();
        game.find_token_mut(&p2_token).unwrap().power = Some(4);
        game.find_token_mut(&p2_token).unwrap().revealed = true;
        let p1_pos = game.player("p1").unwrap().tokens[0].position;
        game.find_token_mut(&p2_token).unwrap().position = p1_pos.neighbors()[0];

        let mut agent = PerfectMemoryAgent::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let (_orders, report) = agent.observe_and_plan("p1", &game, &cfg, &mut rng);
        assert_eq!(report.beliefs[&p2_token].predicted_power(), 4);
        assert_eq!(agent.known_exact[&p2_token], 4);

        // Even once the force goes out of view, the memory of its power persists.
        game.find_token_mut(&p2_token).unwrap().position = state_far_corner(&game);
        let (_orders2, _report2) = agent.observe_and_plan("p1", &game, &cfg, &mut rng);
        assert_eq!(agent.known_exact[&p2_token], 4);
    }

    fn state_far_corner(game: &GameState) -> crate::map::HexCoord {
        let c = game.board.size;
        crate::map::HexCoord::new(c - 1, c - 1)
    }
}
