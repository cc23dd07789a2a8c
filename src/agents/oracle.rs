//! Oracle baseline: reads the true `GameState` directly, bypassing fog of war.
//! A harness privilege for calibration, not a capability any engine-facing
//! agent could have.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;

use super::{build_report, step_toward, Agent, FIXED_DEPLOYMENT};
use crate::config::GameConfig;
use crate::model::{GameState, TokenId};
use crate::orders::Order;
use crate::telemetry::{AgentReport, BeliefState};

#[derive(Debug, Default)]
pub struct OracleAgent;

impl Agent for OracleAgent {
    fn name(&self) -> &'static str {
        "oracle"
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
        let player = state.player(player_id).expect("player must exist");
        let opponent = state.opponent_of(player_id);
        let center = state.board.center();

        let beliefs: BTreeMap<String, BeliefState> = opponent
            .alive_tokens()
            .map(|t| (t.id.clone(), BeliefState::point_mass(t.power.expect("deployed token has a power"))))
            .collect();

        let mut orders = Vec::new();
        for token in player.alive_tokens() {
            if token.is_sovereign() {
                let threatened = opponent.alive_tokens().any(|e| e.position.distance(token.position) <= 1);
                if threatened {
                    if crate::orders::has_supply(state, &token.id, cfg) && player.shih >= cfg.ambush_cost {
                        orders.push(Order::ambush(token.id.clone()));
                        continue;
                    }
                    let home_corner = home_corner(state, player_id);
                    if let Some(dest) = step_toward(state, token.position, home_corner) {
                        orders.push(Order::mv(token.id.clone(), dest));
                    }
                    continue;
                }
                if let Some(dest) = step_toward(state, token.position, center) {
                    orders.push(Order::mv(token.id.clone(), dest));
                }
                continue;
            }

            if token.power.map(|p| p >= 4).unwrap_or(false) {
                if let Some(enemy_sovereign) = opponent.sovereign() {
                    if token.position.distance(enemy_sovereign.position) <= 2
                        && crate::orders::has_supply(state, &token.id, cfg)
                        && player.shih >= cfg.charge_cost
                    {
                        orders.push(Order::charge(token.id.clone(), enemy_sovereign.position));
                        continue;
                    }
                    if let Some(dest) = step_toward(state, token.position, enemy_sovereign.position) {
                        orders.push(Order::mv(token.id.clone(), dest));
                        continue;
                    }
                }
            }

            if let Some(dest) = step_toward(state, token.position, center) {
                orders.push(Order::mv(token.id.clone(), dest));
            }
        }

        let report = build_report(state.turn, player_id, self.name(), beliefs, &orders, 1.0);
        (orders, report)
    }
}

fn home_corner(state: &GameState, player_id: &str) -> crate::map::HexCoord {
    let size = state.board.size;
    if player_id == "p1" {
        crate::map::HexCoord::new(0, 0)
    } else {
        crate::map::HexCoord::new(size - 1, size - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::initialize_game;
    use rand::SeedableRng;

    #[test]
    fn beliefs_are_point_masses_at_true_power() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        for (k, token) in game.player_mut("p2").unwrap().tokens.iter_mut().enumerate() {
            token.power = Some((k as u8) + 1);
        }
        let mut agent = OracleAgent;
        let mut rng = SmallRng::seed_from_u64(1);
        let (_orders, report) = agent.observe_and_plan("p1", &game, &cfg, &mut rng);
        for token in game.player("p2").unwrap().tokens.iter() {
            assert_eq!(report.beliefs[&token.id].max_probability(), 1.0);
        }
        assert_eq!(report.confidence, 1.0);
    }

    #[test]
    fn rushes_enemy_sovereign_with_a_strong_force() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        for (k, token) in game.player_mut("p1").unwrap().tokens.iter_mut().enumerate() {
            token.power = Some((k as u8) + 1);
        }
        for (k, token) in game.player_mut("p2").unwrap().tokens.iter_mut().enumerate() {
            token.power = Some((k as u8) + 1);
        }
        let sovereign_pos = game.player("p2").unwrap().sovereign().unwrap().position;
        let strong_token = game.player("p1").unwrap().tokens.iter().find(|t| t.power == Some(4)).unwrap().id.clone();
        game.find_token_mut(&strong_token).unwrap().position = sovereign_pos.neighbors()[0].neighbors()[0];

        let mut agent = OracleAgent;
        let mut rng = SmallRng::seed_from_u64(1);
        let (orders, _report) = agent.observe_and_plan("p1", &game, &cfg, &mut rng);
        let strong_order = orders.iter().find(|o| o.force == strong_token).unwrap();
        assert!(matches!(strong_order.order_type, crate::orders::OrderType::Charge | crate::orders::OrderType::Move));
    }
}
