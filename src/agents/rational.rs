//! Single-turn rational baseline: beliefs and orders derived only from the
//! current turn's fog-filtered view, no memory of past turns.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;

use super::{build_report, step_toward, Agent, FIXED_DEPLOYMENT};
use crate::config::GameConfig;
use crate::model::{GameState, TokenId};
use crate::orders::Order;
use crate::telemetry::{AgentReport, BeliefState};
use crate::view::{view_for, PowerSource};

#[derive(Debug, Default)]
pub struct SingleTurnRationalAgent;

fn belief_for(power: Option<u8>, band: Option<&[u8]>) -> BeliefState {
    if let Some(p) = power {
        return BeliefState::point_mass(p);
    }
    if let Some(band) = band {
        let share = 1.0 / band.len() as f64;
        let mut distribution = BTreeMap::new();
        for p in 1..=5u8 {
            distribution.insert(p, if band.contains(&p) { share } else { 0.0 });
        }
        return BeliefState { distribution };
    }
    BeliefState::uniform()
}

impl Agent for SingleTurnRationalAgent {
    fn name(&self) -> &'static str {
        "baseline_rational"
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

        let beliefs: BTreeMap<String, BeliefState> = view
            .visible_enemies
            .iter()
            .map(|e| {
                let power = matches!(e.source, PowerSource::Combat | PowerSource::Scouted).then_some(e.power).flatten();
                (e.id.clone(), belief_for(power, e.power_band.as_deref()))
            })
            .collect();

        let mut orders = Vec::new();
        for token in player.alive_tokens() {
            if token.is_sovereign() {
                let threatened = view
                    .visible_enemies
                    .iter()
                    .any(|e| e.position.distance(token.position) <= 1);
                if threatened {
                    if !crate::orders::has_supply(state, &token.id, cfg) || player.shih < cfg.fortify_cost {
                        continue;
                    }
                    orders.push(Order::fortify(token.id.clone()));
                    continue;
                }
            }
            if let Some(dest) = step_toward(state, token.position, center) {
                orders.push(Order::mv(token.id.clone(), dest));
            }
        }

        let report = build_report(state.turn, player_id, self.name(), beliefs, &orders, 0.6);
        (orders, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::initialize_game;
    use rand::SeedableRng;

    #[test]
    fn deploy_uses_fixed_assignment() {
        let mut agent = SingleTurnRationalAgent;
        let mut rng = SmallRng::seed_from_u64(1);
        let tokens: Vec<TokenId> = (1..=5).map(|k| format!("p1_f{k}")).collect();
        let assignment = agent.deploy(&tokens, &mut rng);
        let powers: Vec<u8> = tokens.iter().map(|t| assignment[t]).collect();
        assert_eq!(powers, FIXED_DEPLOYMENT);
    }

    #[test]
    fn marches_toward_center_when_unthreatened() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let mut agent = SingleTurnRationalAgent;
        let mut rng = SmallRng::seed_from_u64(1);
        let (orders, _report) = agent.observe_and_plan("p1", &game, &cfg, &mut rng);
        assert_eq!(orders.len(), cfg.force_count);
        let center = game.board.center();
        for order in &orders {
            let token = game.find_token(&order.force).unwrap();
            let dest = order.target_hex.unwrap();
            assert!(dest.distance(center) < token.position.distance(center));
        }
    }
}
