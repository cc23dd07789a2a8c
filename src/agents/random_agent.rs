//! Uniform beliefs, uniformly random legal Move orders. The measurement floor:
//! an agent scoring near this level is not reasoning at all.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::{build_report, Agent};
use crate::config::GameConfig;
use crate::model::{GameState, TokenId};
use crate::orders::Order;
use crate::telemetry::{AgentReport, BeliefState};

#[derive(Debug, Default)]
pub struct RandomAgent;

impl Agent for RandomAgent {
    fn name(&self) -> &'static str {
        "baseline_random"
    }

    fn deploy(&mut self, tokens: &[TokenId], rng: &mut SmallRng) -> BTreeMap<TokenId, u8> {
        let mut powers = [1u8, 2, 3, 4, 5];
        powers.shuffle(rng);
        tokens.iter().cloned().zip(powers).collect()
    }

    fn observe_and_plan(
        &mut self,
        player_id: &str,
        state: &GameState,
        _cfg: &GameConfig,
        rng: &mut SmallRng,
    ) -> (Vec<Order>, AgentReport) {
        let player = state.player(player_id).expect("player must exist");
        let opponent = state.opponent_of(player_id);

        let beliefs: BTreeMap<String, BeliefState> =
            opponent.alive_tokens().map(|t| (t.id.clone(), BeliefState::uniform())).collect();

        let mut orders = Vec::new();
        for token in player.alive_tokens() {
            let valid: Vec<_> = token
                .position
                .neighbors()
                .into_iter()
                .filter(|n| state.board.in_bounds(*n))
                .filter(|n| state.token_at(*n).map(|t| t.owner != token.owner).unwrap_or(true))
                .collect();
            if let Some(&dest) = valid.choose(rng) {
                orders.push(Order::mv(token.id.clone(), dest));
            }
        }

        let report = build_report(state.turn, player_id, self.name(), beliefs, &orders, 0.5);
        (orders, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::initialize_game;
    use rand::SeedableRng;

    #[test]
    fn deploy_is_a_permutation_of_one_through_five() {
        let mut agent = RandomAgent;
        let mut rng = SmallRng::seed_from_u64(3);
        let tokens: Vec<TokenId> = (1..=5).map(|k| format!("p1_f{k}")).collect();
        let assignment = agent.deploy(&tokens, &mut rng);
        let mut powers: Vec<u8> = assignment.values().copied().collect();
        powers.sort_unstable();
        assert_eq!(powers, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn plans_one_move_order_per_living_token_at_spawn() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let mut agent = RandomAgent;
        let mut rng = SmallRng::seed_from_u64(3);
        let (orders, _report) = agent.observe_and_plan("p1", &game, &cfg, &mut rng);
        assert_eq!(orders.len(), cfg.force_count);
    }
}
