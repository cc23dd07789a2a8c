//! The four-rung baseline agent ladder: random, single-turn rational,
//! perfect-memory Bayesian, oracle. Each establishes a calibration point on the
//! reasoning-quality scale a real agent (including a language model) is measured
//! against.

mod bayesian;
mod oracle;
mod random_agent;
mod rational;

pub use bayesian::PerfectMemoryAgent;
pub use oracle::OracleAgent;
pub use random_agent::RandomAgent;
pub use rational::SingleTurnRationalAgent;

use std::collections::BTreeMap;

use rand::rngs::SmallRng;

use crate::config::GameConfig;
use crate::model::{GameState, TokenId};
use crate::orders::Order;
use crate::telemetry::AgentReport;

/// A capability: given a player id, state, and RNG, decide a deployment once and
/// produce (orders, report) every subsequent turn. Real language-model agents
/// implement the same shape but do not consume the engine RNG.
pub trait Agent: Send {
    fn name(&self) -> &'static str;

    fn deploy(&mut self, tokens: &[TokenId], rng: &mut SmallRng) -> BTreeMap<TokenId, u8>;

    fn observe_and_plan(
        &mut self,
        player_id: &str,
        state: &GameState,
        cfg: &GameConfig,
        rng: &mut SmallRng,
    ) -> (Vec<Order>, AgentReport);

    /// Whether this agent can answer comprehension probes (§4.8). Baselines
    /// reason over orders only and never override this; a provider-backed
    /// agent would.
    fn supports_comprehension(&self) -> bool {
        false
    }

    fn answer_probes(&self, _probes: &[crate::probes::Probe]) -> Vec<String> {
        Vec::new()
    }
}

/// Deployment shared by every non-Random baseline: sovereign shielded in the
/// middle of the marching order, strongest forces forward.
pub(crate) const FIXED_DEPLOYMENT: [u8; 5] = [5, 4, 1, 3, 2];

pub(crate) fn order_to_string(order: &Order) -> String {
    match order.order_type {
        crate::orders::OrderType::Scout => {
            format!("Scout {} -> {}", order.force, order.scout_target.as_deref().unwrap_or("?"))
        }
        _ if order.target_hex.is_some() => {
            let t = order.target_hex.unwrap();
            format!("{} {} ({},{})", order.order_type, order.force, t.q, t.r)
        }
        _ => format!("{} {}", order.order_type, order.force),
    }
}

/// The in-bounds neighbor of `from` that minimizes distance to `target`, ties
/// broken by coordinate order so marching is deterministic.
pub(crate) fn step_toward(
    state: &GameState,
    from: crate::map::HexCoord,
    target: crate::map::HexCoord,
) -> Option<crate::map::HexCoord> {
    if from == target {
        return None;
    }
    let mut neighbors: Vec<_> = from.neighbors().into_iter().filter(|n| state.board.in_bounds(*n)).collect();
    neighbors.sort();
    neighbors.into_iter().min_by_key(|n| n.distance(target))
}

pub(crate) fn build_report(
    turn: u32,
    player_id: &str,
    strategy: &str,
    beliefs: BTreeMap<String, crate::telemetry::BeliefState>,
    orders: &[Order],
    confidence: f64,
) -> AgentReport {
    AgentReport {
        turn,
        player_id: player_id.to_string(),
        strategy: strategy.to_string(),
        beliefs,
        chosen_orders: orders.iter().map(order_to_string).collect(),
        confidence,
        raw_reasoning: String::new(),
    }
}
