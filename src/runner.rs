//! Batch evaluation harness: runs agent-vs-opponent games across seeds,
//! collects telemetry, and aggregates metrics with confidence intervals.

use std::collections::HashMap;

use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::agents::Agent;
use crate::config::{GameConfig, MAX_TURNS};
use crate::metrics::compute_game_metrics;
use crate::model::{initialize_game, Phase, TokenId};
use crate::probes::{generate_probes, score_comprehension, COMPREHENSION_THRESHOLD};
use crate::resolve::resolve;
use crate::telemetry::{ComprehensionResult, EventLogRecord, GameTelemetry, ProbeRecord};
use crate::upkeep::upkeep;
use crate::view::view_for;

/// Builds a fresh agent instance. A function pointer rather than a closure:
/// every baseline is zero-capture, and a fresh instance per game keeps
/// per-game mutable state (e.g. the perfect-memory agent's reveal log) from
/// leaking across games that share a factory.
pub type AgentFactory = fn() -> Box<dyn Agent>;

pub struct ExperimentConfig {
    pub agents: Vec<AgentFactory>,
    pub opponents: Vec<AgentFactory>,
    pub seeds: Vec<u64>,
    pub games_per_condition: usize,
    /// Probe every Nth turn; 0 disables comprehension probing entirely.
    pub comprehension_frequency: u32,
    pub game_config: GameConfig,
    /// Size of the dispatch thread pool under the `cli` feature. `None` sizes
    /// it to `num_cpus::get()`. Ignored without `cli`, where dispatch is
    /// sequential.
    pub worker_threads: Option<usize>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            agents: Vec::new(),
            opponents: Vec::new(),
            seeds: (0..30).collect(),
            games_per_condition: 30,
            comprehension_frequency: 3,
            game_config: GameConfig::default(),
            worker_threads: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub telemetry: GameTelemetry,
    pub metrics: HashMap<String, f64>,
    pub comprehension_scores: Vec<f64>,
    pub agent_name: String,
    pub opponent_name: String,
    pub seed: u64,
}

impl GameResult {
    /// A flat per-game summary, independent of the full telemetry, for
    /// lightweight aggregate reporting.
    pub fn to_summary(&self) -> serde_json::Value {
        let avg_comprehension = if self.comprehension_scores.is_empty() {
            0.0
        } else {
            self.comprehension_scores.iter().sum::<f64>() / self.comprehension_scores.len() as f64
        };
        serde_json::json!({
            "agent": self.agent_name,
            "opponent": self.opponent_name,
            "seed": self.seed,
            "winner": self.telemetry.winner,
            "victory_type": self.telemetry.victory_type,
            "turns": self.telemetry.turns,
            "metrics": self.metrics,
            "comprehension_scores": self.comprehension_scores,
            "avg_comprehension": avg_comprehension,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricStats {
    pub mean: f64,
    pub std: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExperimentReport {
    pub game_results: Vec<GameResult>,
    pub aggregate_metrics: HashMap<String, HashMap<String, MetricStats>>,
    pub comprehension_summary: HashMap<String, f64>,
}

/// Run one game to completion and return its telemetry and metrics.
pub fn run_single_game(
    agent_factory: AgentFactory,
    opponent_factory: AgentFactory,
    seed: u64,
    cfg: &GameConfig,
    comprehension_frequency: u32,
) -> anyhow::Result<GameResult> {
    let mut agent = agent_factory();
    let mut opponent = opponent_factory();
    let mut rng = SmallRng::seed_from_u64(seed);

    let game_id = format!("{}_vs_{}_seed{seed}", agent.name(), opponent.name());
    let mut game = initialize_game(cfg, game_id.clone(), seed);

    let p1_tokens: Vec<TokenId> = game.player("p1").unwrap().tokens.iter().map(|t| t.id.clone()).collect();
    let p2_tokens: Vec<TokenId> = game.player("p2").unwrap().tokens.iter().map(|t| t.id.clone()).collect();
    let p1_deploy = agent.deploy(&p1_tokens, &mut rng);
    let p2_deploy = opponent.deploy(&p2_tokens, &mut rng);
    crate::deploy::deploy(&mut game, "p1", &p1_deploy).context("p1 deployment")?;
    crate::deploy::deploy(&mut game, "p2", &p2_deploy).context("p2 deployment")?;

    let mut telemetry = GameTelemetry {
        game_id,
        p1_strategy: agent.name().to_string(),
        p2_strategy: opponent.name().to_string(),
        seed,
        agent_reports: Vec::new(),
        event_logs: Vec::new(),
        comprehension_results: Vec::new(),
        winner: None,
        victory_type: None,
        turns: 0,
    };
    let mut comprehension_scores: Vec<f64> = Vec::new();

    while game.phase == Phase::Plan && game.turn <= MAX_TURNS {
        if comprehension_frequency > 0 && game.turn % comprehension_frequency == 1 && agent.supports_comprehension() {
            if let Some(result) = run_comprehension_probes(agent.as_ref(), "p1", &game, cfg) {
                comprehension_scores.push(result.score);
                telemetry.comprehension_results.push(result);
            }
        }

        let (p1_orders, p1_report) = agent.observe_and_plan("p1", &game, cfg, &mut rng);
        let (p2_orders, p2_report) = opponent.observe_and_plan("p2", &game, cfg, &mut rng);
        telemetry.agent_reports.push(p1_report);
        telemetry.agent_reports.push(p2_report);

        let mut orders = HashMap::new();
        orders.insert("p1".to_string(), p1_orders);
        orders.insert("p2".to_string(), p2_orders);

        let turn_before = game.turn;
        let resolution = resolve(&mut game, orders, cfg, &mut rng).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        telemetry.event_logs.push(EventLogRecord { turn: turn_before, events: resolution.events.clone() });

        upkeep(&mut game, &resolution, cfg);
    }

    telemetry.winner = game.winner.clone();
    telemetry.victory_type = game.victory_type.map(|v| format!("{v:?}").to_lowercase());
    telemetry.turns = game.turn.min(MAX_TURNS);
    log::info!(
        "game {} terminated after {} turns, winner {:?}",
        telemetry.game_id,
        telemetry.turns,
        telemetry.winner
    );

    let mut ground_truth = HashMap::new();
    let mut revealed_powers = HashMap::new();
    for player in &game.players {
        for token in &player.tokens {
            if let Some(power) = token.power {
                ground_truth.insert(token.id.clone(), power);
                if token.revealed {
                    revealed_powers.insert(token.id.clone(), power);
                }
            }
        }
    }

    let mut metrics = compute_game_metrics(&telemetry, &ground_truth, Some(&revealed_powers));
    metrics.insert("p1_win".to_string(), if telemetry.winner.as_deref() == Some("p1") { 1.0 } else { 0.0 });
    metrics.insert("p2_win".to_string(), if telemetry.winner.as_deref() == Some("p2") { 1.0 } else { 0.0 });

    Ok(GameResult {
        telemetry,
        metrics,
        comprehension_scores,
        agent_name: agent.name().to_string(),
        opponent_name: opponent.name().to_string(),
        seed,
    })
}

fn run_comprehension_probes(
    agent: &dyn Agent,
    player_id: &str,
    state: &crate::model::GameState,
    cfg: &GameConfig,
) -> Option<ComprehensionResult> {
    let view = view_for(state, player_id, cfg);
    let probes = generate_probes(&view, state, player_id, cfg, 5);
    if probes.is_empty() {
        return None;
    }
    let responses = agent.answer_probes(&probes);
    if responses.is_empty() {
        return None;
    }
    let score = score_comprehension(&probes, &responses);
    let records = probes
        .iter()
        .zip(responses.iter())
        .map(|(probe, response)| ProbeRecord {
            question: probe.question.clone(),
            expected: probe.expected_answer.clone(),
            response: response.clone(),
            correct: probe.validate(response),
        })
        .collect();
    Some(ComprehensionResult { turn: state.turn, player_id: player_id.to_string(), probes: records, score })
}

/// Run every (agent, opponent, seed) condition and aggregate. Games are
/// independent once dispatched, so with the `cli` feature this fans out
/// across a `rayon` thread pool; without it, conditions run sequentially.
pub fn run_experiment(config: &ExperimentConfig) -> ExperimentReport {
    let mut triples = Vec::new();
    for (ai, &agent) in config.agents.iter().enumerate() {
        for (oi, &opponent) in config.opponents.iter().enumerate() {
            for &seed in config.seeds.iter().take(config.games_per_condition) {
                triples.push((ai, agent, oi, opponent, seed));
            }
        }
    }

    let results = dispatch(&triples, config);

    let mut report = ExperimentReport { game_results: results, ..Default::default() };
    report.aggregate_metrics = aggregate_metrics(&report.game_results);
    report.comprehension_summary = aggregate_comprehension(&report.game_results);
    report
}

#[cfg(feature = "cli")]
fn dispatch(
    triples: &[(usize, AgentFactory, usize, AgentFactory, u64)],
    config: &ExperimentConfig,
) -> Vec<GameResult> {
    use rayon::prelude::*;
    let worker_threads = config.worker_threads.unwrap_or_else(num_cpus::get);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_threads)
        .build()
        .expect("build dispatch thread pool");
    pool.install(|| {
        triples
            .par_iter()
            .filter_map(|&(_, agent, _, opponent, seed)| {
                match run_single_game(agent, opponent, seed, &config.game_config, config.comprehension_frequency) {
                    Ok(result) => Some(result),
                    Err(err) => {
                        log::warn!("worker panicked on seed {seed}: {err}");
                        None
                    }
                }
            })
            .collect()
    })
}

#[cfg(not(feature = "cli"))]
fn dispatch(
    triples: &[(usize, AgentFactory, usize, AgentFactory, u64)],
    config: &ExperimentConfig,
) -> Vec<GameResult> {
    triples
        .iter()
        .filter_map(|&(_, agent, _, opponent, seed)| {
            match run_single_game(agent, opponent, seed, &config.game_config, config.comprehension_frequency) {
                Ok(result) => Some(result),
                Err(err) => {
                    log::warn!("worker panicked on seed {seed}: {err}");
                    None
                }
            }
        })
        .collect()
}

fn aggregate_metrics(results: &[GameResult]) -> HashMap<String, HashMap<String, MetricStats>> {
    let mut by_agent: HashMap<&str, Vec<&HashMap<String, f64>>> = HashMap::new();
    for r in results {
        by_agent.entry(&r.agent_name).or_default().push(&r.metrics);
    }

    let mut aggregate = HashMap::new();
    for (agent_name, metrics_list) in by_agent {
        let mut all_keys: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for m in &metrics_list {
            all_keys.extend(m.keys().map(String::as_str));
        }

        let mut agent_agg = HashMap::new();
        for key in all_keys {
            let values: Vec<f64> = metrics_list.iter().filter_map(|m| m.get(key).copied()).collect();
            if values.is_empty() {
                continue;
            }
            let n = values.len();
            let mean = values.iter().sum::<f64>() / n as f64;
            let (std, ci_margin) = if n >= 2 {
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                let std = variance.sqrt();
                (std, 1.96 * std / (n as f64).sqrt())
            } else {
                (0.0, 0.0)
            };
            agent_agg.insert(key.to_string(), MetricStats { mean, std, ci_lower: mean - ci_margin, ci_upper: mean + ci_margin, n });
        }
        aggregate.insert(agent_name.to_string(), agent_agg);
    }
    aggregate
}

fn aggregate_comprehension(results: &[GameResult]) -> HashMap<String, f64> {
    let mut by_agent: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in results {
        if !r.comprehension_scores.is_empty() {
            by_agent.entry(&r.agent_name).or_default().extend(r.comprehension_scores.iter().copied());
        }
    }

    let mut summary = HashMap::new();
    for (agent_name, scores) in by_agent {
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        let pass_rate = scores.iter().filter(|&&s| s >= COMPREHENSION_THRESHOLD).count() as f64 / scores.len() as f64;
        summary.insert(format!("{agent_name}_avg_comprehension"), avg);
        summary.insert(format!("{agent_name}_comprehension_pass_rate"), pass_rate);
    }
    summary
}

/// Render a human-readable summary of an experiment report.
pub fn generate_report(report: &ExperimentReport) -> String {
    let mut lines = vec!["=".repeat(70), "  REASONING BENCHMARK REPORT".to_string(), "=".repeat(70), String::new()];

    lines.push("AGENT PERFORMANCE:".to_string());
    lines.push("-".repeat(70));
    for (agent_name, metrics) in &report.aggregate_metrics {
        lines.push(format!("\n  Agent: {agent_name}"));
        let mut keys: Vec<&String> = metrics.keys().filter(|k| k.starts_with("p1_")).collect();
        keys.sort();
        for key in keys {
            let stats = &metrics[key];
            let display_name = &key[3..];
            lines.push(format!(
                "    {display_name:<30} {:.4} +/- {:.4} [{:.4}, {:.4}] (n={})",
                stats.mean, stats.std, stats.ci_lower, stats.ci_upper, stats.n
            ));
        }
    }

    if !report.comprehension_summary.is_empty() {
        lines.push("\n\nCOMPREHENSION GATE:".to_string());
        lines.push("-".repeat(70));
        let mut keys: Vec<&String> = report.comprehension_summary.keys().collect();
        keys.sort();
        for key in keys {
            lines.push(format!("  {key}: {:.3}", report.comprehension_summary[key]));
        }
    }

    lines.push(format!("\n{}", "=".repeat(70)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::RandomAgent;

    fn random_factory() -> Box<dyn Agent> {
        Box::new(RandomAgent)
    }

    #[test]
    fn a_single_game_terminates_with_telemetry_for_every_turn() {
        let cfg = GameConfig::default();
        let result = run_single_game(random_factory, random_factory, 1, &cfg, 0).unwrap();
        assert!(result.telemetry.turns >= 1);
        assert!(!result.telemetry.agent_reports.is_empty());
        assert!(result.metrics.contains_key("p1_win"));
    }

    #[test]
    fn experiment_aggregates_across_seeds() {
        let mut cfg = ExperimentConfig::default();
        cfg.agents = vec![random_factory];
        cfg.opponents = vec![random_factory];
        cfg.seeds = vec![1, 2, 3];
        cfg.games_per_condition = 3;
        cfg.comprehension_frequency = 0;
        let report = run_experiment(&cfg);
        assert_eq!(report.game_results.len(), 3);
        let agent_stats = &report.aggregate_metrics["baseline_random"];
        assert_eq!(agent_stats["p1_win"].n, 3);
    }

    #[test]
    fn a_pinned_worker_count_still_covers_every_seed() {
        let mut cfg = ExperimentConfig::default();
        cfg.agents = vec![random_factory];
        cfg.opponents = vec![random_factory];
        cfg.seeds = vec![1, 2, 3, 4];
        cfg.games_per_condition = 4;
        cfg.comprehension_frequency = 0;
        cfg.worker_threads = Some(1);
        let report = run_experiment(&cfg);
        assert_eq!(report.game_results.len(), 4);
    }

    #[test]
    fn report_text_mentions_agent_name() {
        let mut cfg = ExperimentConfig::default();
        cfg.agents = vec![random_factory];
        cfg.opponents = vec![random_factory];
        cfg.seeds = vec![1];
        cfg.games_per_condition = 1;
        cfg.comprehension_frequency = 0;
        let report = run_experiment(&cfg);
        let text = generate_report(&report);
        assert!(text.contains("baseline_random"));
    }
}
