//! Per-turn telemetry records, serializable as newline-delimited JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::PlayerId;

/// Probability distribution over `{1..5}`, normalized by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefState {
    pub distribution: BTreeMap<u8, f64>,
}

impl BeliefState {
    pub fn uniform() -> Self {
        Self { distribution: (1..=5).map(|p| (p, 0.2)).collect() }
    }

    pub fn point_mass(power: u8) -> Self {
        let mut distribution = BTreeMap::new();
        for p in 1..=5 {
            distribution.insert(p, if p == power { 1.0 } else { 0.0 });
        }
        Self { distribution }
    }

    pub fn entropy(&self) -> f64 {
        self.distribution
            .values()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.log2())
            .sum()
    }

    pub fn max_probability(&self) -> f64 {
        self.distribution.values().cloned().fold(0.0, f64::max)
    }

    pub fn predicted_power(&self) -> u8 {
        self.distribution
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(p, _)| *p)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    pub turn: u32,
    pub player_id: PlayerId,
    pub strategy: String,
    pub beliefs: BTreeMap<String, BeliefState>,
    pub chosen_orders: Vec<String>,
    pub confidence: f64,
    pub raw_reasoning: String,
}

impl AgentReport {
    pub fn belief_entropy(&self) -> f64 {
        if self.beliefs.is_empty() {
            return 0.0;
        }
        self.beliefs.values().map(BeliefState::entropy).sum::<f64>() / self.beliefs.len() as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogRecord {
    pub turn: u32,
    pub events: Vec<crate::resolve::Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensionResult {
    pub turn: u32,
    pub player_id: PlayerId,
    pub probes: Vec<ProbeRecord>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub question: String,
    pub expected: String,
    pub response: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTelemetry {
    pub game_id: String,
    pub p1_strategy: String,
    pub p2_strategy: String,
    pub seed: u64,
    pub agent_reports: Vec<AgentReport>,
    pub event_logs: Vec<EventLogRecord>,
    pub comprehension_results: Vec<ComprehensionResult>,
    pub winner: Option<PlayerId>,
    pub victory_type: Option<String>,
    pub turns: u32,
}

impl GameTelemetry {
    pub fn reports_for_player(&self, player_id: &str) -> Vec<&AgentReport> {
        self.agent_reports.iter().filter(|r| r.player_id == player_id).collect()
    }

    /// Newline-delimited JSON: one `game_header`, then one `agent_report` per
    /// report, then one `event_log` per turn, then `comprehension_result`s.
    pub fn to_jsonl(&self) -> anyhow::Result<String> {
        let mut lines = Vec::new();

        let header = serde_json::json!({
            "type": "game_header",
            "game_id": self.game_id,
            "p1_strategy": self.p1_strategy,
            "p2_strategy": self.p2_strategy,
            "seed": self.seed,
            "winner": self.winner,
            "victory_type": self.victory_type,
            "turns": self.turns,
        });
        lines.push(serde_json::to_string(&header)?);

        for report in &self.agent_reports {
            let mut value = serde_json::to_value(report)?;
            value.as_object_mut().unwrap().insert("type".to_string(), serde_json::json!("agent_report"));
            lines.push(serde_json::to_string(&value)?);
        }
        for log in &self.event_logs {
            let mut value = serde_json::to_value(log)?;
            value.as_object_mut().unwrap().insert("type".to_string(), serde_json::json!("event_log"));
            lines.push(serde_json::to_string(&value)?);
        }
        for result in &self.comprehension_results {
            let mut value = serde_json::to_value(result)?;
            value.as_object_mut().unwrap().insert("type".to_string(), serde_json::json!("comprehension_result"));
            lines.push(serde_json::to_string(&value)?);
        }

        Ok(lines.join("\n"))
    }

    pub fn write_jsonl(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use std::io::Write;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{}", self.to_jsonl()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_belief_has_max_entropy_over_five_outcomes() {
        let belief = BeliefState::uniform();
        let expected = -5.0 * 0.2 * 0.2_f64.log2();
        assert!((belief.entropy() - expected).abs() < 1e-9);
    }

    #[test]
    fn point_mass_has_zero_entropy() {
        let belief = BeliefState::point_mass(3);
        assert!(belief.entropy().abs() < 1e-9);
        assert_eq!(belief.predicted_power(), 3);
    }

    #[test]
    fn game_telemetry_serializes_as_one_json_object_per_line() {
        let telemetry = GameTelemetry {
            game_id: "g1".to_string(),
            p1_strategy: "random".to_string(),
            p2_strategy: "oracle".to_string(),
            seed: 1,
            agent_reports: Vec::new(),
            event_logs: Vec::new(),
            comprehension_results: Vec::new(),
            winner: None,
            victory_type: None,
            turns: 0,
        };
        let jsonl = telemetry.to_jsonl().unwrap();
        assert_eq!(jsonl.lines().count(), 1);
    }
}
