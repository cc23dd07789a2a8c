//! Comprehension probe generation and scoring.

use crate::config::GameConfig;
use crate::map::Terrain;
use crate::model::GameState;
use crate::view::View;

pub const COMPREHENSION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Factual,
    Visibility,
    Terrain,
    Knowledge,
    Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Basic,
    Derived,
}

#[derive(Debug, Clone)]
pub struct Probe {
    pub question: String,
    pub expected_answer: String,
    pub category: Category,
    pub difficulty: Difficulty,
}

impl Probe {
    /// Flexible match: exact substring, numeric-subset, yes/no synonyms, or
    /// comma-separated list containment.
    pub fn validate(&self, response: &str) -> bool {
        let response_lower = response.to_lowercase();
        let expected_lower = self.expected_answer.to_lowercase();
        let response_lower = response_lower.trim();
        let expected_lower = expected_lower.trim();

        if response_lower.contains(expected_lower) {
            return true;
        }

        let response_nums = extract_numbers(response_lower);
        let expected_nums = extract_numbers(expected_lower);
        if !expected_nums.is_empty() && expected_nums.iter().all(|n| response_nums.contains(n)) {
            return true;
        }

        if expected_lower == "yes" || expected_lower == "no" {
            let yes_words = ["yes", "true", "correct", "it can", "has supply", "can use"];
            let no_words = ["no", "false", "incorrect", "cannot", "can't", "it cannot", "does not have supply", "no supply"];
            let words = if expected_lower == "yes" { &yes_words[..] } else { &no_words[..] };
            return words.iter().any(|w| response_lower.contains(w));
        }

        if expected_lower.contains(',') {
            return expected_lower.split(',').map(str::trim).all(|item| response_lower.contains(item));
        }

        false
    }
}

fn extract_numbers(s: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            numbers.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        numbers.push(current);
    }
    numbers
}

fn factual_probes(view: &View) -> Vec<Probe> {
    vec![
        Probe {
            question: "How many of your forces are currently alive?".to_string(),
            expected_answer: view.own_forces.len().to_string(),
            category: Category::Factual,
            difficulty: Difficulty::Basic,
        },
        Probe {
            question: "How much Shih do you currently have?".to_string(),
            expected_answer: view.own_shih.to_string(),
            category: Category::Factual,
            difficulty: Difficulty::Basic,
        },
        Probe {
            question: "What is the current turn number?".to_string(),
            expected_answer: view.turn.to_string(),
            category: Category::Factual,
            difficulty: Difficulty::Basic,
        },
    ]
}

fn visibility_probes(view: &View) -> Vec<Probe> {
    let mut probes = vec![Probe {
        question: "How many enemy forces can you currently see?".to_string(),
        expected_answer: view.visible_enemies.len().to_string(),
        category: Category::Visibility,
        difficulty: Difficulty::Basic,
    }];
    if !view.visible_enemies.is_empty() {
        let ids: Vec<&str> = view.visible_enemies.iter().map(|e| e.id.as_str()).collect();
        probes.push(Probe {
            question: "List the IDs of all visible enemy forces.".to_string(),
            expected_answer: ids.join(", "),
            category: Category::Visibility,
            difficulty: Difficulty::Basic,
        });
    }
    probes
}

fn terrain_probes(view: &View) -> Vec<Probe> {
    let mut probes = Vec::new();
    if let Some(hex) = view.cells.iter().find(|h| h.terrain == Terrain::Contentious) {
        probes.push(Probe {
            question: format!("What type of terrain is at position ({},{})?", hex.coord.q, hex.coord.r),
            expected_answer: "Contentious".to_string(),
            category: Category::Terrain,
            difficulty: Difficulty::Basic,
        });
    }
    if let Some(hex) = view.cells.iter().find(|h| h.terrain == Terrain::Difficult) {
        probes.push(Probe {
            question: format!("What type of terrain is at position ({},{})?", hex.coord.q, hex.coord.r),
            expected_answer: "Difficult".to_string(),
            category: Category::Terrain,
            difficulty: Difficulty::Basic,
        });
    }
    probes
}

fn knowledge_probes(view: &View) -> Vec<Probe> {
    let mut probes = Vec::new();
    if let Some(enemy) = view.visible_enemies.iter().find(|e| e.power.is_some() && e.power_band.is_none()) {
        probes.push(Probe {
            question: format!("What do you know about {}'s power level?", enemy.id),
            expected_answer: enemy.power.unwrap().to_string(),
            category: Category::Knowledge,
            difficulty: Difficulty::Basic,
        });
    }
    let unknown: Vec<&str> = view
        .visible_enemies
        .iter()
        .filter(|e| e.power.is_none() && e.power_band.is_none())
        .map(|e| e.id.as_str())
        .collect();
    if !unknown.is_empty() {
        probes.push(Probe {
            question: "Which visible enemy forces have completely unknown power?".to_string(),
            expected_answer: unknown.join(", "),
            category: Category::Knowledge,
            difficulty: Difficulty::Derived,
        });
    }
    probes
}

fn rule_probes(state: &GameState, player_id: &str, cfg: &GameConfig) -> Vec<Probe> {
    let Some(player) = state.player(player_id) else { return Vec::new() };
    let Some(force) = player.alive_tokens().next() else { return Vec::new() };
    let supplied = crate::orders::has_supply(state, &force.id, cfg);
    let answer = if supplied && player.shih >= cfg.scout_cost { "Yes" } else { "No" };
    vec![Probe {
        question: format!("Can your force {} use Scout this turn?", force.id),
        expected_answer: answer.to_string(),
        category: Category::Rule,
        difficulty: Difficulty::Derived,
    }]
}

/// Deterministically select up to `n_probes`, prioritizing category diversity.
pub fn generate_probes(view: &View, state: &GameState, player_id: &str, cfg: &GameConfig, n_probes: usize) -> Vec<Probe> {
    let mut all = Vec::new();
    all.extend(factual_probes(view));
    all.extend(visibility_probes(view));
    all.extend(terrain_probes(view));
    all.extend(knowledge_probes(view));
    all.extend(rule_probes(state, player_id, cfg));

    let mut selected: Vec<Probe> = Vec::new();
    let mut seen_categories = std::collections::HashSet::new();
    for probe in &all {
        if selected.len() >= n_probes {
            break;
        }
        if seen_categories.insert(format!("{:?}", probe.category)) {
            selected.push(probe.clone());
        }
    }
    for probe in &all {
        if selected.len() >= n_probes {
            break;
        }
        if !selected.iter().any(|p| p.question == probe.question) {
            selected.push(probe.clone());
        }
    }
    selected.truncate(n_probes);
    selected
}

pub fn score_comprehension(probes: &[Probe], responses: &[String]) -> f64 {
    if probes.is_empty() || responses.is_empty() {
        return 0.0;
    }
    let correct = probes.iter().zip(responses).filter(|(p, r)| p.validate(r)).count();
    correct as f64 / probes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::initialize_game;

    #[test]
    fn numeric_validation_accepts_extra_words() {
        let probe = Probe {
            question: "q".to_string(),
            expected_answer: "3".to_string(),
            category: Category::Factual,
            difficulty: Difficulty::Basic,
        };
        assert!(probe.validate("I have 3 forces left"));
        assert!(!probe.validate("I have 4 forces left"));
    }

    #[test]
    fn yes_no_accepts_synonyms() {
        let probe = Probe {
            question: "q".to_string(),
            expected_answer: "Yes".to_string(),
            category: Category::Rule,
            difficulty: Difficulty::Derived,
        };
        assert!(probe.validate("it can, yes"));
        assert!(probe.validate("Correct"));
    }

    #[test]
    fn generate_probes_covers_categories_before_repeating() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let view = crate::view::view_for(&game, "p1", &cfg);
        let probes = generate_probes(&view, &game, "p1", &cfg, 5);
        assert!(!probes.is_empty());
        assert!(probes.len() <= 5);
    }
}
