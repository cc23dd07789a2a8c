//! Prompt integrity verification: a harness-side correctness check, not an
//! engine guarantee. A flagged prompt is disqualified from metric aggregation.

use crate::model::GameState;
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Leak(String),
    Omission(String),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Leak(msg) => write!(f, "LEAK: {msg}"),
            Violation::Omission(msg) => write!(f, "OMISSION: {msg}"),
        }
    }
}

/// Check `rendered` against the `view` it was produced from and the full state.
/// Empty result means clean.
pub fn verify(rendered: &str, view: &View, state: &GameState, viewer_id: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    let opponent = state.opponent_of(viewer_id);
    let visible_ids: std::collections::HashSet<&str> =
        view.visible_enemies.iter().map(|e| e.id.as_str()).collect();

    for enemy in opponent.alive_tokens() {
        if !visible_ids.contains(enemy.id.as_str()) && rendered.contains(&enemy.id) {
            violations.push(Violation::Leak(format!(
                "opponent force {} is not visible but appears in the rendered text",
                enemy.id
            )));
        }
    }

    for enemy in opponent.alive_tokens() {
        let known = state.player(viewer_id).map(|p| p.known_enemy_powers.contains_key(&enemy.id)).unwrap_or(false);
        if enemy.revealed || known {
            continue;
        }
        let Some(power) = enemy.power else { continue };
        if !rendered.contains(&enemy.id) {
            continue;
        }
        for idx in find_all(rendered, &enemy.id) {
            let start = idx.saturating_sub(30);
            let end = (idx + enemy.id.len() + 50).min(rendered.len());
            let context = &rendered[start..end];
            let power_str = power.to_string();
            let patterns = [
                format!("power {power_str}"),
                format!("power={power_str}"),
                format!("pow={power_str}"),
                format!("pow {power_str}"),
                format!("\"power\": {power_str}"),
            ];
            if patterns.iter().any(|p| context.contains(p.as_str())) {
                violations.push(Violation::Leak(format!(
                    "hidden power {power} for unrevealed force {} appears near its id",
                    enemy.id
                )));
                break;
            }
        }
    }

    let viewer = state.player(viewer_id).expect("viewer must exist");
    for own in viewer.alive_tokens() {
        if !rendered.contains(&own.id) {
            violations.push(Violation::Omission(format!("own force {} not found in rendered text", own.id)));
        }
    }

    let turn = state.turn.to_string();
    let turn_patterns = [
        format!("turn {turn}"),
        format!("Turn {turn}"),
        format!("TURN {turn}"),
        format!("\"turn\": {turn}"),
        format!("\"turn\":{turn}"),
    ];
    if !turn_patterns.iter().any(|p| rendered.contains(p.as_str())) {
        violations.push(Violation::Omission(format!("turn number {turn} not found in rendered text")));
    }

    violations
}

/// Check the `View` object itself, before any rendering happens: every visible
/// enemy must be a real token within `visibility_range` of some own living
/// force and not under ambush, and every own living token must appear with a
/// deployed power. Complements `verify`, which only catches leaks that made it
/// into rendered text.
pub fn verify_view(view: &View, state: &GameState, cfg: &crate::config::GameConfig, viewer_id: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    let viewer = state.player(viewer_id).expect("viewer must exist");
    let viewer_positions: Vec<_> = viewer.alive_tokens().map(|t| t.position).collect();

    for enemy in &view.visible_enemies {
        let Some(token) = state.find_token(&enemy.id) else {
            violations.push(Violation::Leak(format!(
                "visible enemy {} does not correspond to any token in state",
                enemy.id
            )));
            continue;
        };
        if token.ambushing {
            violations.push(Violation::Leak(format!(
                "visible enemy {} is under ambush and must not appear in the view",
                enemy.id
            )));
        }
        let within_range = viewer_positions.iter().any(|&p| p.distance(token.position) <= cfg.visibility_range);
        if !within_range {
            violations.push(Violation::Leak(format!(
                "visible enemy {} is outside visibility_range of every own force",
                enemy.id
            )));
        }
    }

    for own in viewer.alive_tokens() {
        match view.own_forces.iter().find(|f| f.id == own.id) {
            None => violations.push(Violation::Omission(format!("own living force {} missing from view", own.id))),
            Some(_) if own.power.is_none() => {
                violations.push(Violation::Omission(format!("own living force {} has no deployed power", own.id)))
            }
            Some(_) => {}
        }
    }

    violations
}

fn find_all(haystack: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut start = 0;
    while let Some(idx) = haystack[start..].find(needle) {
        positions.push(start + idx);
        start += idx + needle.len();
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::model::initialize_game;
    use crate::render::{render, Format};

    #[test]
    fn rendered_fresh_deployment_view_is_clean_in_every_format() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        for player_id in ["p1", "p2"] {
            let assignment: std::collections::BTreeMap<_, _> = game
                .player(player_id)
                .unwrap()
                .tokens
                .iter()
                .zip([1u8, 2, 3, 4, 5])
                .map(|(t, p)| (t.id.clone(), p))
                .collect();
            crate::deploy::deploy(&mut game, player_id, &assignment).unwrap();
        }
        let view = crate::view::view_for(&game, "p1", &cfg);
        for format in Format::ALL {
            let text = render(&view, &cfg, format, &[]);
            let violations = verify(&text, &view, &game, "p1");
            assert!(violations.is_empty(), "{:?}: {:?}", format, violations);
        }
    }

    #[test]
    fn view_of_a_fresh_deployment_has_no_structured_violations() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        for player_id in ["p1", "p2"] {
            let assignment: std::collections::BTreeMap<_, _> = game
                .player(player_id)
                .unwrap()
                .tokens
                .iter()
                .zip([1u8, 2, 3, 4, 5])
                .map(|(t, p)| (t.id.clone(), p))
                .collect();
            crate::deploy::deploy(&mut game, player_id, &assignment).unwrap();
        }
        let view = crate::view::view_for(&game, "p1", &cfg);
        assert!(verify_view(&view, &game, &cfg, "p1").is_empty());
    }

    #[test]
    fn own_force_missing_its_power_is_an_omission() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        for player_id in ["p1", "p2"] {
            let assignment: std::collections::BTreeMap<_, _> = game
                .player(player_id)
                .unwrap()
                .tokens
                .iter()
                .zip([1u8, 2, 3, 4, 5])
                .map(|(t, p)| (t.id.clone(), p))
                .collect();
            crate::deploy::deploy(&mut game, player_id, &assignment).unwrap();
        }
        let token_id = game.player("p1").unwrap().tokens[0].id.clone();
        game.find_token_mut(&token_id).unwrap().power = None;
        let view = crate::view::view_for(&game, "p1", &cfg);
        let violations = verify_view(&view, &game, &cfg, "p1");
        assert!(violations.iter().any(|v| matches!(v, Violation::Omission(_))));
    }

    #[test]
    fn hidden_enemy_id_leaking_into_text_is_flagged() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let view = crate::view::view_for(&game, "p1", &cfg);
        let leaking_text = format!("turn {} and also p2_f1 is here", game.turn);
        let violations = verify(&leaking_text, &view, &game, "p1");
        assert!(violations.iter().any(|v| matches!(v, Violation::Leak(_))));
    }
}
