//! Format A: short declarative sentences.

use crate::config::GameConfig;
use crate::map::Terrain;
use crate::resolve::Event;
use crate::view::View;

pub fn render(view: &View, _cfg: &GameConfig, events: &[Event]) -> String {
    let mut parts = Vec::new();

    let history = super::render_history(events, Some(10));
    if !history.is_empty() {
        parts.push(history);
        parts.push(String::new());
    }

    parts.push(format!(
        "It is turn {}. You have {} Shih. The enemy has {} Shih.",
        view.turn, view.own_shih, view.opponent_shih
    ));
    parts.push(format!(
        "Domination progress: you have {}, enemy has {} consecutive turns.",
        view.own_domination_streak, view.opponent_domination_streak
    ));
    if view.shrink_stage > 0 {
        parts.push(format!("The Noose has shrunk {} time(s).", view.shrink_stage));
    }

    parts.push(format!("\nYou have {} force(s) alive:", view.own_forces.len()));
    for f in &view.own_forces {
        let sov = if f.power == 1 { " (your Sovereign)" } else { "" };
        let supply = if f.has_supply { "has supply" } else { "NO SUPPLY" };
        let fortified = if f.fortified { ", fortified" } else { "" };
        parts.push(format!(
            "  {} at position ({},{}), power {}{}, {}{}.",
            f.id, f.position.q, f.position.r, f.power, sov, supply, fortified
        ));
    }

    if view.visible_enemies.is_empty() {
        parts.push("\nNo enemy forces are currently visible.".to_string());
    } else {
        parts.push(format!("\nYou can see {} enemy force(s):", view.visible_enemies.len()));
        for e in &view.visible_enemies {
            let line = match (e.power, &e.power_band) {
                (Some(p), _) => format!("  {} at ({},{}), power {} ({:?}).", e.id, e.position.q, e.position.r, p, e.source),
                (None, Some(band)) => format!("  {} at ({},{}), power in {:?}.", e.id, e.position.q, e.position.r, band),
                (None, None) => format!("  {} at ({},{}), power unknown.", e.id, e.position.q, e.position.r),
            };
            parts.push(line);
        }
    }

    let contentious: Vec<String> = view
        .cells
        .iter()
        .filter(|h| h.terrain == Terrain::Contentious)
        .map(|h| format!("({},{})", h.coord.q, h.coord.r))
        .collect();
    parts.push(format!("\nContentious hexes (objectives): [{}]", contentious.join(", ")));

    let scorched: Vec<String> = view
        .cells
        .iter()
        .filter(|h| h.terrain == Terrain::Scorched)
        .map(|h| format!("({},{})", h.coord.q, h.coord.r))
        .collect();
    if !scorched.is_empty() {
        parts.push(format!("Scorched hexes (impassable): [{}]", scorched.join(", ")));
    }

    parts.join("\n")
}
