//! Format C: single-character grid plus legend and force listing.

use std::collections::HashMap;

use crate::config::GameConfig;
use crate::map::HexCoord;
use crate::resolve::Event;
use crate::view::View;

pub fn render(view: &View, cfg: &GameConfig, events: &[Event]) -> String {
    let mut parts = Vec::new();

    let history = super::render_history(events, Some(10));
    if !history.is_empty() {
        parts.push(history);
        parts.push(String::new());
    }

    parts.push(format!(
        "Turn {} | Shih: {} (enemy: {}) | Shrink: {}",
        view.turn, view.own_shih, view.opponent_shih, view.shrink_stage
    ));
    parts.push(format!(
        "Domination: You {}/{}, Enemy {}/{}",
        view.own_domination_streak, cfg.domination_turns_required, view.opponent_domination_streak, cfg.domination_turns_required
    ));

    let mut display: HashMap<HexCoord, String> = HashMap::new();
    for hex in &view.cells {
        display.insert(hex.coord, hex.terrain.as_char().to_string());
    }
    for f in &view.own_forces {
        display.insert(f.position, f.power.to_string());
    }
    for e in &view.visible_enemies {
        let mark = e.power.map(|p| p.to_string()).unwrap_or_else(|| "e".to_string());
        display.insert(e.position, mark);
    }

    parts.push(String::new());
    let size = cfg.board_size;
    parts.push(format!("    q: {}", (0..size).map(|q| q.to_string()).collect::<Vec<_>>().join("  ")));
    parts.push(format!("  r  {}", "-".repeat((size * 3) as usize)));
    for r in 0..size {
        let offset = if r % 2 == 0 { "  " } else { " " };
        let row: Vec<String> = (0..size)
            .map(|q| display.get(&HexCoord::new(q, r)).cloned().unwrap_or_else(|| " ".to_string()))
            .collect();
        parts.push(format!("  {r} {offset}{}", row.join("  ")));
    }
    parts.push(String::new());
    parts.push("Legend: . Open  # Difficult  * Contentious  X Scorched".to_string());
    parts.push("        1-5 = your force power  e = enemy (unknown power)".to_string());

    parts.push("\nYour forces:".to_string());
    for f in &view.own_forces {
        let sov = if f.power == 1 { " [SOVEREIGN]" } else { "" };
        let supply = if f.has_supply { "[supplied]" } else { "[NO SUPPLY]" };
        parts.push(format!("  {} pow={} pos=({},{}) {}{}", f.id, f.power, f.position.q, f.position.r, supply, sov));
    }
    if !view.visible_enemies.is_empty() {
        parts.push("Visible enemies:".to_string());
        for e in &view.visible_enemies {
            let power_str = e.power.map(|p| format!("pow={p}")).unwrap_or_else(|| "pow=?".to_string());
            parts.push(format!("  {} {} pos=({},{}) ({:?})", e.id, power_str, e.position.q, e.position.r, e.source));
        }
    }

    parts.join("\n")
}
