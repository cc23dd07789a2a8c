//! Format B: fixed-width tables.

use crate::config::GameConfig;
use crate::map::Terrain;
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
        "TURN {} | Your Shih: {} | Enemy Shih: {} | Domination: You {}/{}, Enemy {}/{} | Shrink stage: {}",
        view.turn,
        view.own_shih,
        view.opponent_shih,
        view.own_domination_streak,
        cfg.domination_turns_required,
        view.opponent_domination_streak,
        cfg.domination_turns_required,
        view.shrink_stage,
    ));

    parts.push("\nYOUR FORCES:".to_string());
    parts.push(format!("{:<10} {:<10} {:<7} {:<8} {}", "ID", "Pos", "Power", "Supply", "Status"));
    parts.push("-".repeat(50));
    for f in &view.own_forces {
        let mut status = Vec::new();
        if f.power == 1 {
            status.push("Sovereign");
        }
        if f.fortified {
            status.push("Fortified");
        }
        let status = if status.is_empty() { "-".to_string() } else { status.join(", ") };
        let supply = if f.has_supply { "Yes" } else { "NO" };
        let pos = format!("({},{})", f.position.q, f.position.r);
        parts.push(format!("{:<10} {:<10} {:<7} {:<8} {}", f.id, pos, f.power, supply, status));
    }

    parts.push("\nVISIBLE ENEMIES:".to_string());
    if view.visible_enemies.is_empty() {
        parts.push("  (none visible)".to_string());
    } else {
        parts.push(format!("{:<10} {:<10} {:<9} {}", "ID", "Pos", "Power", "Source"));
        parts.push("-".repeat(40));
        for e in &view.visible_enemies {
            let power_str = match (e.power, &e.power_band) {
                (Some(p), _) => p.to_string(),
                (None, Some(band)) => format!("{band:?}"),
                (None, None) => "Unknown".to_string(),
            };
            let pos = format!("({},{})", e.position.q, e.position.r);
            parts.push(format!("{:<10} {:<10} {:<9} {:?}", e.id, pos, power_str, e.source));
        }
    }

    let contentious: Vec<String> = view
        .cells
        .iter()
        .filter(|h| h.terrain == Terrain::Contentious)
        .map(|h| format!("({},{})", h.coord.q, h.coord.r))
        .collect();
    parts.push(format!("\nCONTENTIOUS HEXES: [{}]", contentious.join(", ")));

    parts.join("\n")
}
