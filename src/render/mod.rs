//! Four deterministic textual projections of a [`crate::view::View`], plus a
//! configuration-parameterized rules reference and a recent-history block shared
//! by all four.
//!
//! All four renderers carry the same information content by construction: every
//! id/turn/shih value that appears in the source `View` appears literally in the
//! rendered text. [`crate::integrity`] checks this holds in practice.

mod ascii;
mod history;
mod json;
mod narrative;
mod rules;
mod tabular;

pub use history::render_history;
pub use rules::render_rules_reference;

use crate::config::GameConfig;
use crate::resolve::Event;
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Narrative,
    Tabular,
    Ascii,
    Json,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Narrative, Format::Tabular, Format::Ascii, Format::Json];

    pub fn name(self) -> &'static str {
        match self {
            Format::Narrative => "narrative",
            Format::Tabular => "tabular",
            Format::Ascii => "ascii",
            Format::Json => "json",
        }
    }
}

pub fn render(view: &View, cfg: &GameConfig, format: Format, events: &[Event]) -> String {
    match format {
        Format::Narrative => narrative::render(view, cfg, events),
        Format::Tabular => tabular::render(view, cfg, events),
        Format::Ascii => ascii::render(view, cfg, events),
        Format::Json => json::render(view, events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::initialize_game;

    #[test]
    fn every_format_mentions_turn_and_own_force_ids() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let view = crate::view::view_for(&game, "p1", &cfg);
        for format in Format::ALL {
            let text = render(&view, &cfg, format, &[]);
            assert!(text.contains(&view.turn.to_string()), "{:?} dropped turn number", format);
            for force in &view.own_forces {
                assert!(text.contains(&force.id), "{:?} dropped {}", format, force.id);
            }
        }
    }
}
