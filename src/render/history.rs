//! Recent-event rendering shared by all four per-turn renderers.

use crate::resolve::Event;

/// Render up to `max_events` most recent events as a plain-text block, or an
/// empty string if there are none.
pub fn render_history(events: &[Event], max_events: Option<usize>) -> String {
    if events.is_empty() {
        return String::new();
    }
    let slice: &[Event] = match max_events {
        Some(n) if n < events.len() => &events[events.len() - n..],
        _ => events,
    };

    let mut lines = vec!["RECENT EVENTS:".to_string()];
    for event in slice {
        lines.push(format_event(event));
    }
    lines.join("\n")
}

fn format_event(event: &Event) -> String {
    match event {
        Event::Combat { attacker, defender, attacker_power, defender_power, loser_outcome, .. } => {
            format!(
                "  Combat - {attacker} (power {attacker_power}) vs {defender} (power {defender_power}), result: {loser_outcome}"
            )
        }
        Event::ScoutReveal { scouter, target, exact, .. } => {
            let quality = if *exact { "exact" } else { "band" };
            format!("  Scout - {scouter} revealed {target} ({quality})")
        }
        Event::Moved { force, from, to } => {
            format!("  {force} moved ({},{}) -> ({},{})", from.q, from.r, to.q, to.r)
        }
        Event::MoveCancelled { force, reason } => format!("  {force} move cancelled: {reason}"),
        Event::SovereignCaptured { loser_owner, winner_owner } => {
            format!("  Sovereign captured - {loser_owner} loses, {winner_owner} wins")
        }
        Event::OrderRejected { force, error } => format!("  {force} order rejected: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_events_render_empty_string() {
        assert_eq!(render_history(&[], None), "");
    }

    #[test]
    fn caps_to_max_events() {
        let events = vec![
            Event::MoveCancelled { force: "force_a".into(), reason: "x".into() },
            Event::MoveCancelled { force: "force_b".into(), reason: "y".into() },
        ];
        let text = render_history(&events, Some(1));
        assert!(text.contains("force_b"));
        assert!(!text.contains("force_a"));
    }
}
