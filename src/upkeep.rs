//! Upkeep: runs after resolution. Shrink, income, domination, and terminal checks.

use crate::config::GameConfig;
use crate::map::Terrain;
use crate::model::{GameState, Phase, PlayerId, VictoryType};
use crate::resolve::{Event, ResolutionResult};

#[derive(Debug, Clone, Default)]
pub struct UpkeepReport {
    pub events: Vec<Event>,
    pub ended: bool,
}

/// Run the four upkeep steps in order. Never throws: a malformed engine state is
/// the caller's contract violation, caught earlier in `resolve`.
pub fn upkeep(state: &mut GameState, resolution: &ResolutionResult, cfg: &GameConfig) -> UpkeepReport {
    let mut report = UpkeepReport::default();

    shrink_check(state, cfg, &mut report);
    income(state, cfg);
    domination_counter(state, cfg, &mut report);

    if report.ended {
        state.phase = Phase::Ended;
        return report;
    }

    if let Some(winner) = &resolution.sovereign_captured {
        finish(state, Some(winner.clone()), VictoryType::SovereignCapture, &mut report);
        return report;
    }

    if let Some(outcome) = elimination_outcome(state) {
        match outcome {
            EliminationOutcome::MutualDestruction => {
                finish(state, None, VictoryType::MutualDestruction, &mut report)
            }
            EliminationOutcome::Winner(winner) => {
                finish(state, Some(winner), VictoryType::Elimination, &mut report)
            }
        }
        return report;
    }

    if state.turn >= crate::config::MAX_TURNS {
        finish(state, None, VictoryType::Timeout, &mut report);
        return report;
    }

    state.turn += 1;
    state.phase = Phase::Plan;
    report
}

fn finish(state: &mut GameState, winner: Option<PlayerId>, victory: VictoryType, report: &mut UpkeepReport) {
    state.winner = winner;
    state.victory_type = Some(victory);
    state.phase = Phase::Ended;
    report.ended = true;
}

enum EliminationOutcome {
    Winner(PlayerId),
    MutualDestruction,
}

fn elimination_outcome(state: &GameState) -> Option<EliminationOutcome> {
    let alive: Vec<bool> = state.players.iter().map(|p| p.alive_tokens().next().is_some()).collect();
    match (alive[0], alive[1]) {
        (false, false) => Some(EliminationOutcome::MutualDestruction),
        (false, true) => Some(EliminationOutcome::Winner(state.players[1].id.clone())),
        (true, false) => Some(EliminationOutcome::Winner(state.players[0].id.clone())),
        (true, true) => None,
    }
}

fn shrink_check(state: &mut GameState, cfg: &GameConfig, report: &mut UpkeepReport) {
    if state.turn == 0 || state.turn % cfg.shrink_interval != 0 {
        return;
    }
    state.shrink_stage += 1;
    let center = state.board.center();
    let radius = state.board.size / 2 - state.shrink_stage as i32;

    let to_scorch: Vec<_> = state
        .board
        .iter()
        .filter(|h| h.terrain != Terrain::Scorched && h.coord.distance(center) > radius)
        .map(|h| h.coord)
        .collect();

    for coord in to_scorch {
        state.board.set_terrain(coord, Terrain::Scorched);
    }

    let mut sovereigns_lost: Vec<PlayerId> = Vec::new();
    for player in state.players.iter_mut() {
        for token in player.tokens.iter_mut() {
            if token.alive && state.board.hex(token.position).map(|h| h.terrain) == Some(Terrain::Scorched) {
                token.alive = false;
                if token.power == Some(1) {
                    sovereigns_lost.push(player.id.clone());
                }
            }
        }
    }

    if sovereigns_lost.len() == 2 {
        finish(state, None, VictoryType::MutualDestruction, report);
    } else if let Some(loser) = sovereigns_lost.first() {
        let winner = state.players.iter().find(|p| &p.id != loser).map(|p| p.id.clone());
        report.events.push(Event::SovereignCaptured {
            loser_owner: loser.clone(),
            winner_owner: winner.clone().unwrap_or_default(),
        });
        if let Some(winner) = winner {
            finish(state, Some(winner), VictoryType::SovereignCapture, report);
        }
    }
}

fn income(state: &mut GameState, cfg: &GameConfig) {
    for player in state.players.clone() {
        let controlled = state
            .board
            .contentious_hexes()
            .iter()
            .filter(|&&hex| state.controller_of(hex) == Some(&player.id))
            .count() as i32;
        let amount = cfg.base_shih_income + cfg.contentious_shih_bonus * controlled;
        if let Some(p) = state.player_mut(&player.id) {
            p.add_shih(amount);
        }
    }
}

fn domination_counter(state: &mut GameState, cfg: &GameConfig, report: &mut UpkeepReport) {
    let mut winner: Option<PlayerId> = None;
    for player in state.players.clone() {
        let controlled = state
            .board
            .contentious_hexes()
            .iter()
            .filter(|&&hex| state.controller_of(hex) == Some(&player.id))
            .count();
        let Some(p) = state.player_mut(&player.id) else { continue };
        if controlled >= cfg.domination_hexes_required {
            p.domination_streak += 1;
        } else {
            p.domination_streak = 0;
        }
        if p.domination_streak >= cfg.domination_turns_required {
            winner = Some(p.id.clone());
        }
    }
    if let Some(winner) = winner {
        finish(state, Some(winner), VictoryType::Domination, report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HexCoord;
    use crate::model::initialize_game;

    #[test]
    fn center_hex_never_scorched_across_shrink_stages() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let center = game.board.center();
        game.turn = cfg.shrink_interval * 3;
        game.phase = Phase::Resolve;
        let resolution = ResolutionResult::default();
        upkeep(&mut game, &resolution, &cfg);
        assert_ne!(game.board.hex(center).unwrap().terrain, Terrain::Scorched);
    }

    #[test]
    fn shrink_at_turn_five_scorches_corner() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        game.turn = cfg.shrink_interval;
        game.phase = Phase::Resolve;
        let resolution = ResolutionResult::default();
        upkeep(&mut game, &resolution, &cfg);
        assert_eq!(game.shrink_stage, 1);
        let corner = HexCoord::new(0, 0);
        assert_eq!(game.board.hex(corner).unwrap().terrain, Terrain::Scorched);
    }

    #[test]
    fn domination_streak_resets_when_control_lapses() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        game.phase = Phase::Resolve;
        game.players[0].domination_streak = 3;
        let resolution = ResolutionResult::default();
        // p1 controls zero Contentious hexes in this synthetic state, so the streak resets.
        upkeep(&mut game, &resolution, &cfg);
        assert_eq!(game.players[0].domination_streak, 0);
    }

    #[test]
    fn no_terminal_condition_advances_turn_and_returns_to_plan() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        game.turn = 2;
        game.phase = Phase::Resolve;
        let resolution = ResolutionResult::default();
        upkeep(&mut game, &resolution, &cfg);
        assert_eq!(game.turn, 3);
        assert_eq!(game.phase, Phase::Plan);
    }
}
