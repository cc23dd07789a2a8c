//! Deployment: the one-shot secret power assignment that ends phase `Deploy`.

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::model::{GameState, Phase, TokenId};

/// Assign `assignment` (token id -> power) to `player_id`'s tokens.
///
/// Succeeds only when the key set exactly matches the player's five token ids
/// and the value multiset is exactly `{1,2,3,4,5}`. When both players have
/// deployed, advances phase to `Plan` and sets `turn = 1`.
pub fn deploy(
    state: &mut GameState,
    player_id: &str,
    assignment: &BTreeMap<TokenId, u8>,
) -> EngineResult<()> {
    if state.phase == Phase::Ended {
        return Err(EngineError::GameEnded);
    }
    if state.phase != Phase::Deploy {
        return Err(EngineError::WrongPhase { expected: "deploy", found: phase_name(state.phase) });
    }

    let player = state
        .player(player_id)
        .ok_or_else(|| EngineError::UnknownPlayer(player_id.to_string()))?;

    let expected_keys: std::collections::BTreeSet<&TokenId> =
        player.tokens.iter().map(|t| &t.id).collect();
    let given_keys: std::collections::BTreeSet<&TokenId> = assignment.keys().collect();
    if expected_keys != given_keys {
        return Err(EngineError::BadDeployment(format!(
            "token id set mismatch for {player_id}"
        )));
    }

    let mut powers: Vec<u8> = assignment.values().copied().collect();
    powers.sort_unstable();
    if powers != [1, 2, 3, 4, 5] {
        return Err(EngineError::BadDeployment(format!(
            "power multiset for {player_id} is not a permutation of 1..5"
        )));
    }

    let player = state.player_mut(player_id).expect("looked up above");
    for token in player.tokens.iter_mut() {
        token.power = assignment.get(&token.id).copied();
    }
    player.deployed = true;
    log::debug!("deployment accepted for {player_id}");

    if state.players.iter().all(|p| p.deployed) {
        state.phase = Phase::Plan;
        state.turn = 1;
        log::info!("both players deployed, entering plan phase for turn 1");
    }
    Ok(())
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Deploy => "deploy",
        Phase::Plan => "plan",
        Phase::Resolve => "resolve",
        Phase::Upkeep => "upkeep",
        Phase::Ended => "ended",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::model::initialize_game;

    fn permutation(player: &str, game: &GameState) -> BTreeMap<TokenId, u8> {
        game.player(player)
            .unwrap()
            .tokens
            .iter()
            .zip([1u8, 2, 3, 4, 5])
            .map(|(t, p)| (t.id.clone(), p))
            .collect()
    }

    #[test]
    fn deploy_both_advances_to_plan_turn_one() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let p1 = permutation("p1", &game);
        deploy(&mut game, "p1", &p1).unwrap();
        assert_eq!(game.phase, Phase::Deploy);
        let p2 = permutation("p2", &game);
        deploy(&mut game, "p2", &p2).unwrap();
        assert_eq!(game.phase, Phase::Plan);
        assert_eq!(game.turn, 1);
        for player in &game.players {
            assert!(player.deployed);
            let mut powers: Vec<u8> = player.tokens.iter().map(|t| t.power.unwrap()).collect();
            powers.sort_unstable();
            assert_eq!(powers, [1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn rejects_non_permutation_powers() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let mut bad = permutation("p1", &game);
        for value in bad.values_mut() {
            *value = 1;
        }
        assert!(matches!(deploy(&mut game, "p1", &bad), Err(EngineError::BadDeployment(_))));
    }

    #[test]
    fn rejects_wrong_key_set() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let mut bad = permutation("p1", &game);
        let first_key = bad.keys().next().unwrap().clone();
        let stray = bad.remove(&first_key).unwrap();
        bad.insert("not_a_real_token".to_string(), stray);
        assert!(matches!(deploy(&mut game, "p1", &bad), Err(EngineError::BadDeployment(_))));
    }

    #[test]
    fn rejects_unknown_player() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let p1 = permutation("p1", &game);
        assert!(matches!(deploy(&mut game, "p3", &p1), Err(EngineError::UnknownPlayer(_))));
    }
}
