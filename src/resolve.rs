//! The per-turn simultaneous order-resolution pipeline.
//!
//! Runs the nine steps in §4.3 in a fixed order: validate, resolve scouts, compute
//! destinations, detect swaps, resolve destination conflicts, apply single-move
//! arrivals, run combat, record events, and return the result. All randomness
//! flows through the caller-supplied `SmallRng`.

use std::collections::{HashMap, HashSet};

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{effective_power, retreat_hex, resolve_loss, Combatant, Outcome};
use crate::config::GameConfig;
use crate::map::HexCoord;
use crate::model::{GameState, KnownPower, Phase, PlayerId, TokenId};
use crate::error::{EngineError, EngineResult};
use crate::orders::{validate_all, Order, OrderType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Moved { force: TokenId, from: HexCoord, to: HexCoord },
    MoveCancelled { force: TokenId, reason: String },
    Combat {
        attacker: TokenId,
        defender: TokenId,
        attacker_power: i32,
        defender_power: i32,
        winner: TokenId,
        loser_outcome: String,
        at: HexCoord,
    },
    ScoutReveal { scouter: TokenId, target: TokenId, public: bool, exact: bool },
    SovereignCaptured { loser_owner: PlayerId, winner_owner: PlayerId },
    OrderRejected { force: TokenId, error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub events: Vec<Event>,
    pub sovereign_captured: Option<PlayerId>,
}

/// Resolve one turn. `orders` maps player id to that player's submitted orders.
/// Fails only on contract violations (wrong phase, already ended); individual
/// order problems are in-band `OrderRejected` events.
pub fn resolve(
    state: &mut GameState,
    orders: HashMap<PlayerId, Vec<Order>>,
    cfg: &GameConfig,
    rng: &mut SmallRng,
) -> EngineResult<ResolutionResult> {
    if state.phase == Phase::Ended {
        return Err(EngineError::GameEnded);
    }
    if state.phase != Phase::Plan && state.phase != Phase::Resolve {
        return Err(EngineError::WrongPhase { expected: "plan", found: "other" });
    }
    state.phase = Phase::Resolve;

    let mut result = ResolutionResult::default();
    let mut accepted: HashMap<TokenId, Order> = HashMap::new();

    for player in state.players.clone() {
        let player_orders = orders.get(&player.id).cloned().unwrap_or_default();
        let (ok, errors) = validate_all(state, &player.id, player_orders, cfg);
        for (force, err) in errors {
            result.events.push(Event::OrderRejected { force, error: err.to_string() });
        }
        accepted.extend(ok);
    }

    // Step 2: resolve scouts. Sorted by force id so simultaneous scouts draw
    // their RNG bits in a fixed order regardless of HashMap iteration order.
    let mut scout_orders: Vec<Order> = accepted
        .values()
        .filter(|o| o.order_type == OrderType::Scout)
        .cloned()
        .collect();
    scout_orders.sort_by(|a, b| a.force.cmp(&b.force));
    for order in scout_orders {
        resolve_scout(state, &order, cfg, rng, &mut result);
    }

    // Step 3: intended destinations for Move/Charge.
    let mut destinations: HashMap<TokenId, HexCoord> = HashMap::new();
    for (force, order) in &accepted {
        if matches!(order.order_type, OrderType::Move | OrderType::Charge) {
            if let Some(target) = order.target_hex {
                destinations.insert(force.clone(), target);
            }
        }
    }

    // Step 4: swap detection (head-to-head combat at the midpoint).
    let mut handled: HashSet<TokenId> = HashSet::new();
    let mut fought_this_turn: HashSet<TokenId> = HashSet::new();
    // Sorted so the nested swap-detection scan (and the RNG draws `run_combat`
    // makes within it) runs in a fixed order across processes.
    let mut keys: Vec<TokenId> = destinations.keys().cloned().collect();
    keys.sort();
    for a in &keys {
        if handled.contains(a) {
            continue;
        }
        let Some(&a_to) = destinations.get(a) else { continue };
        let Some(a_tok) = state.find_token(a).cloned() else { continue };
        for b in &keys {
            if a == b || handled.contains(b) {
                continue;
            }
            let Some(&b_to) = destinations.get(b) else { continue };
            let Some(b_tok) = state.find_token(b).cloned() else { continue };
            if a_tok.owner == b_tok.owner {
                continue;
            }
            if b_to == a_tok.position && a_to == b_tok.position {
                run_combat(
                    state,
                    cfg,
                    rng,
                    a_tok.position,
                    &[a.clone(), b.clone()],
                    &accepted,
                    &mut result,
                );
                handled.insert(a.clone());
                handled.insert(b.clone());
                fought_this_turn.insert(a.clone());
                fought_this_turn.insert(b.clone());
            }
        }
    }
    destinations.retain(|id, _| !handled.contains(id));

    // Step 5: destination conflicts (two or more movers targeting the same hex).
    let mut by_target: HashMap<HexCoord, Vec<TokenId>> = HashMap::new();
    for (id, dest) in &destinations {
        by_target.entry(*dest).or_default().push(id.clone());
    }

    let mut resolved: HashSet<TokenId> = HashSet::new();
    // Sorted by target hex so the destination-conflict combats (and their RNG
    // draws) resolve in a fixed order regardless of HashMap iteration order.
    let mut targets: Vec<HexCoord> = by_target.keys().cloned().collect();
    targets.sort();
    for target in &targets {
        let contenders = &by_target[target];
        let defender = state.token_at(*target).map(|t| t.id.clone());
        let defender_stays = defender
            .as_ref()
            .map(|id| !destinations.contains_key(id))
            .unwrap_or(false);

        if contenders.len() > 1 {
            let owners: HashSet<PlayerId> = contenders
                .iter()
                .filter_map(|id| state.find_token(id).map(|t| t.owner.clone()))
                .collect();
            if owners.len() == 1 {
                let mut sorted = contenders.clone();
                sorted.sort();
                for loser in sorted.iter().skip(1) {
                    result.events.push(Event::MoveCancelled {
                        force: loser.clone(),
                        reason: "lost same-owner destination tiebreak".to_string(),
                    });
                    resolved.insert(loser.clone());
                }
                resolved.insert(sorted[0].clone());
                continue;
            }
            let mut participants = contenders.clone();
            if defender_stays {
                if let Some(def) = &defender {
                    participants.push(def.clone());
                }
            }
            run_combat(state, cfg, rng, *target, &participants, &accepted, &mut result);
            for id in &participants {
                resolved.insert(id.clone());
                fought_this_turn.insert(id.clone());
            }
        } else if defender_stays {
            let mover = contenders[0].clone();
            let def = defender.clone().unwrap();
            let mover_owner = state.find_token(&mover).map(|t| t.owner.clone());
            let def_owner = state.find_token(&def).map(|t| t.owner.clone());
            if mover_owner == def_owner {
                result.events.push(Event::MoveCancelled {
                    force: mover.clone(),
                    reason: "destination occupied by own force".to_string(),
                });
                resolved.insert(mover.clone());
            } else {
                run_combat(state, cfg, rng, *target, &[mover.clone(), def.clone()], &accepted, &mut result);
                resolved.insert(mover.clone());
                resolved.insert(def.clone());
                fought_this_turn.insert(mover.clone());
                fought_this_turn.insert(def.clone());
            }
        }
    }
    destinations.retain(|id, _| !resolved.contains(id));

    // Step 6: remaining single-move arrivals. Sorted by force id: a mover can
    // still collide with a hex vacated/occupied by an earlier step's combat
    // outcome, and that combat's RNG draw must not depend on HashMap order.
    let mut remaining: Vec<(TokenId, HexCoord)> =
        destinations.iter().map(|(id, dest)| (id.clone(), *dest)).collect();
    remaining.sort_by(|a, b| a.0.cmp(&b.0));
    for (id, dest) in remaining {
        if fought_this_turn.contains(&id) {
            continue;
        }
        let Some(mover) = state.find_token(&id).cloned() else { continue };
        let defender = state.token_at(dest).cloned();
        match defender {
            None => {
                let from = mover.position;
                if let Some(tok) = state.find_token_mut(&id) {
                    tok.position = dest;
                }
                result.events.push(Event::Moved { force: id, from, to: dest });
            }
            Some(def) if def.owner == mover.owner => {
                result.events.push(Event::MoveCancelled {
                    force: id,
                    reason: "destination occupied by own force".to_string(),
                });
            }
            Some(def) => {
                run_combat(state, cfg, rng, dest, &[id.clone(), def.id.clone()], &accepted, &mut result);
            }
        }
    }

    for token in state.players.iter_mut().flat_map(|p| p.tokens.iter_mut()) {
        if let Some(order) = accepted.get(&token.id) {
            token.fortified = order.order_type == OrderType::Fortify;
            token.ambushing = order.order_type == OrderType::Ambush;
        } else {
            token.clear_transient();
        }
    }

    if let Some(winner) = &result.sovereign_captured {
        log::info!("turn {} resolved, sovereign captured, {winner} wins", state.turn);
    } else {
        log::debug!("turn {} resolved with {} events", state.turn, result.events.len());
    }

    Ok(result)
}

fn resolve_scout(
    state: &mut GameState,
    order: &Order,
    cfg: &GameConfig,
    rng: &mut SmallRng,
    result: &mut ResolutionResult,
) {
    let Some(target_id) = order.scout_target.clone() else { return };
    let Some(scouter) = state.find_token(&order.force).cloned() else { return };
    let Some(target_power) = state.find_token(&target_id).and_then(|t| t.power) else { return };

    let exact = rng.random_bool(cfg.scout_accuracy);
    let known = if exact {
        KnownPower::Exact(target_power)
    } else {
        let mut band: Vec<u8> = (1..=5).filter(|p| *p != target_power).collect();
        band.truncate(2);
        band.push(target_power);
        band.sort_unstable();
        KnownPower::Band(band)
    };

    if let Some(player) = state.player_mut(&scouter.owner) {
        player.known_enemy_powers.insert(target_id.clone(), known);
    }
    if exact && cfg.scout_exact_public {
        if let Some(tok) = state.find_token_mut(&target_id) {
            tok.revealed = true;
        }
    }
    result.events.push(Event::ScoutReveal {
        scouter: scouter.id,
        target: target_id,
        public: exact && cfg.scout_exact_public,
        exact,
    });
}

/// Resolve a combat among `ids` (2 or more) contesting `hex`. Computes effective
/// power for each, advances the winner if unique, retreats/eliminates the rest,
/// and marks everyone involved `revealed`.
fn run_combat(
    state: &mut GameState,
    cfg: &GameConfig,
    rng: &mut SmallRng,
    hex: HexCoord,
    ids: &[TokenId],
    accepted: &HashMap<TokenId, Order>,
    result: &mut ResolutionResult,
) {
    let powers: Vec<(TokenId, i32)> = ids
        .iter()
        .map(|id| {
            let combatant = Combatant::from_state(state, id, accepted.get(id));
            (id.clone(), effective_power(state, &combatant, cfg, rng))
        })
        .collect();

    let max_power = powers.iter().map(|(_, p)| *p).max().unwrap_or(0);
    let winners: Vec<&TokenId> = powers.iter().filter(|(_, p)| *p == max_power).map(|(id, _)| id).collect();

    for (id, _) in &powers {
        if let Some(tok) = state.find_token_mut(id) {
            tok.revealed = true;
        }
    }

    if winners.len() != 1 {
        for id in ids {
            retreat_one_away(state, id, hex);
        }
        return;
    }

    let winner_id = winners[0].clone();
    let winner_pos_before = state.find_token(&winner_id).map(|t| t.position).unwrap_or(hex);

    for (id, power) in &powers {
        if *id == winner_id {
            continue;
        }
        let gap = max_power - power;
        let occupied: HashSet<HexCoord> = state.all_alive_tokens().map(|t| t.position).collect();
        let loser_pos = state.find_token(id).map(|t| t.position).unwrap_or(hex);
        let candidate = retreat_hex(state, loser_pos, winner_pos_before, &occupied);
        let outcome = resolve_loss(gap, cfg, candidate.is_some());

        let loser_owner = state.find_token(id).map(|t| t.owner.clone());
        let loser_was_sovereign = state.find_token(id).map(|t| t.is_sovereign()).unwrap_or(false);

        match outcome {
            Outcome::Eliminated => {
                if let Some(tok) = state.find_token_mut(id) {
                    tok.alive = false;
                }
            }
            Outcome::Retreated => {
                if let (Some(dest), Some(tok)) = (candidate, state.find_token_mut(id)) {
                    tok.position = dest;
                }
            }
        }

        if loser_was_sovereign {
            if let Some(loser_owner) = loser_owner {
                let winner_owner = state.find_token(&winner_id).map(|t| t.owner.clone());
                if let Some(winner_owner) = winner_owner {
                    result.sovereign_captured = Some(winner_owner.clone());
                    result.events.push(Event::SovereignCaptured { loser_owner, winner_owner });
                }
            }
        }

        result.events.push(Event::Combat {
            attacker: winner_id.clone(),
            defender: id.clone(),
            attacker_power: max_power,
            defender_power: *power,
            winner: winner_id.clone(),
            loser_outcome: format!("{outcome:?}"),
            at: hex,
        });
    }

    // Winner advances into the contested hex only if it vacated its own spot for it.
    if let Some(tok) = state.find_token_mut(&winner_id) {
        if tok.position != hex {
            tok.position = hex;
        }
    }
}

fn retreat_one_away(state: &mut GameState, id: &str, away_from: HexCoord) {
    let occupied: HashSet<HexCoord> = state.all_alive_tokens().map(|t| t.position).collect();
    let Some(pos) = state.find_token(id).map(|t| t.position) else { return };
    if let Some(dest) = retreat_hex(state, pos, away_from, &occupied) {
        if let Some(tok) = state.find_token_mut(id) {
            tok.position = dest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::model::initialize_game;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn deploy_both(game: &mut GameState) {
        for player_id in ["p1", "p2"] {
            let assignment: BTreeMap<TokenId, u8> = game
                .player(player_id)
                .unwrap()
                .tokens
                .iter()
                .zip([1u8, 2, 3, 4, 5])
                .map(|(t, p)| (t.id.clone(), p))
                .collect();
            crate::deploy::deploy(game, player_id, &assignment).unwrap();
        }
    }

    #[test]
    fn empty_orders_both_sides_produce_no_events() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        deploy_both(&mut game);
        let mut rng = SmallRng::seed_from_u64(1);
        let orders = HashMap::new();
        let result = resolve(&mut game, orders, &cfg, &mut rng).unwrap();
        assert!(result.events.is_empty());
    }

    #[test]
    fn resolve_after_ended_is_a_contract_violation() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        deploy_both(&mut game);
        game.phase = Phase::Ended;
        let mut rng = SmallRng::seed_from_u64(1);
        let result = resolve(&mut game, HashMap::new(), &cfg, &mut rng);
        assert_eq!(result, Err(EngineError::GameEnded));
    }

    #[test]
    fn head_to_head_swap_yields_one_combat_not_two() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        deploy_both(&mut game);

        let p1_token = game.player("p1").unwrap().tokens[0].id.clone();
        let p2_token = game.player("p2").unwrap().tokens[0].id.clone();
        let a_pos = HexCoord::new(3, 3);
        let b_pos = HexCoord::new(4, 3);
        game.find_token_mut(&p1_token).unwrap().position = a_pos;
        game.find_token_mut(&p2_token).unwrap().position = b_pos;

        let mut orders = HashMap::new();
        orders.insert("p1".to_string(), vec![Order::mv(p1_token.clone(), b_pos)]);
        orders.insert("p2".to_string(), vec![Order::mv(p2_token.clone(), a_pos)]);

        let mut rng = SmallRng::seed_from_u64(7);
        let result = resolve(&mut game, orders, &cfg, &mut rng).unwrap();
        let combats = result.events.iter().filter(|e| matches!(e, Event::Combat { .. })).count();
        assert_eq!(combats, 1);
    }
}
