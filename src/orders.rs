//! Order types, the per-order validation rules, and supply computation.
//!
//! Validation failures are in-band data (`OrderError`), never `Result::Err`: a
//! turn where a player submits only illegal orders simply has no effect.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::map::HexCoord;
use crate::model::{GameState, TokenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Move,
    Charge,
    Scout,
    Fortify,
    Ambush,
}

impl OrderType {
    pub fn cost(self, cfg: &GameConfig) -> i32 {
        match self {
            OrderType::Move => 0,
            OrderType::Charge => cfg.charge_cost,
            OrderType::Scout => cfg.scout_cost,
            OrderType::Fortify => cfg.fortify_cost,
            OrderType::Ambush => cfg.ambush_cost,
        }
    }

    pub fn requires_supply(self) -> bool {
        !matches!(self, OrderType::Move)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderType::Move => "move",
            OrderType::Charge => "charge",
            OrderType::Scout => "scout",
            OrderType::Fortify => "fortify",
            OrderType::Ambush => "ambush",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub force: TokenId,
    pub order_type: OrderType,
    pub target_hex: Option<HexCoord>,
    pub scout_target: Option<TokenId>,
}

impl Order {
    pub fn mv(force: impl Into<TokenId>, to: HexCoord) -> Self {
        Self { force: force.into(), order_type: OrderType::Move, target_hex: Some(to), scout_target: None }
    }

    pub fn charge(force: impl Into<TokenId>, to: HexCoord) -> Self {
        Self { force: force.into(), order_type: OrderType::Charge, target_hex: Some(to), scout_target: None }
    }

    pub fn scout(force: impl Into<TokenId>, target: impl Into<TokenId>) -> Self {
        Self { force: force.into(), order_type: OrderType::Scout, target_hex: None, scout_target: Some(target.into()) }
    }

    pub fn fortify(force: impl Into<TokenId>) -> Self {
        Self { force: force.into(), order_type: OrderType::Fortify, target_hex: None, scout_target: None }
    }

    pub fn ambush(force: impl Into<TokenId>) -> Self {
        Self { force: force.into(), order_type: OrderType::Ambush, target_hex: None, scout_target: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderError {
    NotOwner,
    OutOfBounds,
    NotANeighbor,
    ChargeTargetUnreachable,
    InsufficientShih,
    NoSupply,
    InvalidScoutTarget,
    DeadForce,
    UnknownForce,
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            OrderError::NotOwner => "force is not owned by the issuing player",
            OrderError::OutOfBounds => "target hex is out of bounds",
            OrderError::NotANeighbor => "move target is not an adjacent hex",
            OrderError::ChargeTargetUnreachable => "charge target is not within 2 hexes via a valid path",
            OrderError::InsufficientShih => "insufficient shih to pay order cost",
            OrderError::NoSupply => "force is out of supply",
            OrderError::InvalidScoutTarget => "scout target is not a visible or previously known living enemy",
            OrderError::DeadForce => "force is not alive",
            OrderError::UnknownForce => "force id does not belong to the issuing player",
        };
        write!(f, "{msg}")
    }
}

/// A chain of same-owner living tokens from `token_id` to the owner's sovereign,
/// each hop within `supply_range` hexes, at most `max_supply_hops` hops.
pub fn has_supply(state: &GameState, token_id: &str, cfg: &GameConfig) -> bool {
    let Some(token) = state.find_token(token_id) else { return false };
    if !token.alive {
        return false;
    }
    let Some(player) = state.player(&token.owner) else { return false };
    let Some(sovereign) = player.sovereign() else { return false };
    if sovereign.id == token.id {
        return true;
    }

    let living: Vec<_> = player.alive_tokens().collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut frontier = vec![token];
    visited.insert(token.id.as_str());

    for _hop in 0..cfg.max_supply_hops {
        let mut next = Vec::new();
        for node in &frontier {
            for candidate in &living {
                if visited.contains(candidate.id.as_str()) {
                    continue;
                }
                if node.position.distance(candidate.position) <= cfg.supply_range {
                    if candidate.id == sovereign.id {
                        return true;
                    }
                    visited.insert(candidate.id.as_str());
                    next.push(*candidate);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    false
}

/// Validate one order against the current state. Returns `Ok(())` and leaves the
/// cost unpaid; the caller (resolve pipeline) pays on success.
pub fn validate(
    state: &GameState,
    owner: &str,
    order: &Order,
    cfg: &GameConfig,
) -> Result<(), OrderError> {
    let token = state.find_token(&order.force).ok_or(OrderError::UnknownForce)?;
    if token.owner != owner {
        return Err(OrderError::NotOwner);
    }
    if !token.alive {
        return Err(OrderError::DeadForce);
    }

    let player = state.player(owner).expect("owner validated above");
    let cost = order.order_type.cost(cfg);
    if player.shih < cost {
        return Err(OrderError::InsufficientShih);
    }
    if order.order_type.requires_supply() && !has_supply(state, &order.force, cfg) {
        return Err(OrderError::NoSupply);
    }

    match order.order_type {
        OrderType::Move => {
            let target = order.target_hex.ok_or(OrderError::OutOfBounds)?;
            if !state.board.in_bounds(target) {
                return Err(OrderError::OutOfBounds);
            }
            if token.position.distance(target) != 1 {
                return Err(OrderError::NotANeighbor);
            }
        }
        OrderType::Charge => {
            let target = order.target_hex.ok_or(OrderError::OutOfBounds)?;
            if !state.board.in_bounds(target) {
                return Err(OrderError::OutOfBounds);
            }
            let dist = token.position.distance(target);
            if dist == 0 || dist > 2 {
                return Err(OrderError::ChargeTargetUnreachable);
            }
            if dist == 2 {
                let reachable = token
                    .position
                    .neighbors()
                    .into_iter()
                    .any(|mid| state.board.in_bounds(mid) && mid.distance(target) == 1);
                if !reachable {
                    return Err(OrderError::ChargeTargetUnreachable);
                }
            }
        }
        OrderType::Scout => {
            let target_id = order.scout_target.as_ref().ok_or(OrderError::InvalidScoutTarget)?;
            let target = state.find_token(target_id).ok_or(OrderError::InvalidScoutTarget)?;
            if !target.alive || target.owner == owner {
                return Err(OrderError::InvalidScoutTarget);
            }
            let in_range = token.position.distance(target.position) <= cfg.scout_range;
            let previously_known = player.known_enemy_powers.contains_key(target_id);
            if !in_range && !previously_known {
                return Err(OrderError::InvalidScoutTarget);
            }
        }
        OrderType::Fortify | OrderType::Ambush => {}
    }
    Ok(())
}

/// Validate every submitted order, dropping invalid ones and deducting cost for
/// the rest. Returns the surviving orders keyed by force id, and the dropped
/// orders with their errors.
pub fn validate_all(
    state: &mut GameState,
    owner: &str,
    orders: Vec<Order>,
    cfg: &GameConfig,
) -> (HashMap<TokenId, Order>, Vec<(TokenId, OrderError)>) {
    let mut accepted = HashMap::new();
    let mut errors = Vec::new();
    for order in orders {
        match validate(state, owner, &order, cfg) {
            Ok(()) => {
                let cost = order.order_type.cost(cfg);
                if let Some(player) = state.player_mut(owner) {
                    player.add_shih(-cost);
                }
                accepted.insert(order.force.clone(), order);
            }
            Err(err) => errors.push((order.force.clone(), err)),
        }
    }
    (accepted, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::model::initialize_game;

    #[test]
    fn move_to_non_neighbor_is_rejected() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let far = HexCoord::new(cfg.board_size - 1, 0);
        let order = Order::mv("p1_f1", far);
        assert_eq!(validate(&game, "p1", &order, &cfg), Err(OrderError::NotANeighbor));
    }

    #[test]
    fn order_for_unowned_force_is_rejected() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let p2_pos = game.find_token("p2_f1").unwrap().position;
        let order = Order::mv("p2_f1", p2_pos.neighbors()[0]);
        assert_eq!(validate(&game, "p1", &order, &cfg), Err(OrderError::NotOwner));
    }

    #[test]
    fn fresh_deployment_has_supply_chain_to_sovereign() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let assignment: std::collections::BTreeMap<TokenId, u8> = game
            .player("p1")
            .unwrap()
            .tokens
            .iter()
            .zip([1u8, 2, 3, 4, 5])
            .map(|(t, p)| (t.id.clone(), p))
            .collect();
        for (id, power) in &assignment {
            game.find_token_mut(id).unwrap().power = Some(*power);
        }
        for id in assignment.keys() {
            assert!(has_supply(&game, id, &cfg), "{id} should have supply while stacked at spawn");
        }
    }

    #[test]
    fn scout_on_unknown_distant_enemy_is_rejected() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let order = Order::scout("p1_f1", "p2_f1");
        assert_eq!(validate(&game, "p1", &order, &cfg), Err(OrderError::InvalidScoutTarget));
    }
}
