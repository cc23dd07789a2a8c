//! Fog-of-war-filtered projection of state for one player.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::map::{Hex, HexCoord};
use crate::model::{GameState, KnownPower, PlayerId, TokenId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PowerSource {
    Combat,
    Scouted,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnForce {
    pub id: TokenId,
    pub position: HexCoord,
    pub power: u8,
    pub has_supply: bool,
    pub fortified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibleEnemy {
    pub id: TokenId,
    pub position: HexCoord,
    pub power: Option<u8>,
    pub power_band: Option<Vec<u8>>,
    pub source: PowerSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub turn: u32,
    pub phase: String,
    pub shrink_stage: u32,
    pub own_shih: i32,
    pub opponent_shih: i32,
    pub cells: Vec<Hex>,
    pub own_forces: Vec<OwnForce>,
    pub visible_enemies: Vec<VisibleEnemy>,
    pub own_domination_streak: u32,
    pub opponent_domination_streak: u32,
}

/// Project `state` as seen by `viewer_id`. Pure: no hidden inference possible from
/// the returned object alone.
pub fn view_for(state: &GameState, viewer_id: &str, cfg: &GameConfig) -> View {
    let viewer = state.player(viewer_id).expect("viewer must exist");
    let opponent = state.opponent_of(viewer_id);

    let own_forces = viewer
        .alive_tokens()
        .map(|t| OwnForce {
            id: t.id.clone(),
            position: t.position,
            power: t.power.unwrap_or(0),
            has_supply: crate::orders::has_supply(state, &t.id, cfg),
            fortified: t.fortified,
        })
        .collect();

    let viewer_positions: Vec<HexCoord> = viewer.alive_tokens().map(|t| t.position).collect();

    let visible_enemies = opponent
        .alive_tokens()
        .filter(|t| !t.ambushing)
        .filter(|t| {
            viewer_positions
                .iter()
                .any(|&p| p.distance(t.position) <= cfg.visibility_range)
        })
        .map(|t| {
            if t.revealed {
                VisibleEnemy {
                    id: t.id.clone(),
                    position: t.position,
                    power: t.power,
                    power_band: None,
                    source: PowerSource::Combat,
                }
            } else if let Some(known) = viewer.known_enemy_powers.get(&t.id) {
                match known {
                    KnownPower::Exact(p) => VisibleEnemy {
                        id: t.id.clone(),
                        position: t.position,
                        power: Some(*p),
                        power_band: None,
                        source: PowerSource::Scouted,
                    },
                    KnownPower::Band(band) => VisibleEnemy {
                        id: t.id.clone(),
                        position: t.position,
                        power: None,
                        power_band: Some(band.clone()),
                        source: PowerSource::Scouted,
                    },
                }
            } else {
                VisibleEnemy {
                    id: t.id.clone(),
                    position: t.position,
                    power: None,
                    power_band: None,
                    source: PowerSource::Unknown,
                }
            }
        })
        .collect();

    View {
        turn: state.turn,
        phase: format!("{:?}", state.phase).to_lowercase(),
        shrink_stage: state.shrink_stage,
        own_shih: viewer.shih,
        opponent_shih: opponent.shih,
        cells: state.board.iter().copied().collect(),
        own_forces,
        visible_enemies,
        own_domination_streak: viewer.domination_streak,
        opponent_domination_streak: opponent.domination_streak,
    }
}

pub fn opponent_id(state: &GameState, viewer_id: &str) -> PlayerId {
    state.opponent_of(viewer_id).id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::initialize_game;

    #[test]
    fn distant_enemy_is_not_visible() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let view = view_for(&game, "p1", &cfg);
        assert!(view.visible_enemies.is_empty());
    }

    #[test]
    fn ambushing_enemy_is_hidden_even_in_range() {
        let cfg = GameConfig::default();
        let mut game = initialize_game(&cfg, "g", 1);
        let p1_pos = game.player("p1").unwrap().tokens[0].position;
        let p2_token = game.player("p2").unwrap().tokens[0].id.clone();
        game.find_token_mut(&p2_token).unwrap().position = p1_pos.neighbors()[0];
        game.find_token_mut(&p2_token).unwrap().ambushing = true;
        let view = view_for(&game, "p1", &cfg);
        assert!(view.visible_enemies.iter().all(|e| e.id != p2_token));
    }

    #[test]
    fn own_forces_include_every_living_token() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g", 1);
        let view = view_for(&game, "p1", &cfg);
        assert_eq!(view.own_forces.len(), cfg.force_count);
    }
}
