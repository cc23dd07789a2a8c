//! Core entities: token, player, game state. Mutation follows the lifecycle
//! documented in the specification: hexes only change terrain, tokens only move
//! and flip `revealed`/`alive`/transient flags after deployment, players mutate
//! only via resolution and upkeep.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::map::{Board, HexCoord};

pub type TokenId = String;
pub type PlayerId = String;

pub fn token_id(player: &str, k: usize) -> TokenId {
    format!("{player}_f{k}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Deploy,
    Plan,
    Resolve,
    Upkeep,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryType {
    SovereignCapture,
    Elimination,
    Domination,
    MutualDestruction,
    Timeout,
}

/// What a player privately knows about one enemy token's power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnownPower {
    Exact(u8),
    Band(Vec<u8>),
}

impl KnownPower {
    /// Every candidate power this knowledge is consistent with.
    pub fn candidates(&self) -> Vec<u8> {
        match self {
            KnownPower::Exact(p) => vec![*p],
            KnownPower::Band(band) => band.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub owner: PlayerId,
    pub position: HexCoord,
    /// `None` until deployment assigns it exactly once.
    pub power: Option<u8>,
    pub revealed: bool,
    pub alive: bool,
    pub fortified: bool,
    pub ambushing: bool,
}

impl Token {
    pub fn new(id: TokenId, owner: PlayerId, position: HexCoord) -> Self {
        Self {
            id,
            owner,
            position,
            power: None,
            revealed: false,
            alive: true,
            fortified: false,
            ambushing: false,
        }
    }

    pub fn is_sovereign(&self) -> bool {
        self.power == Some(1)
    }

    /// Clear the transient per-turn flags. Called at the start of each plan phase.
    pub fn clear_transient(&mut self) {
        self.fortified = false;
        self.ambushing = false;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub shih: i32,
    pub max_shih: i32,
    pub tokens: Vec<Token>,
    pub deployed: bool,
    pub known_enemy_powers: BTreeMap<TokenId, KnownPower>,
    pub domination_streak: u32,
}

impl Player {
    pub fn new(id: PlayerId, starting_shih: i32, max_shih: i32) -> Self {
        Self {
            id,
            shih: starting_shih,
            max_shih,
            tokens: Vec::new(),
            deployed: false,
            known_enemy_powers: BTreeMap::new(),
            domination_streak: 0,
        }
    }

    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_mut(&mut self, id: &str) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn alive_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.alive)
    }

    pub fn sovereign(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| t.alive && t.is_sovereign())
    }

    pub fn add_shih(&mut self, amount: i32) {
        self.shih = (self.shih + amount).clamp(0, self.max_shih);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: String,
    pub seed: u64,
    pub turn: u32,
    pub phase: Phase,
    pub board: Board,
    pub players: [Player; 2],
    pub shrink_stage: u32,
    pub winner: Option<PlayerId>,
    pub victory_type: Option<VictoryType>,
}

impl GameState {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn opponent_of(&self, id: &str) -> &Player {
        self.players.iter().find(|p| p.id != id).expect("exactly two players")
    }

    /// Find a living token anywhere in the game by id.
    pub fn find_token(&self, id: &str) -> Option<&Token> {
        self.players.iter().flat_map(|p| p.tokens.iter()).find(|t| t.id == id)
    }

    pub fn find_token_mut(&mut self, id: &str) -> Option<&mut Token> {
        self.players.iter_mut().flat_map(|p| p.tokens.iter_mut()).find(|t| t.id == id)
    }

    pub fn token_at(&self, coord: HexCoord) -> Option<&Token> {
        self.players
            .iter()
            .flat_map(|p| p.tokens.iter())
            .find(|t| t.alive && t.position == coord)
    }

    pub fn all_alive_tokens(&self) -> impl Iterator<Item = &Token> {
        self.players.iter().flat_map(|p| p.alive_tokens())
    }

    pub fn controller_of(&self, coord: HexCoord) -> Option<&PlayerId> {
        let mut found: Option<&PlayerId> = None;
        for player in &self.players {
            for token in player.alive_tokens() {
                if token.position == coord {
                    if found.is_some() && found != Some(&player.id) {
                        return None;
                    }
                    found = Some(&player.id);
                }
            }
        }
        found
    }
}

/// Construct a fresh game: generated board, two players with empty token rosters,
/// phase `Deploy`, turn 0. Token ids/positions are assigned here; powers are
/// assigned later by [`crate::deploy::deploy`].
pub fn initialize_game(config: &crate::config::GameConfig, game_id: impl Into<String>, seed: u64) -> GameState {
    let board = crate::map::generate(config, seed);
    let corners = [HexCoord::new(0, 0), HexCoord::new(config.board_size - 1, config.board_size - 1)];

    let mut players = [
        Player::new("p1".to_string(), config.starting_shih, config.max_shih),
        Player::new("p2".to_string(), config.starting_shih, config.max_shih),
    ];

    for (player, corner) in players.iter_mut().zip(corners) {
        for k in 1..=config.force_count {
            let id = token_id(&player.id, k);
            player.tokens.push(Token::new(id, player.id.clone(), corner));
        }
    }

    GameState {
        game_id: game_id.into(),
        seed,
        turn: 0,
        phase: Phase::Deploy,
        board,
        players,
        shrink_stage: 0,
        winner: None,
        victory_type: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn initialize_produces_deploy_phase_and_five_tokens_each() {
        let cfg = GameConfig::default();
        let game = initialize_game(&cfg, "g1", 1);
        assert_eq!(game.phase, Phase::Deploy);
        assert_eq!(game.turn, 0);
        for player in &game.players {
            assert_eq!(player.tokens.len(), cfg.force_count);
            assert!(player.tokens.iter().all(|t| t.power.is_none()));
        }
    }

    #[test]
    fn token_ids_are_stable_strings() {
        assert_eq!(token_id("p1", 3), "p1_f3");
    }
}
