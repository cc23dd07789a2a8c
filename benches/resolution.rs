use std::collections::BTreeMap;

use noose::config::GameConfig;
use noose::map::HexCoord;
use noose::model::{initialize_game, GameState, TokenId};
use noose::orders::Order;
use rand::rngs::SmallRng;
use rand::SeedableRng;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(20)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        generating_a_map,
        deploying_both_players,
        resolving_an_empty_turn,
        resolving_a_head_to_head_combat,
}

fn deployed_game(seed: u64) -> GameState {
    let cfg = GameConfig::default();
    let mut game = initialize_game(&cfg, "bench", seed);
    for player_id in ["p1", "p2"] {
        let assignment: BTreeMap<TokenId, u8> = game
            .player(player_id)
            .unwrap()
            .tokens
            .iter()
            .zip([1u8, 2, 3, 4, 5])
            .map(|(t, p)| (t.id.clone(), p))
            .collect();
        noose::deploy::deploy(&mut game, player_id, &assignment).unwrap();
    }
    game
}

fn generating_a_map(c: &mut criterion::Criterion) {
    let cfg = GameConfig::default();
    c.bench_function("generate a 7x7 board", |b| {
        b.iter(|| noose::map::generate(&cfg, 42))
    });
}

fn deploying_both_players(c: &mut criterion::Criterion) {
    c.bench_function("deploy both players", |b| {
        b.iter(|| deployed_game(1))
    });
}

fn resolving_an_empty_turn(c: &mut criterion::Criterion) {
    let cfg = GameConfig::default();
    c.bench_function("resolve a turn with no orders", |b| {
        b.iter(|| {
            let mut game = deployed_game(1);
            let mut rng = SmallRng::seed_from_u64(1);
            noose::resolve::resolve(&mut game, std::collections::HashMap::new(), &cfg, &mut rng).unwrap()
        })
    });
}

fn resolving_a_head_to_head_combat(c: &mut criterion::Criterion) {
    let cfg = GameConfig::default();
    c.bench_function("resolve a head-to-head swap combat", |b| {
        b.iter(|| {
            let mut game = deployed_game(1);
            let p1_token = game.player("p1").unwrap().tokens[0].id.clone();
            let p2_token = game.player("p2").unwrap().tokens[0].id.clone();
            let a_pos = HexCoord::new(3, 3);
            let b_pos = HexCoord::new(4, 3);
            game.find_token_mut(&p1_token).unwrap().position = a_pos;
            game.find_token_mut(&p2_token).unwrap().position = b_pos;

            let mut orders = std::collections::HashMap::new();
            orders.insert("p1".to_string(), vec![Order::mv(p1_token.clone(), b_pos)]);
            orders.insert("p2".to_string(), vec![Order::mv(p2_token.clone(), a_pos)]);

            let mut rng = SmallRng::seed_from_u64(7);
            noose::resolve::resolve(&mut game, orders, &cfg, &mut rng).unwrap()
        })
    });
}
