//! Convenience CLI wrapper around the runner: `play` runs N games and prints
//! the aggregate report, `probe` renders one fixed seed's turn-1 view in all
//! four formats for eyeballing. Not a deliverable surface in its own right.

use std::collections::BTreeMap;

use clap::{Parser, Subcommand, ValueEnum};

use noose::agents::{Agent, OracleAgent, PerfectMemoryAgent, RandomAgent, SingleTurnRationalAgent};
use noose::config::GameConfig;
use noose::runner::{self, AgentFactory, ExperimentConfig};

#[derive(Parser)]
#[command(author, version, about = "noose benchmark driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run N games of one baseline against another and print the aggregate report.
    Play {
        #[arg(long, value_enum, default_value_t = Strategy::Random)]
        agent: Strategy,
        #[arg(long, value_enum, default_value_t = Strategy::Oracle)]
        opponent: Strategy,
        #[arg(long, default_value_t = 10)]
        games: usize,
        #[arg(long, default_value_t = 0)]
        seed_offset: u64,
        #[arg(long, default_value_t = 3)]
        comprehension_frequency: u32,
    },
    /// Render one fixed seed's turn-1 view in all four formats.
    Probe {
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum Strategy {
    Random,
    Rational,
    Bayesian,
    Oracle,
}

impl Strategy {
    fn factory(self) -> AgentFactory {
        match self {
            Strategy::Random => random_agent,
            Strategy::Rational => rational_agent,
            Strategy::Bayesian => bayesian_agent,
            Strategy::Oracle => oracle_agent,
        }
    }
}

fn random_agent() -> Box<dyn Agent> {
    Box::new(RandomAgent)
}
fn rational_agent() -> Box<dyn Agent> {
    Box::new(SingleTurnRationalAgent)
}
fn bayesian_agent() -> Box<dyn Agent> {
    Box::new(PerfectMemoryAgent::default())
}
fn oracle_agent() -> Box<dyn Agent> {
    Box::new(OracleAgent)
}

fn main() {
    noose::init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Play { agent, opponent, games, seed_offset, comprehension_frequency } => {
            let config = ExperimentConfig {
                agents: vec![agent.factory()],
                opponents: vec![opponent.factory()],
                seeds: (seed_offset..seed_offset + games as u64).collect(),
                games_per_condition: games,
                comprehension_frequency,
                game_config: GameConfig::default(),
                worker_threads: None,
            };
            let report = runner::run_experiment(&config);
            println!("{}", runner::generate_report(&report));
        }
        Command::Probe { seed } => run_probe(seed),
    }
}

fn run_probe(seed: u64) {
    let cfg = GameConfig::default();
    let mut game = noose::model::initialize_game(&cfg, "probe", seed);
    for player_id in ["p1", "p2"] {
        let assignment: BTreeMap<String, u8> = game
            .player(player_id)
            .unwrap()
            .tokens
            .iter()
            .zip([1u8, 2, 3, 4, 5])
            .map(|(t, p)| (t.id.clone(), p))
            .collect();
        noose::deploy::deploy(&mut game, player_id, &assignment).expect("fixed deployment is always valid");
    }

    let view = noose::view::view_for(&game, "p1", &cfg);
    for format in noose::render::Format::ALL {
        println!("=== {} ===", format.name());
        println!("{}", noose::render::render(&view, &cfg, format, &[]));
        println!();
    }
}
