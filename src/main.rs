//! Plays a game between humans, random players and SHUCT agents
use clap::{Parser, ValueEnum};
use env_logger::fmt::Formatter;
use log::{info, Record};
use rand::Rng;
use shuct_rs::game::Game;
use shuct_rs::games::{Games, Nim, C4};
use shuct_rs::shuct::game::{Action, Actor, State};
use shuct_rs::shuct::{
    AnytimeStopMode, BudgetMode, SearchConfig, SearchLimits, SequentialHalvingUct,
};
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::{fs, thread};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlayerType {
    /// Human
    H,
    /// Random
    R,
    /// SHUCT agent
    S,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Fixed,
    Time,
    AnytimeIterations,
    AnytimeClock,
}

impl Mode {
    fn budget_mode(self) -> BudgetMode {
        match self {
            Mode::Fixed => BudgetMode::FixedIteration,
            Mode::Time => BudgetMode::TimeBased,
            Mode::AnytimeIterations => BudgetMode::Anytime {
                stop_mode: AnytimeStopMode::IterationCount,
            },
            Mode::AnytimeClock => BudgetMode::Anytime {
                stop_mode: AnytimeStopMode::WallClock,
            },
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg()]
    game: Games,

    /// Players participating in the game
    #[arg(short, long, value_delimiter = ',', value_enum, default_value = "h,s")]
    players: Vec<PlayerType>,

    /// Budget mode for agents, ignored when a config file is given
    #[arg(short, long, value_enum, default_value_t = Mode::Fixed)]
    mode: Mode,

    /// Iterations per decision
    #[arg(short, long)]
    iterations: Option<u64>,

    /// Seconds per decision
    #[arg(short, long)]
    seconds: Option<f64>,

    /// JSON file holding the agent configuration
    #[arg(short, long)]
    config: Option<String>,

    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

fn play<G: Game>(
    game: G,
    players: &[PlayerType],
    agent: &SequentialHalvingUct,
    limits: SearchLimits,
) -> Vec<f64> {
    let interrupt = AtomicBool::new(false);
    let mut state = game.init_game();
    while !state.terminal() {
        let Actor::Player(player) = state.next_actor() else {
            panic!("{} can't play games with chance events", agent.friendly_name());
        };
        game.visualise_state(&state);
        let action: G::ActionType = match players[player as usize % players.len()] {
            PlayerType::H => game.get_human_turn(&state),
            PlayerType::R => {
                let permitted_actions = state.permitted_actions();
                permitted_actions[rand::thread_rng().gen_range(0..permitted_actions.len())]
            }
            PlayerType::S => agent
                .select_action(&game, &state, limits, &interrupt)
                .unwrap_or_else(|err| panic!("Agent failed: {}", err)),
        };
        info!("Player {} plays {:?}", player, action);
        state = action.execute(&state);
    }
    game.visualise_state(&state);
    state.reward()
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .format(|buf: &mut Formatter, record: &Record| {
            let thread_id = thread::current().id();
            let timestamp = buf.timestamp_millis();
            writeln!(
                buf,
                "[{}] [Thread: {:?}] [{}] - {}",
                timestamp,
                thread_id,
                record.level(),
                record.args()
            )
        })
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = match &args.config {
        Some(path) => {
            let config_file = fs::read_to_string(path).expect("Failed to read config file");
            serde_json::from_str::<SearchConfig>(&config_file)
                .expect("Failed to parse config file")
        }
        None => SearchConfig {
            budget_mode: args.mode.budget_mode(),
            ..Default::default()
        },
    };
    let limits = match (args.iterations, args.seconds) {
        (None, None) => SearchLimits {
            max_seconds: Some(1.0),
            max_iterations: Some(1000),
            max_depth: None,
        },
        (max_iterations, max_seconds) => SearchLimits {
            max_seconds,
            max_iterations,
            max_depth: None,
        },
    };
    let agent = SequentialHalvingUct::new(config);
    info!("Agent: {} {:?}", agent.friendly_name(), agent.config());

    let result = match args.game {
        Games::C4 => play(C4, &args.players, &agent, limits),
        Games::Nim => play(
            Nim {
                player_count: args.players.len().max(2) as u8,
                ..Default::default()
            },
            &args.players,
            &agent,
            limits,
        ),
    };
    println!("Player\tResult");
    for (i, r) in result.iter().enumerate() {
        println!("{}\t{:?}", i + 1, r);
    }
}
