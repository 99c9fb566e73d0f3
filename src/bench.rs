//! Benchmarks shuct_rs by just taking the first turn and timing it, once per budget mode
use clap::Parser;
use shuct_rs::game::Game;
use shuct_rs::games::{Games, Nim, C4};
use shuct_rs::shuct::{
    AnytimeStopMode, SearchConfig, SearchLimits, SearchOutcome, SequentialHalvingUct,
};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg()]
    game: Games,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
    #[arg(short, long, default_value_t = 100000)]
    iterations: u64,
    /// Time allowance for the time-based modes
    #[arg(short, long, default_value_t = 1.0)]
    seconds: f64,
    #[arg(short, long, default_value_t = 10)]
    episodes: usize,
    #[arg(short, long, default_value_t = 2)]
    player_count: u8,
}

fn run_benchmark<G: Game>(game: &G, config: SearchConfig, limits: SearchLimits) -> (u64, f64) {
    let agent = SequentialHalvingUct::new(config);
    let interrupt = AtomicBool::new(false);
    let start = Instant::now();
    let outcome: SearchOutcome<G::ActionType> = agent
        .search(game.init_game(), limits, &interrupt)
        .unwrap_or_else(|err| panic!("{} failed: {}", agent.friendly_name(), err));
    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "{}: {} iterations in {:.2} seconds ({:.2} iterations per second), {} halvings, {} resets, chose {:?}",
        agent.friendly_name(),
        outcome.iterations,
        elapsed,
        outcome.iterations as f64 / elapsed,
        outcome.halvings,
        outcome.resets,
        outcome.action
    );
    (outcome.iterations, elapsed)
}

fn bench_modes<G: Game>(game: G, args: &Args) {
    let runs = [
        (
            SearchConfig::default(),
            SearchLimits::iterations(args.iterations),
        ),
        (SearchConfig::time_based(), SearchLimits::seconds(args.seconds)),
        (
            SearchConfig::anytime(AnytimeStopMode::IterationCount),
            SearchLimits::iterations(args.iterations),
        ),
        (
            SearchConfig::anytime(AnytimeStopMode::WallClock),
            SearchLimits::seconds(args.seconds),
        ),
    ];
    for (config, limits) in runs {
        let name = config.budget_mode.friendly_name();
        let (iterations, seconds) = (0..args.episodes)
            .map(|_| run_benchmark(&game, config.clone(), limits))
            .fold((0, 0.0), |(i, s), (run_i, run_s)| (i + run_i, s + run_s));
        println!("---");
        println!(
            "{} average iterations per second: {:.2}",
            name,
            iterations as f64 / seconds
        );
        println!("---");
    }
}

fn main() {
    let args = Args::parse();
    println!(
        "===\nIterations: {}, Seconds: {}, Episodes: {}",
        args.iterations, args.seconds, args.episodes
    );
    println!("---");
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.game {
        Games::C4 => bench_modes(C4, &args),
        Games::Nim => bench_modes(
            Nim {
                player_count: args.player_count,
                ..Default::default()
            },
            &args,
        ),
    }
}
