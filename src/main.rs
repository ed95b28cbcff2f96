//! Command-line entry point: runs an autoplay simulation of a chart.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rclick::input::autoplay::autoplay_inputs;
use rclick::logic::game_loop::GameLoop;
use rclick::logic::replay_engine::ReplayEngine;
use rclick::models::engine::{Beatmap, load_map};
use rclick::models::mods::GameMods;
use rclick::models::settings::GameplaySettings;
use rclick::models::stats::HitJudgement;
use rclick::system::bus::EventSink;

#[derive(Parser, Debug)]
#[command(name = "rclick", about = "Simulates an autoplay run of a chart")]
struct Args {
    /// Chart (.osu) to play. A random chart is generated when omitted.
    chart: Option<PathBuf>,

    /// Modifier acronyms, e.g. "HDHR".
    #[arg(long, default_value = "")]
    mods: String,

    /// Gameplay settings file (TOML).
    #[arg(long, default_value = "settings.toml")]
    config: PathBuf,

    /// Seed of the random chart.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of circles in the random chart.
    #[arg(long, default_value_t = 32)]
    count: usize,
}

/// Logs every judgement as it happens.
struct JudgementLogger;

impl EventSink for JudgementLogger {
    fn on_judgement(&mut self, judgement: &HitJudgement) {
        log::info!(
            "MAIN: #{:<4} {:>5} at {:>8.0}ms (+{})",
            judgement.object_index,
            judgement.result,
            judgement.time,
            judgement.points
        );
    }

    fn on_fail(&mut self) {
        log::warn!("MAIN: Failed");
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let settings = match GameplaySettings::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("MAIN: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let beatmap = match &args.chart {
        Some(path) => match load_map(path) {
            Ok(map) => map,
            Err(e) => {
                log::error!("MAIN: Could not load {:?}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            log::info!("MAIN: No chart given, generating {} circles (seed {})", args.count, args.seed);
            Beatmap::random(args.seed, args.count)
        }
    };

    let mods = GameMods::from_acronyms(&args.mods);
    let inputs = autoplay_inputs(&beatmap);

    let mut game = GameLoop::new(beatmap.clone(), mods, settings.clone(), inputs);
    game.subscribe(Box::new(JudgementLogger));
    let engine = game.run();

    let state = engine.snapshot();
    log::info!(
        "MAIN: Score {} | Acc {:.2}% | Max combo {} | HP {:.1} | {}/{}/{}/{}",
        state.score,
        state.accuracy,
        state.max_combo,
        state.hp,
        state.perfect_count,
        state.great_count,
        state.good_count,
        state.miss_count
    );

    let replay = engine.replay().clone();
    match replay.encode() {
        Ok(bytes) => log::info!(
            "MAIN: Replay has {} frames, {} bytes compressed",
            replay.frames.len(),
            bytes.len()
        ),
        Err(e) => log::warn!("MAIN: {}", e),
    }

    let replayed = ReplayEngine::new(beatmap, &replay, settings).run().snapshot();
    if replayed.score == state.score && replayed.hit_stats() == state.hit_stats() {
        log::info!("MAIN: Replay playback matches the run");
    } else {
        log::warn!(
            "MAIN: Replay playback diverged (score {} vs {})",
            replayed.score,
            state.score
        );
    }

    ExitCode::SUCCESS
}
