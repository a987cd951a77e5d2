//! Headless runner: plays an input replay through a session and logs how the
//! run ended.
//!
//! Config, level and replay files that fail to load are reported and replaced
//! with the built-in defaults, so the runner always has something to play.

use std::path::{Path, PathBuf};

use lw_core::{FramePacer, SimulationContext};
use lw_game::level::{builtin_levels, load_level_from_path};
use lw_game::replay::{load_replay_from_path, ReplayFrame, ReplaySequence};
use lw_game::session::Session;
use lw_game::tuning::{load_config_from_path, GameConfig};

const CONFIG_PATH: &str = "assets/config/game.json";
const REPLAY_PATH: &str = "assets/replays/demo.json";
const FALLBACK_IDLE_FRAMES: u32 = 600;
const PROGRESS_LOG_INTERVAL: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
enum LevelArg {
    Number(usize),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct RunOptions {
    config: PathBuf,
    level: Option<LevelArg>,
    replay: PathBuf,
    realtime: bool,
}

fn usage() -> String {
    "Usage: cargo run -p lw_game -- [--config PATH] [--level N|PATH] [--replay PATH] [--realtime]\nExample: cargo run -p lw_game -- --level 2 --replay assets/replays/demo.json".to_string()
}

fn parse_args(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions {
        config: PathBuf::from(CONFIG_PATH),
        level: None,
        replay: PathBuf::from(REPLAY_PATH),
        realtime: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--realtime" => options.realtime = true,
            "--config" | "--level" | "--replay" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("Missing value for {arg}\n{}", usage()))?;
                match arg.as_str() {
                    "--config" => options.config = PathBuf::from(value),
                    "--replay" => options.replay = PathBuf::from(value),
                    _ => {
                        options.level = Some(match value.parse::<usize>() {
                            Ok(number) => LevelArg::Number(number),
                            Err(_) => LevelArg::File(PathBuf::from(value)),
                        })
                    }
                }
            }
            "-h" | "--help" => return Err(usage()),
            other => return Err(format!("Unknown argument '{other}'\n{}", usage())),
        }
    }
    Ok(options)
}

fn load_config_or_default(path: &Path) -> GameConfig {
    if !path.exists() {
        log::warn!("Config '{}' not found; using defaults", path.display());
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}; using defaults");
            GameConfig::default()
        }
    }
}

fn load_replay_or_idle(path: &Path) -> ReplaySequence {
    match load_replay_from_path(path) {
        Ok(replay) => {
            log::info!(
                "Loaded replay '{}': {} frames",
                path.display(),
                replay.frame_count()
            );
            replay
        }
        Err(err) => {
            log::error!("{err}; playing {FALLBACK_IDLE_FRAMES} idle frames instead");
            ReplaySequence {
                frame_ms: 1000.0 / 60.0,
                frames: vec![ReplayFrame {
                    held: Vec::new(),
                    repeat: FALLBACK_IDLE_FRAMES,
                }],
            }
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let mut config = load_config_or_default(&options.config);
    let mut catalog = builtin_levels()?;
    match &options.level {
        Some(LevelArg::Number(number)) => config.session.start_level = *number,
        Some(LevelArg::File(path)) => match load_level_from_path(path) {
            Ok(descriptor) => {
                log::info!("Loaded level file '{}'", path.display());
                catalog.push(descriptor);
                config.session.start_level = catalog.len();
            }
            Err(err) => log::error!("{err}; starting on the built-in levels"),
        },
        None => {}
    }
    if config.session.start_level == 0 || config.session.start_level > catalog.len() {
        log::warn!(
            "Start level {} does not exist; starting on level 1",
            config.session.start_level
        );
        config.session.start_level = 1;
    }

    let replay = load_replay_or_idle(&options.replay);
    let inputs = replay.expanded_inputs();
    let mut clock = replay.clock();
    let mut pacer = options
        .realtime
        .then(|| FramePacer::new((1000.0 / replay.frame_ms).round() as u32));

    let mut session = Session::new(config, catalog)?;
    log::info!(
        "Lineworks runner starting on level {} ({} levels, {} frames)",
        session.level_number(),
        session.level_count(),
        inputs.len()
    );

    for input in &inputs {
        if let Some(pacer) = pacer.as_mut() {
            pacer.begin_frame();
        }
        clock.tick();
        session.update(&SimulationContext::new(&clock, *input));

        if clock.frame_count % PROGRESS_LOG_INTERVAL == 0 {
            let player = session.player();
            log::debug!(
                "frame {}: level {} {:?} player ({:.1}, {:.1}) health {:.0}",
                clock.frame_count,
                session.level_number(),
                session.phase(),
                player.body.position.x,
                player.body.position.y,
                player.health
            );
        }
        if session.game_over() {
            log::info!("Game over at frame {}", clock.frame_count);
            break;
        }
        if let Some(pacer) = pacer.as_ref() {
            pacer.wait();
        }
    }

    let snapshot = session.snapshot();
    let player = session.player();
    log::info!(
        "Run finished after {} frames ({:.1}s): level {}, phase {:?}, health {:.0}, player at ({:.1}, {:.1}), {} enemies left",
        clock.frame_count,
        clock.now_ms() as f64 / 1000.0,
        snapshot.level_number,
        snapshot.phase,
        snapshot.health,
        player.body.position.x,
        player.body.position.y,
        session.enemies().len()
    );
    if let Some(pacer) = pacer.as_ref() {
        log::info!("Average frame time {:.2}ms", pacer.smoothed_frame_time_ms);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        let options = parse_args(&[]).expect("no args should parse");
        assert_eq!(options.config, PathBuf::from(CONFIG_PATH));
        assert_eq!(options.replay, PathBuf::from(REPLAY_PATH));
        assert_eq!(options.level, None);
        assert!(!options.realtime);
    }

    #[test]
    fn level_accepts_number_or_path() {
        let options = parse_args(&args(&["--level", "3", "--realtime"])).expect("parse");
        assert_eq!(options.level, Some(LevelArg::Number(3)));
        assert!(options.realtime);

        let options =
            parse_args(&args(&["--level", "assets/levels/level2.json"])).expect("parse");
        assert_eq!(
            options.level,
            Some(LevelArg::File(PathBuf::from("assets/levels/level2.json")))
        );
    }

    #[test]
    fn missing_value_and_unknown_flag_are_errors() {
        let err = parse_args(&args(&["--replay"])).expect_err("missing value");
        assert!(err.starts_with("Missing value for --replay"));
        let err = parse_args(&args(&["--fast"])).expect_err("unknown flag");
        assert!(err.contains("Unknown argument '--fast'"));
    }

    #[test]
    fn missing_replay_falls_back_to_idle_frames() {
        let replay = load_replay_or_idle(Path::new("does/not/exist.json"));
        assert_eq!(replay.frame_count(), FALLBACK_IDLE_FRAMES as usize);
    }
}
