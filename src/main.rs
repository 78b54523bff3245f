//! Grid Chase entry point
//!
//! Loads settings, starts the game loop and feeds it commands read from
//! stdin. Frames go to stdout; prompts go to stderr.

use std::io::{self, BufRead};
use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use grid_chase::renderer::{JsonRenderer, Renderer, TextRenderer};
use grid_chase::sim::{Difficulty, Direction, GameState, GridModel};
use grid_chase::{GameError, GameLoop, HighScoreStore, LoopParts, SessionObserver, Settings};

const USAGE: &str = "usage: grid-chase [easy|medium|hard|1|2|3] [--seed N] [--json]";

const CONTROLS: &str = "controls: w/a/s/d move, p pause, r resume, n restart, q quit";

/// Command-line overrides
#[derive(Debug, Default)]
struct Args {
    difficulty: Option<Difficulty>,
    seed: Option<u64>,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, GameError> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--seed" => {
                let value = args
                    .next()
                    .ok_or_else(|| GameError::InvalidSettings("--seed needs a value".to_string()))?;
                let seed = value
                    .parse()
                    .map_err(|_| GameError::InvalidSettings(format!("bad seed {value:?}")))?;
                parsed.seed = Some(seed);
            }
            other => parsed.difficulty = Some(other.parse()?),
        }
    }
    Ok(parsed)
}

/// Prints end-of-session prompts
struct Prompt;

impl SessionObserver for Prompt {
    fn on_victory(&mut self, score: u32) {
        eprintln!("Victory! You escaped the prison with {score} points. Press n to restart or q to quit.");
    }

    fn on_defeat(&mut self, score: u32) {
        eprintln!("Game Over! You were caught by the police ({score} points). Press n to restart or q to quit.");
    }

    fn on_caught(&mut self, health: u8) {
        eprintln!("Caught! {health} hearts left, back to the start.");
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Settings from `dir`. Bad values abort the run; an unreadable file falls
/// back to defaults with a visible warning.
fn load_settings(dir: &Path) -> Result<Settings, GameError> {
    match Settings::load_from(dir) {
        Ok(settings) => Ok(settings),
        Err(
            e @ (GameError::InvalidDifficulty(_)
            | GameError::UnknownDifficulty(_)
            | GameError::InvalidSettings(_)),
        ) => Err(e),
        Err(e) => {
            log::warn!("Ignoring settings file: {}", e);
            eprintln!("warning: ignoring settings file ({e}), using defaults");
            Ok(Settings::default())
        }
    }
}

fn run() -> Result<(), GameError> {
    let args = parse_args(std::env::args().skip(1))?;

    let data_dir = Settings::data_dir();
    let mut settings = load_settings(&data_dir)?;
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let seed = settings.seed.unwrap_or_else(seed_from_clock);
    let state = GameState::from_settings(GridModel::reference(), &settings, seed)?;

    let renderer: Box<dyn Renderer> = if args.json {
        Box::new(JsonRenderer::new(io::stdout()))
    } else {
        Box::new(TextRenderer::new(io::stdout()))
    };
    let parts = LoopParts {
        renderer,
        scores: Box::new(HighScoreStore::open(&data_dir)),
        observer: Box::new(Prompt),
    };

    let mut game = GameLoop::new(state, parts)
        .with_frame_interval(Duration::from_millis(settings.frame_interval_ms));
    game.resume()?;
    eprintln!("{CONTROLS}");

    let handle = game.handle();
    for line in io::stdin().lock().lines() {
        for key in line?.chars().filter(|c| !c.is_whitespace()) {
            match key.to_ascii_lowercase() {
                'q' => return game.pause(),
                'p' => game.pause()?,
                'r' => game.resume()?,
                'n' => game.restart()?,
                other => match Direction::from_key(other) {
                    Some(direction) => {
                        handle.move_direction(direction);
                    }
                    None => eprintln!("unknown command {other:?}; {CONTROLS}"),
                },
            }
        }
    }

    game.pause()
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Grid Chase starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ (GameError::InvalidDifficulty(_)
        | GameError::UnknownDifficulty(_)
        | GameError::InvalidSettings(_))) => {
            eprintln!("error: {e}");
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, GameError> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["hard", "--seed", "42", "--json"]).unwrap();
        assert_eq!(parsed.difficulty, Some(Difficulty::Hard));
        assert_eq!(parsed.seed, Some(42));
        assert!(parsed.json);

        let parsed = args(&[]).unwrap();
        assert!(parsed.difficulty.is_none());
        assert!(!parsed.json);
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(matches!(args(&["4"]), Err(GameError::InvalidDifficulty(4))));
        assert!(matches!(args(&["--seed"]), Err(GameError::InvalidSettings(_))));
        assert!(matches!(args(&["--seed", "x"]), Err(GameError::InvalidSettings(_))));
    }

    #[test]
    fn test_bad_settings_abort_but_garbage_falls_back() {
        let dir = std::env::temp_dir().join(format!("grid-chase-main-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        std::fs::write(Settings::path_in(&dir), r#"{"difficulty":4}"#).unwrap();
        assert!(matches!(load_settings(&dir), Err(GameError::InvalidDifficulty(4))));

        std::fs::write(Settings::path_in(&dir), r#"{"move_reward":0}"#).unwrap();
        assert!(matches!(load_settings(&dir), Err(GameError::InvalidSettings(_))));

        std::fs::write(Settings::path_in(&dir), "{not json").unwrap();
        assert_eq!(load_settings(&dir).unwrap(), Settings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
