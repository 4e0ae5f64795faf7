use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use tile_2048::config::Config;
use tile_2048::engine::{Direction, Game};
use tile_2048::scores::ScoreStore;
use tile_2048::settings::Settings;
use tile_2048::sound::{self, SoundEffect};
use tile_2048::trace::{self, SessionRecorder};

#[derive(Debug, Parser)]
#[command(name = "tile-2048", version, about = "Play 2048 in the terminal")]
struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for a reproducible session (overrides config)
    #[arg(long)]
    seed: Option<u32>,

    /// Player name recorded with the final score
    #[arg(long)]
    player: Option<String>,

    /// Score history file (overrides config)
    #[arg(long, value_name = "FILE")]
    scores: Option<PathBuf>,

    /// Settings file (overrides config)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Play a scripted sequence of U/D/L/R moves instead of reading stdin
    #[arg(long, value_name = "MOVES")]
    moves: Option<String>,

    /// Write a session recording here when the game ends
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Do not write the score history
    #[arg(long)]
    no_save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move(Direction),
    NewGame,
    ToggleSound,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let cmd = match line.trim().to_ascii_lowercase().as_str() {
        "w" | "k" | "up" => Command::Move(Direction::Up),
        "s" | "j" | "down" => Command::Move(Direction::Down),
        "a" | "h" | "left" => Command::Move(Direction::Left),
        "d" | "l" | "right" => Command::Move(Direction::Right),
        "n" | "new" => Command::NewGame,
        "m" | "mute" => Command::ToggleSound,
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

fn parse_script(script: &str) -> anyhow::Result<Vec<Direction>> {
    script
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c.to_ascii_uppercase() {
            'U' => Ok(Direction::Up),
            'D' => Ok(Direction::Down),
            'L' => Ok(Direction::Left),
            'R' => Ok(Direction::Right),
            other => anyhow::bail!("invalid move '{other}' in script (expected U, D, L or R)"),
        })
        .collect()
}

struct App {
    game: Game,
    recorder: SessionRecorder,
    scores: ScoreStore,
    settings: Settings,
    settings_path: PathBuf,
    player: String,
    record: Option<PathBuf>,
    save_scores: bool,
    finished: bool,
}

impl App {
    fn play(&mut self, dir: Direction) {
        self.recorder.record(dir);
        let res = self.game.make_move(dir);
        self.cue(&sound::move_cues(&res));
        if res.moved && self.game.is_game_over() {
            self.finish();
        }
    }

    fn new_game(&mut self) {
        self.game.reset();
        self.recorder.restart(self.game.seed());
        self.finished = false;
        info!("new game, seed {}", self.game.seed());
    }

    fn toggle_sound(&mut self) {
        self.settings.toggle_sound();
        if let Err(e) = self.settings.save(&self.settings_path) {
            warn!("could not save settings to {}: {e}", self.settings_path.display());
        }
    }

    /// Persist the final score once per game.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let previous_best = self.scores.best_score();
        let final_score = self.game.score();
        self.scores.add_score(final_score, &self.player, None);
        if self.save_scores {
            if let Err(e) = self.scores.save() {
                warn!("could not save scores to {}: {e}", self.scores.path().display());
            }
        }
        self.cue(&sound::game_over_cues(final_score, previous_best));
        self.write_recording();
    }

    fn write_recording(&self) {
        let Some(path) = &self.record else { return };
        let session = self.recorder.finish(&self.game, Some(self.player.as_str()));
        match trace::write_session_to_path(path, &session) {
            Ok(()) => info!("recorded {} moves to {}", session.moves.len(), path.display()),
            Err(e) => warn!("could not write recording to {}: {e}", path.display()),
        }
    }

    fn cue(&self, cues: &[SoundEffect]) {
        if !self.settings.sound_enabled {
            return;
        }
        for c in cues {
            debug!("sound cue {:?} ({})", c, c.file_name());
        }
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\n{}", self.game)?;
        writeln!(
            out,
            "Score: {} | Best: {} | Sound: {}",
            self.game.score(),
            self.scores.best_score().max(self.game.score()),
            if self.settings.sound_enabled { "on" } else { "off" }
        )?;
        if self.finished {
            writeln!(out, "Game over! Top scores:")?;
            for (i, e) in self.scores.top_scores().iter().enumerate() {
                writeln!(out, "  {}. {:>7}  {}  {}", i + 1, e.score, e.player_name, e.played_at)?;
            }
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => Config::default(),
    };
    let settings_path = args.settings.clone().unwrap_or(config.settings_file.clone());
    let scores_path = args.scores.clone().unwrap_or(config.scores_file.clone());
    let player = args.player.clone().unwrap_or(config.player_name.clone());
    let seed = args.seed.or(config.seed);

    let settings = Settings::load(&settings_path).unwrap_or_else(|e| {
        warn!("could not load settings from {}: {e}", settings_path.display());
        Settings::default()
    });
    let mut scores = ScoreStore::new(scores_path);
    if let Err(e) = scores.load() {
        warn!("could not load scores from {}: {e}", scores.path().display());
    }

    let game = match seed {
        Some(s) => Game::with_seed(s),
        None => Game::new(),
    };
    info!("starting game, seed {}", game.seed());
    let mut app = App {
        recorder: SessionRecorder::new(game.seed()),
        game,
        scores,
        settings,
        settings_path,
        player,
        record: args.record.clone(),
        save_scores: !args.no_save,
        finished: false,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(script) = &args.moves {
        for dir in parse_script(script)? {
            if app.game.is_game_over() {
                break;
            }
            app.play(dir);
        }
        if !app.finished {
            app.write_recording();
        }
        app.render(&mut out)?;
        writeln!(out, "Seed: {}", app.game.seed())?;
        return Ok(());
    }

    writeln!(out, "w/a/s/d or h/j/k/l to move, n = new game, m = sound, q = quit")?;
    app.render(&mut out)?;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_command(&line) {
            Some(Command::Move(dir)) if !app.finished => app.play(dir),
            Some(Command::Move(_)) => writeln!(out, "Game over. Press n for a new game or q to quit.")?,
            Some(Command::NewGame) => app.new_game(),
            Some(Command::ToggleSound) => app.toggle_sound(),
            Some(Command::Quit) => break,
            None => {
                writeln!(out, "Unknown command: {}", line.trim())?;
                continue;
            }
        }
        app.render(&mut out)?;
    }
    Ok(())
}
