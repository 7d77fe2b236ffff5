mod ai;
mod combat;
mod config;
mod data;
mod ecs;
mod effects;
mod game;
mod gamelog;
mod input;
mod inventory;
mod map;
mod render;
mod spawner;
mod world;

use std::io::Write;

use bracket_terminal::prelude::*;
use config::GameConfig;
use game::{Game, TickOutcome};
use input::ScriptedInput;
use log::{error, info, warn};

const DEFAULT_LOG_FILE: &str = "giraffelike.log";

struct GiraffelikeState {
    game: Game,
    script: Option<ScriptedInput>,
}

impl GameState for GiraffelikeState {
    fn tick(&mut self, ctx: &mut BTerm) {
        if let Some((key, shift)) = self.next_key(ctx) {
            if let Some(command) = input::command_for(key, shift, self.game.state()) {
                match self.game.handle(command) {
                    Ok(TickOutcome::Continue) => {}
                    Ok(TickOutcome::Quit) => {
                        ctx.quit();
                        return;
                    }
                    Err(err) => {
                        error!("could not build the next floor: {err}");
                        eprintln!("giraffelike: {err}");
                        std::process::exit(1);
                    }
                }
            }
        }
        self.game.world.refresh_visibility();
        ctx.cls();
        render::draw_game(ctx, &self.game);
    }
}

impl GiraffelikeState {
    /// Scripted keys run first, then the keyboard takes over.
    fn next_key(&mut self, ctx: &BTerm) -> Option<(VirtualKeyCode, bool)> {
        if let Some(script) = self.script.as_mut() {
            if let Some(key) = script.next_key() {
                return Some(key);
            }
            if script.is_finished() {
                info!("input script finished");
                self.script = None;
            }
        }
        ctx.key.map(|key| (key, ctx.shift))
    }
}

/// Logs to a file; the terminal belongs to the game.
fn init_logging() {
    let path = std::env::var("GIRAFFELIKE_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("giraffelike: cannot open log file {path}: {err}; logging disabled");
            return;
        }
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format(|fmt, record| {
        writeln!(
            fmt,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.args()
        )
    });
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    let _ = builder.try_init();
}

fn load_script() -> Option<ScriptedInput> {
    let path = std::env::var_os("GIRAFFELIKE_SCRIPT")?;
    match ScriptedInput::from_file(&path) {
        Ok(script) => Some(script),
        Err(err) => {
            warn!("ignoring input script {}: {err}", path.to_string_lossy());
            None
        }
    }
}

fn main() -> BError {
    init_logging();
    let config = GameConfig::from_env().inspect_err(|err| error!("{err}"))?;
    info!("starting giraffelike (seed {:?})", config.seed);
    let game = Game::new(config).inspect_err(|err| error!("{err}"))?;

    let context = BTermBuilder::simple80x50()
        .with_title("giraffelike")
        .build()?;
    let state = GiraffelikeState {
        game,
        script: load_script(),
    };
    main_loop(context, state)?;
    info!("goodbye");
    Ok(())
}
