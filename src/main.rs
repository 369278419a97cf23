/// Entry point and frame loop for the terminal edition.

mod ui;

use std::time::{Duration, Instant};

use tracing::{info, warn};

use netescape::config::GameConfig;
use netescape::logging::init_logging;
use netescape::{Mission, Session};
use ui::app::App;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

fn main() {
    let (config, config_error) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    if !init_logging(&config.log) {
        eprintln!("Cannot open log file {}; logging disabled", config.log.file.display());
    }
    if let Some(e) = config_error {
        warn!(error = %e, "config not usable, running with defaults");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "net escape starting");

    let mission = Mission::with_virtual_clock(Session::default(), config.mission_settings());
    let mut app = App::new(mission, config.network_reset(), config.report_dir.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.sound_enabled { SoundEngine::new() } else { None };

    let result = game_loop(&mut app, &mut renderer, sound.as_ref(), config.frame_time());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        warn!(error = %e, "frame loop aborted");
        eprintln!("Game error: {e}");
    }

    let session = app.mission().session();
    info!(runs = session.runs_started(), failed = session.runs_failed(), "net escape closing");
    println!();
    println!("Thanks for playing Net Escape!");
    if let Some(path) = app.last_report() {
        println!("Last report: {}", path.display());
    }
}

fn game_loop(
    app: &mut App,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    frame: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }
        for &key in kb.pressed() {
            app.handle_key(key);
        }
        if app.should_quit() {
            break;
        }

        let now = Instant::now();
        let events = app.tick(now - last_tick);
        last_tick = now;
        sound::play_events(sound, &events);

        renderer.render(app)?;
        std::thread::sleep(frame);
    }

    Ok(())
}
