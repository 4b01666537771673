//! Swarmfall - headless autopilot driver
//!
//! Plays runs without a window: the autopilot kites away from the swarm,
//! picks the first upgrade offered and stops when the player dies or the
//! time limit is reached. Useful for soak-testing the simulation.
//!
//! Usage: `swarmfall [settings.json] [save.json]`

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use swarmfall::audio::{AudioManager, SilentBackend};
use swarmfall::persistence::JsonFilePersistence;
use swarmfall::sim::{CharacterKind, FieldBounds, GamePhase, Run, TickInput};
use swarmfall::{GameLoop, ManualScheduler, Session, Settings};

/// Simulated milliseconds per frame
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Give up after this much simulated time
const MAX_RUN_SECONDS: f64 = 600.0;
/// Enemies closer than this push the autopilot away
const DANGER_RADIUS: f32 = 220.0;

/// Steer away from nearby enemies, drifting back towards the middle
fn autopilot(run: &Run) -> TickInput {
    let Some(player) = run.store.player() else {
        return TickInput::default();
    };

    let mut push = (run.field.center() - player.pos) * 0.002;
    for enemy in run.store.enemies().iter().filter(|e| e.is_alive()) {
        let away = player.pos - enemy.body.pos;
        let dist = away.length();
        if dist > 0.0 && dist < DANGER_RADIUS {
            push += away / dist * (1.0 - dist / DANGER_RADIUS);
        }
    }

    let threshold = 0.1;
    TickInput {
        left: push.x < -threshold,
        right: push.x > threshold,
        up: push.y < -threshold,
        down: push.y > threshold,
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings_path = PathBuf::from(args.next().unwrap_or_else(|| "swarmfall-settings.json".to_string()));
    let save_path = PathBuf::from(args.next().unwrap_or_else(|| "swarmfall-save.json".to_string()));

    let settings = Settings::load_from(&settings_path);
    let field = FieldBounds::default();

    log::info!("Swarmfall (headless) starting...");
    let mut session = Session::new(settings.clone(), Box::new(JsonFilePersistence::new(save_path)), field);
    session.add_sink(Box::new(AudioManager::from_settings(SilentBackend, &settings)));
    session.start();

    let character = [CharacterKind::Engineer, CharacterKind::Summoner, CharacterKind::Gunner]
        .into_iter()
        .find(|&c| session.save_data().is_unlocked(c))
        .unwrap_or_default();
    session.begin(character);

    let session = Rc::new(RefCell::new(session));
    let frames = Rc::new(RefCell::new(0u64));

    let update_session = session.clone();
    let update = move |dt: f32| {
        let mut s = update_session.borrow_mut();
        if s.phase() == GamePhase::LevelUp {
            s.choose_upgrade(0);
        }
        let input = autopilot(s.run());
        s.frame(&input, dt, field);
    };
    let render_frames = frames.clone();
    let render = move |_dt: f32| {
        *render_frames.borrow_mut() += 1;
    };

    let mut game_loop = GameLoop::new(ManualScheduler::new(), update, render);
    let mut now = 0.0;
    game_loop.start(now);
    while game_loop.scheduler_mut().take().is_some() {
        now += FRAME_MS;
        game_loop.on_frame(now);

        let phase = session.borrow().phase();
        if matches!(phase, GamePhase::GameOver | GamePhase::Ended) {
            game_loop.stop();
        } else if now / 1000.0 >= MAX_RUN_SECONDS {
            session.borrow_mut().end_run();
            game_loop.stop();
        }
    }

    let session = session.borrow();
    let stats = &session.run().stats;
    log::info!(
        "{} run over after {} frames: score {}, wave {}, level {}, {} kills, best combo {}, {} bosses",
        character.as_str(),
        frames.borrow(),
        stats.score,
        stats.wave,
        stats.level,
        stats.kills,
        stats.max_combo,
        stats.bosses_defeated
    );
    if let Some(rank) = session.last_rank() {
        log::info!("High score rank #{rank}");
    }
    log::info!(
        "Currency {} ({} lifetime runs)",
        session.save_data().currency,
        session.save_data().lifetime.runs
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts embed the library directly
}
