//! Arena Shooter - headless runner
//!
//! Usage: `arena-shooter [settings.json] [frames]`
//!
//! Plays one scripted round (fire every frame, sweep up and down) until game
//! over or the frame budget runs out, then logs the round summary.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use arena_shooter::sim::{LogGameOver, NullPresenter};
use arena_shooter::{Driver, FrameStatus, ManualScheduler, ScoreBoard, ScriptedInput, Settings};

const DEFAULT_FRAMES: u64 = 60 * 60 * 3;

fn main() {
    env_logger::init();
    log::info!("Arena Shooter (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map(PathBuf::from);
    let frames = match args.next().map(|raw| raw.parse::<u64>()) {
        Some(Ok(frames)) => frames,
        Some(Err(err)) => {
            log::warn!("Invalid frame count ({err}); running {DEFAULT_FRAMES} frames");
            DEFAULT_FRAMES
        }
        None => DEFAULT_FRAMES,
    };

    let settings = Settings::load_or_default(settings_path.as_deref());
    let (width, height) = (settings.arena_width, settings.arena_height);
    let board = Rc::new(RefCell::new(ScoreBoard::new(settings.frames_per_second)));

    let mut driver = Driver::new(settings, ManualScheduler::default(), board.clone())
        .with_presenter(NullPresenter)
        .with_game_over(LogGameOver);
    if let Err(err) = driver.attach_arena(width, height) {
        log::error!("{err}");
        std::process::exit(1);
    }
    driver.attach_input(sweep_script(frames));

    if let Err(err) = driver.start_round() {
        log::error!("Could not start round: {err}");
        std::process::exit(1);
    }

    match driver.run_frames(frames) {
        FrameStatus::Scheduled => log::info!("Frame budget of {frames} exhausted"),
        FrameStatus::Faulted => log::error!("Round aborted by a faulted frame"),
        FrameStatus::GameOver(_) | FrameStatus::Halted => {}
    }

    let board = board.borrow();
    log::info!("{}", board.summary());
    println!("{}", board.summary());
}

/// Fire every frame while sweeping vertically, one second each way
fn sweep_script(frames: u64) -> ScriptedInput {
    let mut input = ScriptedInput::default();
    for frame in 0..frames {
        let step = if (frame / 60) % 2 == 0 { "moveUp" } else { "moveDown" };
        input.push_frame(["fire", step]);
    }
    input
}
