//! Frame driver: round lifecycle, pause/resume and frame scheduling
//!
//! The host owns the clock. It calls [`Driver::play_frame`] whenever a frame
//! it was asked for through the [`Scheduler`] comes due. A frame always runs
//! to completion; the next one is only requested while the round is playing.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::error::InitError;
use crate::settings::Settings;
use crate::sim::arena::ArenaMetrics;
use crate::sim::hooks::{GameOverHandler, Hooks, LogGameOver, NullPresenter, Presenter, Session};
use crate::sim::state::{GameOverReason, GamePhase, GameState};
use crate::sim::tick::{Action, tick};

/// Token for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side frame scheduling (an animation-frame callback, a timer, a test)
pub trait Scheduler {
    /// Ask for one more frame
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a frame that has not run yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler the caller pumps by hand (headless runs and tests)
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Option<FrameHandle>,
}

impl ManualScheduler {
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Take the frame that is due, if any
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Source of already-debounced action tokens, polled once per frame
pub trait InputSource {
    fn poll_actions(&mut self) -> Vec<String>;
}

impl<T: InputSource + ?Sized> InputSource for Rc<RefCell<T>> {
    fn poll_actions(&mut self) -> Vec<String> {
        self.borrow_mut().poll_actions()
    }
}

/// Replays a fixed list of per-frame tokens, then reports no input
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<String>>,
}

impl ScriptedInput {
    pub fn new<I, F, T>(frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut input = Self::default();
        for frame in frames {
            input.push_frame(frame);
        }
        input
    }

    pub fn push_frame<F, T>(&mut self, tokens: F)
    where
        F: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.frames
            .push_back(tokens.into_iter().map(Into::into).collect());
    }
}

impl InputSource for ScriptedInput {
    fn poll_actions(&mut self) -> Vec<String> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// What happened to the loop after one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Next frame requested
    Scheduled,
    /// Nothing ran or the loop stopped (paused, no round)
    Halted,
    /// The round ended on this frame; the handler has been notified
    GameOver(GameOverReason),
    /// The frame panicked; pending removals were flushed and the loop stopped
    Faulted,
}

/// Owns the game state and its collaborators and runs the frame loop
pub struct Driver<S: Scheduler> {
    settings: Settings,
    scheduler: S,
    arena_size: Option<(f32, f32)>,
    input: Option<Box<dyn InputSource>>,
    presenter: Box<dyn Presenter>,
    session: Box<dyn Session>,
    game_over: Box<dyn GameOverHandler>,
    state: Option<GameState>,
    frame_request: Option<FrameHandle>,
}

impl<S: Scheduler> Driver<S> {
    pub fn new(settings: Settings, scheduler: S, session: impl Session + 'static) -> Self {
        Self {
            settings,
            scheduler,
            arena_size: None,
            input: None,
            presenter: Box::new(NullPresenter),
            session: Box::new(session),
            game_over: Box::new(LogGameOver),
            state: None,
            frame_request: None,
        }
    }

    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn with_game_over(mut self, handler: impl GameOverHandler + 'static) -> Self {
        self.game_over = Box::new(handler);
        self
    }

    /// Record the arena size the host measured
    pub fn attach_arena(&mut self, width: f32, height: f32) -> Result<(), InitError> {
        ArenaMetrics::new(width, height)?;
        self.arena_size = Some((width, height));
        log::info!("Arena attached: {width}x{height}");
        Ok(())
    }

    pub fn attach_input(&mut self, input: impl InputSource + 'static) {
        self.input = Some(Box::new(input));
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == Some(GamePhase::Playing)
    }

    pub fn is_paused(&self) -> bool {
        self.phase() == Some(GamePhase::Paused)
    }

    fn phase(&self) -> Option<GamePhase> {
        self.state.as_ref().map(|s| s.phase)
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if let Some(state) = self.state.as_mut() {
            state.phase = phase;
        }
    }

    fn schedule(&mut self) {
        if self.frame_request.is_none() {
            self.frame_request = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_scheduled(&mut self) {
        if let Some(handle) = self.frame_request.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Start a fresh round: reset every entity, zero the score, start the
    /// clock and schedule the first frame.
    pub fn start_round(&mut self) -> Result<(), InitError> {
        let (width, height) = self.arena_size.ok_or(InitError::MissingArena)?;
        if self.input.is_none() {
            return Err(InitError::MissingInput);
        }

        self.cancel_scheduled();
        self.session.stop_clock();

        if self.state.is_none() {
            self.state = Some(GameState::with_arena(self.settings.clone(), width, height)?);
        }
        let Some(state) = self.state.as_mut() else {
            return Err(InitError::MissingArena);
        };
        let metrics = *state.metrics();
        if metrics.width != width || metrics.height != height {
            state.resize(width, height)?;
        }
        state.reset_round(self.presenter.as_mut());

        self.session.reset_score();
        self.session.start_clock();
        log::info!("Round started");
        self.schedule();
        Ok(())
    }

    /// Run the frame that came due
    pub fn play_frame(&mut self) -> FrameStatus {
        // The request that woke us is spent
        self.frame_request = None;

        let Some(state) = self.state.as_mut() else {
            return FrameStatus::Halted;
        };
        if state.phase != GamePhase::Playing {
            return FrameStatus::Halted;
        }

        let tokens = self
            .input
            .as_mut()
            .map(|input| input.poll_actions())
            .unwrap_or_default();
        let actions = parse_actions(&tokens);

        let presenter = self.presenter.as_mut();
        let session = self.session.as_mut();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut hooks = Hooks { presenter, session };
            tick(state, &actions, &mut hooks)
        }));

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                log::error!(
                    "Frame {} panicked ({}); flushing pending despawns and halting",
                    state.frame,
                    panic_message(&*payload)
                );
                state.flush_pending_despawns(self.presenter.as_mut());
                state.phase = GamePhase::Standby;
                self.session.stop_clock();
                return FrameStatus::Faulted;
            }
        };

        self.session.frame_elapsed();

        if let Some(reason) = outcome.game_over {
            self.session.stop_clock();
            log::info!("Game over at frame {}: {reason:?}", state.frame);
            self.game_over.on_game_over(reason);
            return FrameStatus::GameOver(reason);
        }

        if state.phase == GamePhase::Playing {
            self.schedule();
            FrameStatus::Scheduled
        } else {
            FrameStatus::Halted
        }
    }

    /// Pause a playing round or resume a paused one. Returns true when the
    /// round is paused afterwards.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase() {
            Some(GamePhase::Playing) => {
                self.set_phase(GamePhase::Paused);
                self.cancel_scheduled();
                self.session.stop_clock();
                log::info!("Paused");
                true
            }
            Some(GamePhase::Paused) => {
                self.set_phase(GamePhase::Playing);
                self.session.start_clock();
                self.schedule();
                log::info!("Resumed");
                false
            }
            _ => false,
        }
    }

    /// The arena changed size: re-derive metrics and start over
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), InitError> {
        self.attach_arena(width, height)?;
        if self.state.is_some() {
            self.start_round()?;
        }
        Ok(())
    }
}

impl Driver<ManualScheduler> {
    /// Play due frames until the loop halts or `max_frames` have run
    pub fn run_frames(&mut self, max_frames: u64) -> FrameStatus {
        let mut status = FrameStatus::Halted;
        for _ in 0..max_frames {
            if self.scheduler.take_due().is_none() {
                return FrameStatus::Halted;
            }
            status = self.play_frame();
            if status != FrameStatus::Scheduled {
                break;
            }
        }
        status
    }
}

fn parse_actions(tokens: &[String]) -> Vec<Action> {
    tokens
        .iter()
        .filter_map(|token| {
            let action = Action::parse(token);
            if action.is_none() {
                log::trace!("Ignoring unknown input token {token:?}");
            }
            action
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
