//! Contracts with the collaborators the simulation notifies
//!
//! Rendering, score widgets and game-over dialogs live outside the core.
//! The simulation only calls these fire-and-forget hooks.

use std::cell::RefCell;
use std::rc::Rc;

use super::collision::Bounds;
use super::ids::EntityRef;
use super::state::GameOverReason;

/// Visual sync notifications. Every method defaults to a no-op.
pub trait Presenter {
    /// Position or size of an entity changed
    fn sync_position(&mut self, _entity: EntityRef, _bounds: &Bounds) {}
    /// Health of an actor changed
    fn sync_health(&mut self, _entity: EntityRef, _current: i32, _max: i32) {}
    /// Entity shown or hidden without leaving the registry
    fn set_visible(&mut self, _entity: EntityRef, _visible: bool) {}
    /// Entity's visual presence removed for good
    fn detach(&mut self, _entity: EntityRef) {}
}

/// Score and survival-clock collaborator
pub trait Session {
    fn increment_defeated_enemy_counter(&mut self);
    fn increase_score(&mut self, points: u32);
    fn start_clock(&mut self);
    fn stop_clock(&mut self);
    fn reset_score(&mut self);
    /// One simulation frame finished; frame-counted clocks advance here
    fn frame_elapsed(&mut self) {}
}

/// Receives the single game-over notification of a round
pub trait GameOverHandler {
    fn on_game_over(&mut self, reason: GameOverReason);
}

/// Presenter that renders nothing (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// Game-over handler that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogGameOver;

impl GameOverHandler for LogGameOver {
    fn on_game_over(&mut self, reason: GameOverReason) {
        log::info!("Game over: {reason:?}");
    }
}

/// Collaborators borrowed for the duration of one frame
pub struct Hooks<'a> {
    pub presenter: &'a mut dyn Presenter,
    pub session: &'a mut dyn Session,
}

// Shared handles, so a host can keep reading a collaborator it lent out.

impl<T: Presenter + ?Sized> Presenter for Rc<RefCell<T>> {
    fn sync_position(&mut self, entity: EntityRef, bounds: &Bounds) {
        self.borrow_mut().sync_position(entity, bounds);
    }
    fn sync_health(&mut self, entity: EntityRef, current: i32, max: i32) {
        self.borrow_mut().sync_health(entity, current, max);
    }
    fn set_visible(&mut self, entity: EntityRef, visible: bool) {
        self.borrow_mut().set_visible(entity, visible);
    }
    fn detach(&mut self, entity: EntityRef) {
        self.borrow_mut().detach(entity);
    }
}

impl<T: Session + ?Sized> Session for Rc<RefCell<T>> {
    fn increment_defeated_enemy_counter(&mut self) {
        self.borrow_mut().increment_defeated_enemy_counter();
    }
    fn increase_score(&mut self, points: u32) {
        self.borrow_mut().increase_score(points);
    }
    fn start_clock(&mut self) {
        self.borrow_mut().start_clock();
    }
    fn stop_clock(&mut self) {
        self.borrow_mut().stop_clock();
    }
    fn reset_score(&mut self) {
        self.borrow_mut().reset_score();
    }
    fn frame_elapsed(&mut self) {
        self.borrow_mut().frame_elapsed();
    }
}

impl<T: GameOverHandler + ?Sized> GameOverHandler for Rc<RefCell<T>> {
    fn on_game_over(&mut self, reason: GameOverReason) {
        self.borrow_mut().on_game_over(reason);
    }
}
