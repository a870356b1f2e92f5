//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-counted timers only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies; collaborators are reached
//!   through the traits in `hooks`

pub mod actor;
pub mod arena;
pub mod body;
pub mod collision;
pub mod enemy;
pub mod hooks;
pub mod ids;
pub mod projectile;
pub mod state;
pub mod tick;

pub use actor::{Actor, ActorProfile, Facing, FireBehavior, FireState, PLAYER_PROFILE};
pub use arena::{Arena, ArenaMetrics, SpawnOutcome};
pub use body::Body;
pub use collision::{Bounds, overlaps};
pub use enemy::{Enemy, EnemyKind};
pub use hooks::{GameOverHandler, Hooks, LogGameOver, NullPresenter, Presenter, Session};
pub use ids::{EnemyId, EntityRef, ProjectileId};
pub use projectile::{Owner, Projectile};
pub use state::{GameOverReason, GamePhase, GameState};
pub use tick::{Action, FrameOutcome, tick};
