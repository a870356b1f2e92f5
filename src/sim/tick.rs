//! Fixed-order frame tick
//!
//! One call advances the round by exactly one frame. Steps run in a fixed
//! order and each finishes before the next starts; removals are deferred so
//! no step sees a half-removed entity.

use std::collections::BTreeSet;

use super::actor::{Aim, Step, queue_shot_despawn};
use super::arena::SpawnOutcome;
use super::collision::Bounds;
use super::enemy::EnemyKind;
use super::hooks::Hooks;
use super::ids::{EntityRef, ProjectileId};
use super::projectile::Owner;
use super::state::{GameOverReason, GamePhase, GameState};

/// Discrete player action for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    /// Sorted last so a shot leaves from where the player ends up this frame
    Fire,
}

impl Action {
    /// Parse an input token (`moveUp`, `moveDown`, `moveLeft`, `moveRight`, `fire`)
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "moveUp" => Some(Action::MoveUp),
            "moveDown" => Some(Action::MoveDown),
            "moveLeft" => Some(Action::MoveLeft),
            "moveRight" => Some(Action::MoveRight),
            "fire" => Some(Action::Fire),
            _ => None,
        }
    }

    fn step(self) -> Option<Step> {
        match self {
            Action::MoveUp => Some(Step::Up),
            Action::MoveDown => Some(Step::Down),
            Action::MoveLeft => Some(Step::Left),
            Action::MoveRight => Some(Step::Right),
            Action::Fire => None,
        }
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Set on the single frame that ended the round
    pub game_over: Option<GameOverReason>,
    /// Set when a spawn was attempted this frame
    pub spawn: Option<SpawnOutcome>,
}

/// Advance the round by one frame. Does nothing unless the phase is `Playing`.
pub fn tick(state: &mut GameState, actions: &[Action], hooks: &mut Hooks<'_>) -> FrameOutcome {
    let mut outcome = FrameOutcome::default();
    if state.phase != GamePhase::Playing {
        return outcome;
    }
    state.frame += 1;

    state.frames_until_next_spawn = state.frames_until_next_spawn.saturating_sub(1);
    state.player.reload_next_shot();
    apply_actions(state, actions, hooks);

    resolve_player_shots(state, hooks);
    state.arena.clear_dead_enemies(hooks.presenter);
    state.player.despawn_expired_shots();

    if let Some(reason) = update_enemies(state, hooks) {
        declare_game_over(state, &mut outcome, reason);
    }
    if let Some(reason) = resolve_enemy_shots(state, hooks) {
        declare_game_over(state, &mut outcome, reason);
    }

    // A finished round spawns nothing more
    if outcome.game_over.is_none() {
        outcome.spawn = spawn_if_due(state, hooks);
    }
    outcome
}

fn declare_game_over(state: &mut GameState, outcome: &mut FrameOutcome, reason: GameOverReason) {
    if outcome.game_over.is_some() {
        return;
    }
    log::info!("Round over after {} frames: {reason:?}", state.frame);
    state.phase = GamePhase::GameOver;
    outcome.game_over = Some(reason);
}

/// Apply each distinct action once, moves before fire
fn apply_actions(state: &mut GameState, actions: &[Action], hooks: &mut Hooks<'_>) {
    let requested: BTreeSet<Action> = actions.iter().copied().collect();
    if requested.is_empty() {
        return;
    }

    let limits = state.metrics().bounds();
    let ctx = state.shot_context();
    for action in requested {
        match action.step() {
            Some(step) => state.player.step(step, &limits),
            None => {
                let fired =
                    state
                        .player
                        .fire(Owner::Player, Aim::Direct, &ctx, &mut state.arena.ids);
                if let Some(id) = fired {
                    show_new_shot(state.player.shots().get(&id).map(|s| s.body.bounds()), id, hooks);
                }
            }
        }
    }
    hooks
        .presenter
        .sync_position(EntityRef::Player, state.player.body.bounds());
}

fn show_new_shot(bounds: Option<&Bounds>, id: ProjectileId, hooks: &mut Hooks<'_>) {
    if let Some(bounds) = bounds {
        hooks.presenter.sync_position(EntityRef::Projectile(id), bounds);
        hooks.presenter.set_visible(EntityRef::Projectile(id), true);
    }
}

/// Move the player's shots and resolve them against living enemies.
///
/// Each shot hits at most one enemy: the first living one it overlaps in id
/// order. Dead enemies are skipped, not treated as the end of the scan.
fn resolve_player_shots(state: &mut GameState, hooks: &mut Hooks<'_>) {
    let metrics = *state.arena.metrics();
    let mut defeated = Vec::new();

    let (shots, expired) = state.player.shots_mut();
    let enemies = state.arena.enemies_mut();
    for (&shot_id, shot) in shots.iter_mut() {
        if !shot.active {
            continue;
        }
        shot.advance();
        hooks
            .presenter
            .sync_position(EntityRef::Projectile(shot_id), shot.body.bounds());

        let target = enemies
            .iter_mut()
            .filter(|(_, enemy)| enemy.actor.is_alive())
            .find(|(_, enemy)| shot.body.collides_with(&enemy.actor.body));

        if let Some((&enemy_id, enemy)) = target {
            let lethal = enemy.actor.take_hit(shot.damage);
            hooks.presenter.sync_health(
                EntityRef::Enemy(enemy_id),
                enemy.actor.health(),
                enemy.actor.max_health,
            );
            queue_shot_despawn(expired, shot_id, shot, hooks.presenter);
            if lethal {
                log::debug!("{enemy_id} ({:?}) defeated", enemy.kind);
                hooks.session.increment_defeated_enemy_counter();
                hooks.session.increase_score(enemy.point_value());
                defeated.push(enemy_id);
            }
        } else if metrics.is_out_of_bounds(&shot.body) {
            queue_shot_despawn(expired, shot_id, shot, hooks.presenter);
        }
    }

    for id in defeated {
        state.arena.queue_enemy_despawn(id, hooks.presenter);
    }
}

/// Cooldown, facing, firing and movement for every living enemy.
///
/// Returns the first enemy that left the arena this frame.
fn update_enemies(state: &mut GameState, hooks: &mut Hooks<'_>) -> Option<GameOverReason> {
    let ctx = state.shot_context();
    let metrics = *state.arena.metrics();
    let player = state.player.body.position();
    let mut breach = None;

    let (enemies, ids) = state.arena.enemies_and_ids_mut();
    for (&id, enemy) in enemies.iter_mut() {
        if !enemy.actor.is_alive() {
            continue;
        }
        enemy.actor.reload_next_shot();
        enemy.face_player(player);
        if let Some(shot_id) = enemy.fire(id, player, &ctx, ids) {
            show_new_shot(
                enemy.actor.shots().get(&shot_id).map(|s| s.body.bounds()),
                shot_id,
                hooks,
            );
        }

        enemy.actor.body.advance();
        hooks
            .presenter
            .sync_position(EntityRef::Enemy(id), enemy.actor.body.bounds());
        if breach.is_none() && metrics.is_out_of_bounds(&enemy.actor.body) {
            log::info!("{id} ({:?}) left the arena", enemy.kind);
            breach = Some(GameOverReason::EnemyBreached(id));
        }
    }
    breach
}

/// Move every enemy-owned shot (dead owners included) and resolve it
/// against the player. Resolved shots leave their owner's map here.
fn resolve_enemy_shots(state: &mut GameState, hooks: &mut Hooks<'_>) -> Option<GameOverReason> {
    let metrics = *state.arena.metrics();
    let player = &mut state.player;
    let mut defeat = None;

    for enemy in state.arena.enemies_mut().values_mut() {
        let (shots, expired) = enemy.actor.shots_mut();
        for (&shot_id, shot) in shots.iter_mut() {
            if !shot.active {
                continue;
            }
            shot.advance();
            hooks
                .presenter
                .sync_position(EntityRef::Projectile(shot_id), shot.body.bounds());

            if player.is_alive() && shot.body.collides_with(&player.body) {
                let lethal = player.take_hit(shot.damage);
                hooks
                    .presenter
                    .sync_health(EntityRef::Player, player.health(), player.max_health);
                queue_shot_despawn(expired, shot_id, shot, hooks.presenter);
                if lethal {
                    defeat = Some(GameOverReason::PlayerDefeated);
                }
            } else if metrics.is_out_of_bounds(&shot.body) {
                queue_shot_despawn(expired, shot_id, shot, hooks.presenter);
            }
        }
        enemy.actor.despawn_expired_shots();
    }
    defeat
}

/// Spawn the next enemy once the timer has run out and the cap allows it
fn spawn_if_due(state: &mut GameState, hooks: &mut Hooks<'_>) -> Option<SpawnOutcome> {
    if state.frames_until_next_spawn > 0
        || state.arena.living_enemy_count() >= state.settings.max_simultaneous_enemies
    {
        return None;
    }

    let kind = EnemyKind::for_spawn(state.spawn_count);
    let outcome = state.arena.add_enemy_at_random(
        kind,
        &state.player.body,
        &mut state.rng,
        state.settings.spawn_placement_retries,
        state.settings.frames_per_second,
        hooks.presenter,
    );
    // The attempt counts even when placement gave up
    state.frames_until_next_spawn = state.settings.spawn_interval_frames();
    state.spawn_count += 1;
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::Enemy;
    use crate::sim::hooks::{NullPresenter, Session};
    use crate::sim::ids::EnemyId;
    use crate::sim::projectile::Projectile;
    use glam::Vec2;

    #[derive(Debug, Default)]
    struct Tally {
        defeated: u32,
        score: u32,
    }

    impl Session for Tally {
        fn increment_defeated_enemy_counter(&mut self) {
            self.defeated += 1;
        }
        fn increase_score(&mut self, points: u32) {
            self.score += points;
        }
        fn start_clock(&mut self) {}
        fn stop_clock(&mut self) {}
        fn reset_score(&mut self) {
            *self = Self::default();
        }
    }

    fn quiet_settings() -> Settings {
        Settings {
            initial_spawn_delay_frames: u32::MAX,
            ..Settings::default()
        }
    }

    fn playing(settings: Settings) -> GameState {
        let mut state = GameState::new(settings).unwrap();
        state.reset_round(&mut NullPresenter);
        state
    }

    fn run(state: &mut GameState, actions: &[Action], tally: &mut Tally) -> FrameOutcome {
        let mut presenter = NullPresenter;
        let mut hooks = Hooks {
            presenter: &mut presenter,
            session: tally,
        };
        tick(state, actions, &mut hooks)
    }

    fn shot_at(owner: Owner, damage: i32, position: Vec2, velocity: Vec2) -> Projectile {
        let mut shot = Projectile::new(owner, damage, velocity, Vec2::new(24.0, 12.0));
        shot.body.set_position(position);
        shot
    }

    fn enemy_at(state: &mut GameState, kind: EnemyKind, position: Vec2) -> EnemyId {
        let metrics = *state.metrics();
        let mut enemy = Enemy::new(kind, &metrics, 60);
        enemy.actor.body.set_position(position);
        enemy.actor.visible = true;
        state.arena.insert_enemy(enemy)
    }

    #[test]
    fn test_action_tokens() {
        assert_eq!(Action::parse("moveUp"), Some(Action::MoveUp));
        assert_eq!(Action::parse("moveRight"), Some(Action::MoveRight));
        assert_eq!(Action::parse("fire"), Some(Action::Fire));
        assert_eq!(Action::parse("jump"), None);
        assert_eq!(Action::parse("Fire"), None);
    }

    #[test]
    fn test_no_frame_outside_playing() {
        let mut state = GameState::new(quiet_settings()).unwrap();
        let mut tally = Tally::default();
        assert_eq!(run(&mut state, &[Action::MoveUp], &mut tally), FrameOutcome::default());
        assert_eq!(state.frame, 0);

        state.reset_round(&mut NullPresenter);
        state.phase = GamePhase::Paused;
        let before = state.player.body.position();
        run(&mut state, &[Action::MoveUp], &mut tally);
        assert_eq!(state.player.body.position(), before);
    }

    #[test]
    fn test_duplicate_actions_apply_once() {
        let mut a = playing(quiet_settings());
        let mut b = playing(quiet_settings());
        let mut tally = Tally::default();

        run(&mut a, &[Action::MoveRight, Action::Fire], &mut tally);
        run(
            &mut b,
            &[Action::Fire, Action::MoveRight, Action::MoveRight, Action::Fire],
            &mut tally,
        );
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_eq!(a.player.shots().len(), 1);
        assert_eq!(a.player.body.position().x, 28.0);
    }

    #[test]
    fn test_shot_leaves_from_new_facing() {
        let mut state = playing(quiet_settings());
        let mut tally = Tally::default();
        // Room on the left so the shot stays inside the arena
        state.player.body.set_position(Vec2::new(600.0, 300.0));
        run(&mut state, &[Action::Fire, Action::MoveLeft], &mut tally);
        let shot = state.player.shots().values().next().unwrap();
        assert!(shot.body.velocity.x < 0.0);
        assert!(shot.body.position().x < state.player.body.position().x);
    }

    #[test]
    fn test_player_defeated_exactly_once() {
        let mut state = playing(quiet_settings());
        let mut tally = Tally::default();
        let id = enemy_at(&mut state, EnemyKind::Charger, Vec2::new(1100.0, 100.0));

        // A dead shooter's shots still count
        state.arena.enemies_mut().get_mut(&id).unwrap().actor.take_hit(1000);
        state.arena.queue_enemy_despawn(id, &mut NullPresenter);

        let target = state.player.body.position();
        let actor = &mut state.arena.enemies_mut().get_mut(&id).unwrap().actor;
        let (shots, _) = actor.shots_mut();
        for n in 0..4 {
            shots.insert(ProjectileId(100 + n), shot_at(Owner::Enemy(id), 30, target, Vec2::ZERO));
        }

        let outcome = run(&mut state, &[], &mut tally);
        assert_eq!(outcome.game_over, Some(GameOverReason::PlayerDefeated));
        assert_eq!(state.player.health(), 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(outcome.spawn, None);

        let outcome = run(&mut state, &[], &mut tally);
        assert_eq!(outcome.game_over, None);
    }

    #[test]
    fn test_enemy_scored_once() {
        let mut state = playing(quiet_settings());
        let mut tally = Tally::default();
        let position = Vec2::new(900.0, 300.0);
        let id = enemy_at(&mut state, EnemyKind::Charger, position);

        let (shots, _) = state.player.shots_mut();
        for (n, damage) in [30, 30, 40, 30].into_iter().enumerate() {
            shots.insert(
                ProjectileId(100 + n as u32),
                shot_at(Owner::Player, damage, position, Vec2::ZERO),
            );
        }

        run(&mut state, &[], &mut tally);
        assert_eq!(tally.defeated, 1);
        assert_eq!(tally.score, 50);
        // No shots of its own in flight: removed in the same frame
        assert!(state.arena.enemy(id).is_none());
        // The fourth shot found no living target and flies on
        assert_eq!(state.player.shots().len(), 1);
        assert!(state.player.shots()[&ProjectileId(103)].active);
    }

    #[test]
    fn test_scan_skips_dead_enemies() {
        let mut state = playing(quiet_settings());
        let mut tally = Tally::default();
        let position = Vec2::new(900.0, 300.0);
        let first = enemy_at(&mut state, EnemyKind::Charger, position);
        let second = enemy_at(&mut state, EnemyKind::Tank, position);

        // First enemy dead but waiting on its own shot
        let actor = &mut state.arena.enemies_mut().get_mut(&first).unwrap().actor;
        actor.take_hit(1000);
        let (shots, _) = actor.shots_mut();
        shots.insert(
            ProjectileId(50),
            shot_at(Owner::Enemy(first), 10, Vec2::new(1000.0, 20.0), Vec2::ZERO),
        );
        state.arena.queue_enemy_despawn(first, &mut NullPresenter);

        let (shots, _) = state.player.shots_mut();
        shots.insert(ProjectileId(60), shot_at(Owner::Player, 30, position, Vec2::ZERO));

        run(&mut state, &[], &mut tally);
        assert_eq!(state.arena.enemy(second).unwrap().actor.health(), 270);
        assert!(state.arena.enemy(first).is_some());
    }

    #[test]
    fn test_shot_out_of_bounds_on_exact_frame() {
        let mut state = playing(quiet_settings());
        let mut tally = Tally::default();
        let (shots, _) = state.player.shots_mut();
        let id = ProjectileId(100);
        shots.insert(
            id,
            shot_at(Owner::Player, 30, Vec2::new(1192.0, 300.0), Vec2::new(10.0, 0.0)),
        );

        // Left edge at 1190: still overlapping
        run(&mut state, &[], &mut tally);
        assert!(state.player.shots().contains_key(&id));
        // Left edge at 1200: only touching, so out
        run(&mut state, &[], &mut tally);
        assert!(!state.player.shots().contains_key(&id));
    }

    #[test]
    fn test_dead_enemy_waits_for_shots() {
        let mut state = playing(quiet_settings());
        let mut tally = Tally::default();
        let id = enemy_at(&mut state, EnemyKind::Charger, Vec2::new(1000.0, 100.0));
        let shot_id = ProjectileId(100);

        let actor = &mut state.arena.enemies_mut().get_mut(&id).unwrap().actor;
        actor.take_hit(1000);
        let (shots, _) = actor.shots_mut();
        shots.insert(
            shot_id,
            shot_at(Owner::Enemy(id), 20, Vec2::new(900.0, 50.0), Vec2::new(-5.0, 0.0)),
        );
        state.arena.queue_enemy_despawn(id, &mut NullPresenter);

        run(&mut state, &[], &mut tally);
        let enemy = state.arena.enemy(id).unwrap();
        assert!(!enemy.actor.visible);
        assert_eq!(enemy.actor.shots()[&shot_id].body.position().x, 895.0);

        // Push the shot off the arena: it resolves and leaves the map
        let actor = &mut state.arena.enemies_mut().get_mut(&id).unwrap().actor;
        let (shots, _) = actor.shots_mut();
        shots
            .get_mut(&shot_id)
            .unwrap()
            .body
            .set_position(Vec2::new(-20.0, 50.0));
        run(&mut state, &[], &mut tally);
        let enemy = state.arena.enemy(id).unwrap();
        assert!(!enemy.actor.has_live_shots());

        // Now nothing references it
        run(&mut state, &[], &mut tally);
        assert!(state.arena.enemy(id).is_none());
        assert!(state.arena.despawn_queue().is_empty());
    }

    #[test]
    fn test_spawn_on_timer() {
        let mut state = playing(Settings {
            initial_spawn_delay_frames: 2,
            ..Settings::default()
        });
        let mut tally = Tally::default();

        assert_eq!(run(&mut state, &[], &mut tally).spawn, None);
        let outcome = run(&mut state, &[], &mut tally);
        assert_eq!(outcome.spawn, Some(SpawnOutcome::Placed(EnemyId(1))));
        assert_eq!(state.arena.enemy(EnemyId(1)).unwrap().kind, EnemyKind::Charger);
        assert_eq!(state.spawn_count, 1);
        assert_eq!(state.frames_until_next_spawn, 300);
    }

    #[test]
    fn test_spawn_abort_still_counts() {
        let mut state = playing(Settings {
            initial_spawn_delay_frames: 1,
            ..Settings::default()
        });
        let mut tally = Tally::default();
        // Player covers the whole arena
        state.player.body.set_size(Vec2::new(1200.0, 600.0));
        state.player.body.set_position(Vec2::new(600.0, 300.0));

        let outcome = run(&mut state, &[], &mut tally);
        assert_eq!(outcome.spawn, Some(SpawnOutcome::Aborted { retries: 5 }));
        assert!(state.arena.enemies().is_empty());
        assert_eq!(state.spawn_count, 1);
        assert_eq!(state.frames_until_next_spawn, 300);
    }

    #[test]
    fn test_long_spawn_interval_saturates() {
        let mut state = playing(Settings {
            initial_spawn_delay_frames: 1,
            seconds_between_spawns: 100_000_000,
            ..Settings::default()
        });
        let mut tally = Tally::default();

        let outcome = run(&mut state, &[], &mut tally);
        assert_eq!(outcome.spawn, Some(SpawnOutcome::Placed(EnemyId(1))));
        assert_eq!(state.frames_until_next_spawn, u32::MAX);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut state = playing(Settings {
            initial_spawn_delay_frames: 1,
            max_simultaneous_enemies: 1,
            ..Settings::default()
        });
        let mut tally = Tally::default();
        enemy_at(&mut state, EnemyKind::Tank, Vec2::new(1000.0, 500.0));

        assert_eq!(run(&mut state, &[], &mut tally).spawn, None);
        assert_eq!(state.frames_until_next_spawn, 0);
        assert_eq!(state.spawn_count, 0);
    }

    #[test]
    fn test_determinism() {
        let settings = Settings {
            initial_spawn_delay_frames: 10,
            seconds_between_spawns: 1,
            ..Settings::default()
        };
        let mut a = playing(settings.clone());
        let mut b = playing(settings);
        let mut tally_a = Tally::default();
        let mut tally_b = Tally::default();

        for frame in 0..600 {
            let mut actions = vec![Action::Fire];
            actions.push(if frame % 120 < 60 {
                Action::MoveUp
            } else {
                Action::MoveDown
            });
            run(&mut a, &actions, &mut tally_a);
            run(&mut b, &actions, &mut tally_b);
        }

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_eq!(tally_a.score, tally_b.score);
        assert!(a.spawn_count > 0);
    }
}
