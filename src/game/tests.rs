use glam::{Vec2, Vec3};

use super::*;
use crate::input::{KeyCode, MouseButton};
use crate::scene::colors;

const DT: f32 = 1.0 / 60.0;
const VIEWPORT: (u32, u32) = (800, 450);

fn idle() -> FrameInput {
    FrameInput::idle(DT, VIEWPORT)
}

fn new_game() -> Game {
    Game::new(GameConfig::default(), LevelSet::builtin().unwrap())
}

/// A game already past the menu, standing at the spawn point.
fn playing_game() -> Game {
    let mut game = new_game();
    game.state = GameState::Playing;
    game.begin_run();
    game
}

fn run_idle(game: &mut Game, frames: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..frames {
        events.extend(game.update(&idle()));
    }
    events
}

fn touch_marker(game: &mut Game) -> Vec<GameEvent> {
    game.camera.position = game.marker;
    game.update(&idle())
}

/// Standing on the first platform of the first grapple level.
fn grapple_stage() -> Game {
    let mut game = playing_game();
    touch_marker(&mut game);
    touch_marker(&mut game);
    run_idle(&mut game, 30);
    game
}

fn count(events: &[GameEvent], wanted: GameEvent) -> usize {
    events.iter().filter(|event| **event == wanted).count()
}

#[test]
fn intro_leads_to_start_screen() {
    let mut game = new_game();
    assert_eq!(game.state(), GameState::Intro);

    let mut frames = 0;
    let mut events = Vec::new();
    while game.state() == GameState::Intro {
        events.extend(game.update(&idle()));
        frames += 1;
        assert!(frames < 1000, "intro never ended");
    }
    assert_eq!(game.state(), GameState::Start);
    assert!((400..=430).contains(&frames), "{frames} frames");
    assert_eq!(
        events,
        vec![GameEvent::StateChanged {
            from: GameState::Intro,
            to: GameState::Start,
        }]
    );
    assert!(game.intro.is_done());
}

#[test]
fn play_button_starts_the_run() {
    let mut game = new_game();
    game.state = GameState::Start;

    let miss = idle()
        .with_mouse_at(Vec2::new(10.0, 10.0))
        .with_mouse_pressed(MouseButton::LEFT);
    game.update(&miss);
    assert_eq!(game.state(), GameState::Start);
    assert!(!game.wants_mouse_captured());

    let hit = idle()
        .with_mouse_at(Vec2::new(400.0, 225.0))
        .with_mouse_pressed(MouseButton::LEFT);
    game.update(&hit);
    assert_eq!(game.state(), GameState::Playing);
    assert!(game.wants_mouse_captured());
    assert_eq!(game.camera().position, Vec3::ZERO);
}

#[test]
fn enter_also_confirms_the_menu() {
    let mut game = new_game();
    game.state = GameState::Start;
    game.update(&idle().with_key_pressed(KeyCode::ENTER));
    assert_eq!(game.state(), GameState::Playing);
}

#[test]
fn player_lands_on_the_first_platform() {
    let mut game = playing_game();
    run_idle(&mut game, 60);
    assert_eq!(game.current_ground(), Some(0));
    assert!(game.physics.player.is_grounded);
    assert!((game.camera().position.y + 0.5).abs() < 1e-4);
}

#[test]
fn jump_needs_ground_and_emits_cue() {
    let mut game = playing_game();
    let events = game.update(&idle().with_key_pressed(KeyCode::SPACE));
    assert_eq!(count(&events, GameEvent::Jumped), 0);

    run_idle(&mut game, 60);
    let events = game.update(&idle().with_key_pressed(KeyCode::SPACE));
    assert_eq!(count(&events, GameEvent::Jumped), 1);
    run_idle(&mut game, 5);
    assert!(game.camera().position.y > -0.5);
}

#[test]
fn escape_toggles_mouse_capture() {
    let mut game = playing_game();
    assert!(game.wants_mouse_captured());
    game.update(&idle().with_key_pressed(KeyCode::ESCAPE));
    assert!(!game.wants_mouse_captured());
    game.update(&idle().with_key_pressed(KeyCode::ESCAPE));
    assert!(game.wants_mouse_captured());
}

#[test]
fn platform_wobbles_after_standing_still_and_jump_resets_timer() {
    let mut game = playing_game();
    run_idle(&mut game, 120);
    assert!(game.unstable_timer() > 0.0);
    assert!(game.unstable_timer() < 3.0);
    assert_eq!(game.platforms()[0].tilt(), 0.0);

    run_idle(&mut game, 120);
    assert!(game.unstable_timer() >= 3.0);
    assert_ne!(game.platforms()[0].tilt(), 0.0);
    assert_ne!(game.platforms()[0].position().x, 0.0);

    game.update(&idle().with_key_pressed(KeyCode::SPACE));
    game.update(&idle());
    assert_eq!(game.unstable_timer(), 0.0);
    assert_eq!(game.platforms()[0].tilt(), 0.0);
    assert_eq!(game.physics.ground.orient, 0.0);
}

#[test]
fn strafing_on_a_wobbling_platform_adds_side_push() {
    let strafe = idle().with_key_held(KeyCode::Character('D'));

    let mut steady = playing_game();
    run_idle(&mut steady, 30);
    for _ in 0..10 {
        steady.update(&strafe);
    }
    assert_eq!(steady.physics.player.velocity.x, 0.0);
    assert_eq!(steady.physics.player.position.x, 0.0);

    let mut idle_game = playing_game();
    let mut strafing = playing_game();
    run_idle(&mut idle_game, 220);
    run_idle(&mut strafing, 220);
    assert!(strafing.unstable_timer() >= 3.0);
    let start_z = strafing.camera().position.z;
    assert_eq!(idle_game.camera().position.z, start_z);

    for _ in 0..10 {
        idle_game.update(&idle());
        strafing.update(&strafe);
    }
    assert_eq!(strafing.current_ground(), Some(0));
    let push_per_frame = (10.0 * DT) / 75.0;
    let extra_velocity =
        strafing.physics.player.velocity.x - idle_game.physics.player.velocity.x;
    assert!((extra_velocity - 10.0 * push_per_frame).abs() < 1e-4, "{extra_velocity}");

    let strafe_distance = 10.0 * 10.0 * DT;
    let drift = strafing.camera().position.z - idle_game.camera().position.z;
    assert!(drift > strafe_distance + 1e-3, "{drift}");
}

#[test]
fn mouse_look_turns_only_while_captured() {
    let mut game = playing_game();
    game.update(&idle().with_mouse_delta(Vec2::new(100.0, 0.0)));
    let yaw = game.camera().yaw;
    assert!((yaw - 0.3).abs() < 1e-5);

    game.update(&idle().with_key_pressed(KeyCode::ESCAPE));
    game.update(&idle().with_mouse_delta(Vec2::new(100.0, 0.0)));
    assert_eq!(game.camera().yaw, yaw);
}

#[test]
fn falling_below_the_kill_height_dies_once() {
    let mut game = playing_game();
    game.camera.position.z = 50.0;
    let events = run_idle(&mut game, 300);

    assert_eq!(game.state(), GameState::Respawn);
    assert_eq!(count(&events, GameEvent::Died), 1);
    assert_eq!(
        count(
            &events,
            GameEvent::StateChanged {
                from: GameState::Playing,
                to: GameState::Respawn,
            }
        ),
        1
    );
    assert!(!game.wants_mouse_captured());
    assert_eq!(game.camera().position, Vec3::new(0.0, -90.0, 0.0));
}

#[test]
fn respawn_returns_to_the_same_stage() {
    let mut game = playing_game();
    touch_marker(&mut game);
    assert_eq!(game.stage(), 1);
    game.camera.position.z = 50.0;
    run_idle(&mut game, 300);
    assert_eq!(game.state(), GameState::Respawn);

    let events = game.update(&idle().with_key_pressed(KeyCode::ENTER));
    assert_eq!(game.state(), GameState::Playing);
    assert_eq!(count(&events, GameEvent::Respawned), 1);
    assert_eq!(game.stage(), 1);
    assert_eq!(game.camera().position, Vec3::ZERO);
    assert!(game.wants_mouse_captured());
}

#[test]
fn death_camera_blends_towards_the_falling_body_then_follows_it() {
    let mut game = playing_game();
    game.camera.position = Vec3::new(0.0, -95.0, 0.0);
    game.update(&idle());
    assert_eq!(game.state(), GameState::Respawn);
    let death_target = game.death.target_at_death;
    let falling_body = |game: &Game| Vec3::new(0.0, -90.0 - game.death.fall_speed, 0.0);

    run_idle(&mut game, 30);
    assert!((game.death.fall_speed - 40.0).abs() < 1e-3);
    let t = game.death.time_since_death;
    assert!((t - 0.3).abs() < 1e-4);
    let expected = death_target.lerp(falling_body(&game), t);
    let target = game.view().target;
    assert!((target - expected).length() < 1e-3, "{target:?}");
    assert!(target.distance(death_target) > 1.0);
    assert!(target.distance(falling_body(&game)) > 1.0);

    run_idle(&mut game, 90);
    assert!(game.death.time_since_death >= 1.0);
    assert_eq!(game.view().target, falling_body(&game));
    assert_eq!(game.view().eye, Vec3::new(0.0, -90.0, 0.0));
    assert_eq!(game.state(), GameState::Respawn);
}

#[test]
fn respawn_button_is_offset_from_centre() {
    let mut game = playing_game();
    game.camera.position = Vec3::new(0.0, -95.0, 0.0);
    game.update(&idle());
    assert_eq!(game.state(), GameState::Respawn);

    let centre = idle()
        .with_mouse_at(Vec2::new(400.0, 225.0))
        .with_mouse_pressed(MouseButton::LEFT);
    game.update(&centre);
    assert_eq!(game.state(), GameState::Respawn);

    let button = idle()
        .with_mouse_at(Vec2::new(300.0, 125.0))
        .with_mouse_pressed(MouseButton::LEFT);
    game.update(&button);
    assert_eq!(game.state(), GameState::Playing);
}

#[test]
fn grapple_unlocks_exactly_once_on_reaching_stage_two() {
    let mut game = playing_game();
    let mut unlocks = Vec::new();
    for _ in 0..4 {
        let events = touch_marker(&mut game);
        unlocks.push(count(&events, GameEvent::GrappleUnlocked));
    }
    assert_eq!(unlocks, vec![0, 1, 0, 0]);
    assert!(game.grappling_unlocked());
    assert_eq!(game.stage(), 4);
    assert_eq!(game.platforms().len(), 7);
    assert_eq!(game.marker, Vec3::new(95.0, -75.0, 0.0));
}

#[test]
fn fifth_transition_finishes_the_campaign() {
    let mut game = playing_game();
    for stage in 1..5 {
        let events = touch_marker(&mut game);
        assert!(events.contains(&GameEvent::LevelCompleted { stage }));
        assert_eq!(game.state(), GameState::Playing);
    }
    let events = touch_marker(&mut game);
    assert_eq!(game.state(), GameState::Finish);
    assert!(events.contains(&GameEvent::Finished));
    assert!(events.contains(&GameEvent::StateChanged {
        from: GameState::Playing,
        to: GameState::Finish,
    }));
    assert_eq!(game.scene(VIEWPORT).title, "VICTORY");

    run_idle(&mut game, 60);
    assert_eq!(game.state(), GameState::Finish);
}

#[test]
fn grapple_hooks_the_next_platform_and_pulls() {
    let mut game = playing_game();
    touch_marker(&mut game);
    touch_marker(&mut game);
    assert_eq!(game.stage(), 2);
    run_idle(&mut game, 30);
    assert_eq!(game.current_ground(), Some(0));

    let events = game.update(&idle().with_mouse_pressed(MouseButton::LEFT));
    assert!(events.contains(&GameEvent::GrappleAttached { platform: 1 }));
    let target = game.grapple.target().unwrap();
    assert_eq!(target.platform, 1);
    assert_eq!(target.point.y, -1.5);
    assert!(game.camera().position.x > 1.0);

    game.update(&idle());
    assert!(game.grapple.target().is_none());
}

#[test]
fn holding_the_grapple_reels_the_player_in() {
    let mut game = grapple_stage();
    game.update(&idle().with_mouse_pressed(MouseButton::LEFT));
    let target = game.grapple.target().unwrap();
    let start = game.camera().position;
    let planar = |p: Vec3| Vec2::new(target.point.x - p.x, target.point.z - p.z).length();

    let held = idle().with_mouse_held(MouseButton::LEFT);
    for _ in 0..30 {
        game.update(&held);
    }
    let position = game.camera().position;
    assert_eq!(game.state(), GameState::Playing);
    assert!(position.x > start.x + 5.0, "{position:?}");
    assert!(position.x < target.point.x);
    assert!(planar(position) < planar(start));
    assert!(game.grapple.is_pulling());
    assert!(game.scene(VIEWPORT).find("grapple-cable").is_some());

    game.update(&idle());
    assert!(game.grapple.target().is_none());
    assert!(!game.grapple.is_pulling());
    assert!(game.scene(VIEWPORT).find("grapple-cable").is_none());
}

#[test]
fn grapple_lifts_a_player_hanging_below_the_hook() {
    let mut game = grapple_stage();
    game.update(&idle().with_mouse_pressed(MouseButton::LEFT));
    assert!(game.grapple.target().is_some());

    game.physics.player.position.y = -10.0;
    game.physics.player.velocity = Vec2::ZERO;
    game.camera.position.y = -10.0;
    let held = idle().with_mouse_held(MouseButton::LEFT);
    for _ in 0..20 {
        game.update(&held);
    }
    assert!(game.grapple.velocity().y > 0.0);
    assert!(game.camera().position.y > -10.0, "{:?}", game.camera().position);
}

#[test]
fn grapple_button_follows_the_binding() {
    let mut config = GameConfig::default();
    config.controls.grapple = MouseButton::new(1);
    let mut game = Game::new(config, LevelSet::builtin().unwrap());
    game.state = GameState::Playing;
    game.begin_run();
    touch_marker(&mut game);
    touch_marker(&mut game);
    run_idle(&mut game, 30);

    game.update(&idle().with_mouse_pressed(MouseButton::LEFT));
    assert!(game.grapple.target().is_none());
    let events = game.update(&idle().with_mouse_pressed(MouseButton::new(1)));
    assert!(events.contains(&GameEvent::GrappleAttached { platform: 1 }));
}

#[test]
fn grapple_is_inert_before_unlock() {
    let mut game = playing_game();
    run_idle(&mut game, 30);
    let events = game.update(&idle().with_mouse_pressed(MouseButton::LEFT));
    assert!(events.is_empty());
    assert!(game.grapple.target().is_none());
    assert!(game.scene(VIEWPORT).find("grapple-gun").is_none());
}

#[test]
fn playing_scene_lists_level_objects() {
    let mut game = playing_game();
    game.update(&idle());
    let scene = game.scene(VIEWPORT);
    assert!(scene.title.contains("Level 1"));
    assert!(scene.find("platform-0").is_some());
    assert!(scene.find("platform-1").is_some());
    assert!(scene.find("platform-2").is_none());
    assert_eq!(scene.find("marker").unwrap().position, Vec3::new(15.0, 3.0, 0.0));
    assert!(scene.find("hint").is_some());
    assert!(scene.camera.is_some());
    assert_eq!(scene.overlay.len(), 2);
}

#[test]
fn menu_scene_has_play_button() {
    let mut game = new_game();
    game.state = GameState::Start;
    let scene = game.scene(VIEWPORT);
    assert_eq!(scene.overlay, vec![play_button(VIEWPORT)]);
    assert!(scene.find("player").is_some());
}

#[test]
fn buttons_highlight_under_the_pointer() {
    let mut game = new_game();
    game.state = GameState::Start;
    game.update(&idle().with_mouse_at(Vec2::new(400.0, 225.0)));
    assert_eq!(game.scene(VIEWPORT).overlay[0].color, colors::BUTTON_HOVER);

    game.update(&idle().with_mouse_at(Vec2::new(10.0, 10.0)));
    assert_eq!(game.scene(VIEWPORT).overlay[0].color, colors::BUTTON);
}
