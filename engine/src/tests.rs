//! Unit tests for the engine crate.

use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;
use std::time::Duration;

use dream_providers::{Scripted, ScriptedProvider};

use super::{App, DreamConfig, FlowPhase, HostEnvironment, View, feedback};

fn leak_host(provider: Option<ScriptedProvider>) -> &'static HostEnvironment {
    let host: &'static HostEnvironment = Box::leak(Box::new(HostEnvironment::new()));
    if let Some(provider) = provider {
        host.install(Arc::new(provider));
    }
    host
}

fn fast_config() -> DreamConfig {
    toml::from_str("[verification]\nconfirm_delay_ms = 10").expect("valid config")
}

fn test_app(provider: Option<ScriptedProvider>) -> App {
    App::new(Some(&fast_config()), leak_host(provider))
}

#[test]
fn starts_on_gate_with_welcome() {
    let app = test_app(None);
    assert_eq!(app.view(), View::Gate);
    assert_eq!(app.verification().feedback, feedback::WELCOME);
    assert!(!app.verification().loading);
    assert!(app.scene().is_none());
    assert!(app.light_intensity().is_none());
}

#[test]
fn defaults_without_config() {
    let app = App::new(None, leak_host(None));
    assert!(!app.ui_options().ascii_only);
    assert_eq!(app.scene_spec().stars.count, 5000);
}

#[tokio::test]
async fn missing_provider_stays_on_gate() {
    let mut app = test_app(None);
    assert!(app.request_verification());
    app.tick();

    assert_eq!(app.view(), View::Gate);
    assert_eq!(app.phase(), FlowPhase::Failed);
    assert!(app.verification().feedback.contains("unavailable"));
    assert!(!app.verification().loading);
}

#[tokio::test]
async fn success_enters_scene() {
    let mut app = test_app(Some(ScriptedProvider::always(Scripted::success())));
    app.request_verification();
    assert!(app.verification().loading);

    app.settle_verification().await;
    assert!(app.is_verified());
    assert_eq!(app.view(), View::Scene);

    let scene = app.scene().expect("scene entered");
    assert_eq!(scene.stars().len(), app.scene_spec().stars.count);
    // Pulse starts at its offset.
    let intensity = app.light_intensity().expect("scene running");
    assert!((intensity - 1.5).abs() < 1e-6);
}

#[tokio::test]
async fn tick_polls_outcome_into_scene() {
    let mut app = test_app(Some(ScriptedProvider::always(Scripted::success())));
    app.request_verification();

    for _ in 0..200 {
        app.tick();
        if app.view() == View::Scene {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(app.view(), View::Scene);
}

#[tokio::test]
async fn cancellation_stays_on_gate_and_allows_retry() {
    let mut app = test_app(Some(ScriptedProvider::new([
        Scripted::cancelled(),
        Scripted::success(),
    ])));

    app.request_verification();
    app.settle_verification().await;
    assert_eq!(app.view(), View::Gate);
    assert_eq!(
        app.verification().feedback,
        "Error: Verification was cancelled."
    );

    assert!(app.request_verification());
    app.settle_verification().await;
    assert_eq!(app.view(), View::Scene);
}

#[tokio::test]
async fn trigger_ignored_once_in_scene() {
    let mut app = test_app(Some(ScriptedProvider::always(Scripted::success())));
    app.request_verification();
    app.settle_verification().await;

    assert!(!app.request_verification());
    assert!(!app.verification().loading);
}

#[tokio::test]
async fn scene_clock_drives_pulse() {
    let mut app = test_app(Some(ScriptedProvider::always(Scripted::success())));
    app.request_verification();
    app.settle_verification().await;

    // sin(2 * pi/4) = 1, the peak.
    app.advance_scene(Duration::from_secs_f32(FRAC_PI_4));
    let intensity = app.light_intensity().unwrap();
    assert!((intensity - 2.0).abs() < 1e-3, "{intensity}");
}

#[tokio::test]
async fn reduced_motion_freezes_pulse() {
    let config: DreamConfig =
        toml::from_str("[app]\nreduced_motion = true\n[verification]\nconfirm_delay_ms = 0")
            .unwrap();
    let host = leak_host(Some(ScriptedProvider::always(Scripted::success())));
    let mut app = App::new(Some(&config), host);
    app.request_verification();
    app.settle_verification().await;

    app.advance_scene(Duration::from_millis(700));
    let intensity = app.light_intensity().unwrap();
    assert!((intensity - 1.5).abs() < 1e-6);
}

#[tokio::test]
async fn pointer_lock_only_in_scene() {
    let mut app = test_app(Some(ScriptedProvider::always(Scripted::success())));

    // On the gate these are no-ops.
    app.lock_pointer(5, 5);
    app.look(0.5, 0.0);
    assert!(app.scene().is_none());

    app.request_verification();
    app.settle_verification().await;

    app.lock_pointer(10, 10);
    assert!(app.scene().unwrap().is_locked());
    app.pointer_moved(10, 20);
    assert!(app.scene().unwrap().pitch() < 0.0);

    app.release_pointer();
    assert!(!app.scene().unwrap().is_locked());
}

#[test]
fn quit_flag() {
    let mut app = test_app(None);
    assert!(!app.should_quit());
    app.request_quit();
    assert!(app.should_quit());
}

#[test]
fn tick_counts_frames() {
    let mut app = test_app(None);
    app.tick();
    app.tick();
    assert_eq!(app.tick_count(), 2);
}
