//! Core engine for Dream Explorer - state machine and orchestration.
//!
//! This crate contains the App state machine without TUI dependencies.

use std::time::{Duration, Instant};

// Re-export from crates for public API
pub use dream_providers::{self, HostEnvironment, InstallOutcome, host};
pub use dream_types::{
    FlowPhase, SceneSpec, VerificationError, VerificationState, feedback, ui::UiOptions,
};

// Config types - passed in from caller
mod config;
pub use config::{
    AppConfig, BRIDGE_URL_ENV, BridgeSection, ConfigError, DEFAULT_CONFIRM_DELAY_MS,
    DreamConfig, ProviderChoice, VerificationConfig, config_path,
};

mod flow;
pub use flow::VerificationFlow;

mod host;
pub use host::install_provider;

mod scene;
pub use scene::{KEY_LOOK_STEP, PointerLock, Projected, SceneState};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Verification gate.
    Gate,
    /// Decorative scene, shown once verified.
    Scene,
}

#[derive(Debug)]
pub struct App {
    flow: VerificationFlow,
    host: &'static HostEnvironment,
    scene_spec: SceneSpec,
    /// Present once verified. Stars are placed on entry.
    scene: Option<SceneState>,
    ui_options: UiOptions,
    should_quit: bool,
    tick: usize,
    last_frame: Instant,
}

impl App {
    /// Build the app from an optional config. Missing sections use defaults.
    pub fn new(config: Option<&DreamConfig>, host: &'static HostEnvironment) -> Self {
        let defaults = DreamConfig::default();
        let config = config.unwrap_or(&defaults);
        let flow = VerificationFlow::new(config.action(), config.confirm_delay());
        tracing::debug!(
            action = %flow.action(),
            provider_installed = host.is_installed(),
            "App initialized"
        );

        Self {
            flow,
            host,
            scene_spec: SceneSpec::default(),
            scene: None,
            ui_options: config.ui_options(),
            should_quit: false,
            tick: 0,
            last_frame: Instant::now(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn tick_count(&self) -> usize {
        self.tick
    }

    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    pub fn scene_spec(&self) -> &SceneSpec {
        &self.scene_spec
    }

    pub fn verification(&self) -> &VerificationState {
        self.flow.state()
    }

    pub fn phase(&self) -> FlowPhase {
        self.flow.phase()
    }

    pub fn is_verified(&self) -> bool {
        self.flow.is_verified()
    }

    pub fn view(&self) -> View {
        if self.scene.is_some() {
            View::Scene
        } else {
            View::Gate
        }
    }

    pub fn scene(&self) -> Option<&SceneState> {
        self.scene.as_ref()
    }

    /// The gate's trigger. Ignored once the scene is showing.
    pub fn request_verification(&mut self) -> bool {
        if self.view() != View::Gate {
            return false;
        }
        self.flow.begin(self.host)
    }

    /// Wait for an in-flight verification to finish.
    pub async fn settle_verification(&mut self) {
        self.flow.settle().await;
        self.sync_view();
    }

    /// Increment animation tick, poll the verification task, and advance the
    /// scene clock.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.flow.poll();
        self.sync_view();
        let elapsed = self.frame_elapsed();
        self.advance_scene(elapsed);
    }

    /// Get elapsed time since last frame and update timing.
    pub fn frame_elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        elapsed
    }

    /// Advance the scene clock. Frozen under reduced motion.
    pub fn advance_scene(&mut self, dt: Duration) {
        if self.ui_options.reduced_motion {
            return;
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.advance(dt);
        }
    }

    /// Current emissive intensity of the guiding light.
    pub fn light_intensity(&self) -> Option<f32> {
        let scene = self.scene.as_ref()?;
        Some(
            self.scene_spec
                .guide
                .emissive_intensity(scene.elapsed_secs()),
        )
    }

    pub fn lock_pointer(&mut self, column: u16, row: u16) {
        if let Some(scene) = self.scene.as_mut() {
            scene.lock_pointer(column, row);
        }
    }

    pub fn release_pointer(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.release_pointer();
        }
    }

    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        if let Some(scene) = self.scene.as_mut() {
            scene.pointer_moved(column, row, &self.scene_spec.camera);
        }
    }

    pub fn look(&mut self, d_yaw: f32, d_pitch: f32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.look(d_yaw, d_pitch, &self.scene_spec.camera);
        }
    }

    fn sync_view(&mut self) {
        if self.scene.is_none() && self.flow.is_verified() {
            tracing::info!("Entering dream space");
            self.scene = Some(SceneState::generate(&self.scene_spec));
            self.last_frame = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests;
