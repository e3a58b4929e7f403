//! Core domain types for Dream Explorer.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

pub mod scene;
pub mod ui;
mod verification;

pub use scene::{
    CameraSpec, FogSpec, GuidingLightSpec, PointLightSpec, Rgb, SceneSpec, Star, StarfieldSpec,
    Vec3,
};
pub use verification::{
    ActionId, ActionIdError, DEFAULT_ACTION, FlowPhase, VerificationError, VerificationLevel,
    VerificationState, VerifyPayload, VerifyRequest, feedback,
};
