// THEORY:
// This file is the main entry point for the `rover_vision` library crate.
// The public surface has three layers:
//
// - `pipeline`: the three-pass vision engine (`VisionPipeline`, `PipelineConfig`,
//   `PipelineResult`) that turns a frame pair into an obstacle label.
// - `behavior`: the wander/inspect/avoid/stay state machine that decides when to
//   run the pipeline and what to do with the wheels.
// - `controller` and `devices`: the per-tick loop and the capability traits it
//   drives, so the same logic runs against a simulator, recorded images, or the
//   scripted devices used in tests.
//
// The individual passes live in `core_modules` and are public for callers that
// want to run one of them on its own.

pub mod behavior;
pub mod controller;
pub mod core_modules;
pub mod devices;
pub mod pipeline;

pub use behavior::{BehaviorConfig, BehaviorState, BehaviorStateMachine, StateContext};
pub use controller::{Controller, TickReport};
pub use core_modules::classifier::Label;
pub use core_modules::frame::{Frame, FrameError, FrameStore};
pub use devices::{DriveCommand, raw_to_cm};
pub use pipeline::{PipelineConfig, PipelineResult, VisionPipeline};
