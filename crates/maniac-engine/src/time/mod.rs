//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window (or per render loop)
//! - call `tick()` once per presented frame to obtain `FrameTime`
//! - feed `FrameTime::dt` into a `FrameScheduler`, which decides how many
//!   simulation steps run before the render step

mod frame_clock;
mod scheduler;

pub use frame_clock::{FrameClock, FrameTime};
pub use scheduler::{
    ErrorSink, FrameScheduler, FrameSteps, SchedulerConfig, StepPhase, StepPolicy, TickReport,
};
