//! Unveil Animation System
//!
//! Easing curves, keyframe timelines and the pieces that drive them.
//!
//! # Features
//!
//! - **Easing**: power, sine, expo, back and CSS cubic-bezier curves, parsed
//!   from names like `"power3.out"` or `"back.out(1.6)"`
//! - **Timelines**: keyframe steps placed with relative positions, evaluated
//!   purely from normalized progress
//! - **Stagger**: one timeline shared across a group, each member lagging by
//!   its index
//! - **Playheads**: time-driven play, reverse, pause and restart
//! - **Counters**: delayed count-up ramps with formatted output
//! - **Springs**: RK4 smoothing for scrubbed progress
//! - **Presets**: common entrance animations

pub mod counter;
pub mod easing;
pub mod keyframe;
pub mod playhead;
pub mod presets;
pub mod spring;
pub mod timeline;
pub mod values;

pub use counter::{Counter, CounterDisplay, CounterSpec, CounterValue};
pub use easing::{EaseMode, Easing};
pub use keyframe::{KeyframeStep, Position, StepDef};
pub use playhead::{Direction, PlayEvent, PlayState, Playhead};
pub use presets::AnimationPreset;
pub use spring::{Spring, SpringConfig};
pub use timeline::{evaluate, Stagger, Timeline, TimelineBuilder, TimelineDef};
pub use values::Interpolate;
