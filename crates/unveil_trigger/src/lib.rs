//! Unveil Triggers
//!
//! Binds timelines and counters to scroll position and viewport visibility.
//!
//! # Features
//!
//! - **Viewport Observer**: threshold-crossing visibility reports
//! - **Scroll Tracker**: offset-resolved scroll windows with exclusive pins
//! - **Trigger Registry**: lifecycle state machine, scrubbing, toggle actions
//!   and counter bindings, delivered through a [`Presenter`]
//!
//! # Example
//!
//! ```rust
//! use unveil_animation::{AnimationPreset, Stagger};
//! use unveil_core::{Rect, Size, StaticGeometry};
//! use unveil_trigger::{Recorder, Registry, TriggerConfig, TriggerSpec};
//!
//! let mut registry = Registry::new(Size::new(1280.0, 800.0));
//! let card = registry
//!     .register_target("#card", StaticGeometry::new(Rect::new(0.0, 1200.0, 320.0, 240.0)))
//!     .unwrap();
//! let timeline = AnimationPreset::FadeUp.timeline(Stagger::None).unwrap();
//! registry
//!     .create_trigger(TriggerSpec::new(TriggerConfig::visibility(0.2).once(), [card]).timeline(timeline))
//!     .unwrap();
//!
//! let mut recorder = Recorder::new();
//! registry.scroll_to(900.0, &mut recorder);
//! for _ in 0..60 {
//!     registry.tick(16.0, &mut recorder);
//! }
//! assert!(registry.is_empty());
//! ```

pub mod config;
pub mod observer;
pub mod position;
pub mod presenter;
pub mod registry;
pub mod scroll;
pub mod trigger;

pub use config::{
    Activation, EngineConfig, FirePolicy, Scrub, ToggleAction, ToggleActions, TriggerConfig,
};
pub use observer::{Intersection, ObserverUpdate, SubscriptionId, ViewportObserver};
pub use position::{Edge, Offset};
pub use presenter::{Delivery, Presenter, Recorder};
pub use registry::{CounterBinding, Registry, RegistryHandle, TriggerSpec};
pub use scroll::{PinChange, ScrollTracker, WindowId, WindowSpec, WindowUpdate};
pub use trigger::{TriggerEvent, TriggerId, TriggerState};
