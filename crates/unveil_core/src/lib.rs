//! Unveil Core
//!
//! Foundational types shared by the Unveil animation crates:
//!
//! - **Geometry**: points, sizes and document-space rectangles
//! - **Targets**: opaque keys, ids and geometry providers for animatable elements
//! - **Properties**: named animation channels and ordered property sets
//! - **Errors**: the registration and runtime error taxonomy
//!
//! # Example
//!
//! ```rust
//! use unveil_core::{Property, PropertySet, Rect};
//!
//! let card = Rect::new(0.0, 1200.0, 320.0, 240.0);
//! let viewport = Rect::new(0.0, 1000.0, 1280.0, 720.0);
//! assert!(card.visible_fraction(&viewport) > 0.99);
//!
//! let mut props = PropertySet::new();
//! props.set(Property::OPACITY, 0.0);
//! props.set(Property::Y, 60.0);
//! assert_eq!(props.get(&Property::Y), Some(60.0));
//! ```

pub mod error;
pub mod geometry;
pub mod property;
pub mod target;

pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size};
pub use property::{Placement, Property, PropertySet, VisualState};
pub use target::{Geometry, StaticGeometry, TargetId, TargetKey};
