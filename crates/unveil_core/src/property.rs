//! Animation channels and the state handed back to the presentation layer

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Name of an animatable channel
///
/// Well-known channels are provided as constants; any other name is accepted
/// and passed through to the presentation layer untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Property(Cow<'static, str>);

impl Property {
    pub const OPACITY: Property = Property(Cow::Borrowed("opacity"));
    pub const X: Property = Property(Cow::Borrowed("x"));
    pub const Y: Property = Property(Cow::Borrowed("y"));
    pub const SCALE: Property = Property(Cow::Borrowed("scale"));
    pub const ROTATE: Property = Property(Cow::Borrowed("rotate"));
    pub const ROTATE_Y: Property = Property(Cow::Borrowed("rotate_y"));
    pub const WIDTH: Property = Property(Cow::Borrowed("width"));
    pub const HEIGHT: Property = Property(Cow::Borrowed("height"));
    pub const BORDER_RADIUS: Property = Property(Cow::Borrowed("border_radius"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Property {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Property {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// Insertion-ordered mapping of property name to value
///
/// Ordering is preserved so that outputs are reproducible frame to frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: IndexMap<Property, f32>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder pattern)
    pub fn with(mut self, property: impl Into<Property>, value: f32) -> Self {
        self.set(property, value);
        self
    }

    /// Set a value, replacing any previous value in place
    pub fn set(&mut self, property: impl Into<Property>, value: f32) {
        self.values.insert(property.into(), value);
    }

    pub fn get(&self, property: &Property) -> Option<f32> {
        self.values.get(property).copied()
    }

    pub fn contains(&self, property: &Property) -> bool {
        self.values.contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Property, f32)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.values.keys()
    }

    /// Overwrite this set's values with every value in `other`
    pub fn merge(&mut self, other: &PropertySet) {
        for (property, value) in other.iter() {
            self.values.insert(property.clone(), value);
        }
    }

    /// Check if two sets hold the same properties with values within `epsilon`
    pub fn approx_eq(&self, other: &PropertySet, epsilon: f32) -> bool {
        self.len() == other.len()
            && self.iter().all(|(property, value)| {
                other
                    .get(property)
                    .is_some_and(|theirs| (theirs - value).abs() <= epsilon)
            })
    }
}

impl<P: Into<Property>> FromIterator<(P, f32)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (P, f32)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (property, value) in iter {
            set.set(property, value);
        }
        set
    }
}

/// Where the presentation layer should place a target
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Normal document flow
    #[default]
    Flow,
    /// Held at a fixed viewport position by a pin
    Pinned {
        /// Distance from the top of the viewport, in pixels
        viewport_y: f32,
        /// Extra space to reserve after the target (pin spacing), in pixels
        spacer: f32,
    },
}

impl Placement {
    pub fn is_pinned(&self) -> bool {
        matches!(self, Placement::Pinned { .. })
    }
}

/// Computed state for one target
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub properties: PropertySet,
    pub placement: Placement,
}

impl VisualState {
    pub fn new(properties: PropertySet, placement: Placement) -> Self {
        Self {
            properties,
            placement,
        }
    }
}
