//! Target identity and geometry providers

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

new_key_type! {
    /// Handle to a registered target
    pub struct TargetId;
}

/// Caller-supplied opaque identity of an element
///
/// Two registrations with the same key are the same element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetKey(String);

impl TargetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for TargetKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<u64> for TargetKey {
    fn from(key: u64) -> Self {
        Self(key.to_string())
    }
}

/// Source of a target's document-space bounds
///
/// Returning `None` means the element no longer exists; the engine then drops
/// every binding that refers to it.
pub trait Geometry {
    fn measure(&self) -> Option<Rect>;
}

impl<F> Geometry for F
where
    F: Fn() -> Option<Rect>,
{
    fn measure(&self) -> Option<Rect> {
        self()
    }
}

/// Shared, mutable geometry for hosts that push layout instead of being polled
///
/// Clones share the same cell, so the host keeps one clone and hands another
/// to the engine.
#[derive(Clone, Debug)]
pub struct StaticGeometry {
    rect: Rc<Cell<Option<Rect>>>,
}

impl StaticGeometry {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect: Rc::new(Cell::new(Some(rect))),
        }
    }

    pub fn set(&self, rect: Rect) {
        self.rect.set(Some(rect));
    }

    /// Mark the element as removed from the page
    pub fn remove(&self) {
        self.rect.set(None);
    }

    pub fn get(&self) -> Option<Rect> {
        self.rect.get()
    }
}

impl Geometry for StaticGeometry {
    fn measure(&self) -> Option<Rect> {
        self.rect.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_geometry_shared() {
        let host = StaticGeometry::new(Rect::new(0.0, 100.0, 50.0, 50.0));
        let engine_side = host.clone();

        host.set(Rect::new(0.0, 200.0, 50.0, 50.0));
        assert_eq!(engine_side.measure().map(|r| r.y()), Some(200.0));

        host.remove();
        assert!(engine_side.measure().is_none());
    }

    #[test]
    fn test_closure_geometry() {
        let provider = || Some(Rect::new(0.0, 10.0, 1.0, 1.0));
        assert_eq!(provider.measure().map(|r| r.y()), Some(10.0));
    }

    #[test]
    fn test_target_key_from() {
        assert_eq!(TargetKey::from(7u64), TargetKey::new("7"));
        assert_eq!(TargetKey::from("#clip").as_str(), "#clip");
    }
}
