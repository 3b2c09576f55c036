//! Scroll windows and pinning
//!
//! A scroll window maps a range of scroll positions onto progress 0.0-1.0.
//! Its bounds come from the target's document rect, the viewport size and a
//! pair of [`Offset`]s, and are re-resolved on [`ScrollTracker::remeasure`].
//!
//! A pinned window holds its target at a fixed viewport position while the
//! scroll position is strictly inside the window. Each target can be pinned by
//! at most one window; the reservation is made at registration and lasts until
//! the window is unregistered.

use crate::position::Offset;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use unveil_core::{Error, Placement, Rect, Result, Size, TargetId, TargetKey};

new_key_type! {
    /// Handle to a registered scroll window
    pub struct WindowId;
}

/// How a window is bounded and whether it pins its target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowSpec {
    pub start: Offset,
    pub end: Offset,
    pub pin: bool,
    /// Reserve the window length as space after a pinned target
    pub pin_spacing: bool,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            start: Offset::START,
            end: Offset::END,
            pin: false,
            pin_spacing: true,
        }
    }
}

impl WindowSpec {
    /// Resolve to `(start, end)` scroll positions
    pub fn resolve(&self, rect: &Rect, viewport: Size) -> (f32, f32) {
        let start = self.start.resolve(rect, viewport, None);
        let end = self.end.resolve(rect, viewport, Some(start));
        (start, end)
    }
}

/// Change in pin ownership reported with an update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinChange {
    Acquired,
    Released,
}

/// A window whose progress or placement changed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowUpdate {
    pub window: WindowId,
    pub target: TargetId,
    /// Progress at the previous update, `None` on the first one
    pub previous: Option<f32>,
    pub progress: f32,
    pub placement: Placement,
    pub pin: Option<PinChange>,
}

#[derive(Clone, Debug)]
struct ScrollWindow {
    target: TargetId,
    key: TargetKey,
    spec: WindowSpec,
    /// Element top at the last resolve, in document coordinates
    element_top: f32,
    start: f32,
    end: f32,
    progress: Option<f32>,
    pinned: bool,
}

impl ScrollWindow {
    fn progress_at(&self, scroll_y: f32) -> f32 {
        ((scroll_y - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    fn placement(&self) -> Placement {
        if !self.pinned {
            return Placement::Flow;
        }
        Placement::Pinned {
            viewport_y: self.element_top - self.start,
            spacer: if self.spec.pin_spacing {
                self.end - self.start
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct ScrollTracker {
    windows: SlotMap<WindowId, ScrollWindow>,
    /// Pin reservations: target -> owning window
    pins: FxHashMap<TargetId, WindowId>,
    viewport: Size,
    scroll_y: f32,
}

impl ScrollTracker {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Register a window over `target`, whose document rect is `rect`
    ///
    /// Fails with [`Error::InvalidWindow`] if the window resolves empty or
    /// inverted, and with [`Error::ConflictingPin`] if `spec.pin` is set and
    /// the target is already pinned. A failed registration changes nothing.
    pub fn register_window(
        &mut self,
        target: TargetId,
        key: TargetKey,
        rect: Rect,
        spec: WindowSpec,
    ) -> Result<WindowId> {
        let (start, end) = spec.resolve(&rect, self.viewport);
        if !(end > start) {
            return Err(Error::InvalidWindow { start, end });
        }
        if spec.pin && self.pins.contains_key(&target) {
            return Err(Error::ConflictingPin { target: key });
        }

        let id = self.windows.insert(ScrollWindow {
            target,
            key,
            spec,
            element_top: rect.top(),
            start,
            end,
            progress: None,
            pinned: false,
        });
        if spec.pin {
            self.pins.insert(target, id);
        }
        tracing::debug!(?id, start, end, pin = spec.pin, "scroll window registered");
        Ok(id)
    }

    /// Drop a window and its pin reservation
    ///
    /// Returns whether the window held its target pinned at the time.
    pub fn unregister(&mut self, window: WindowId) -> Option<bool> {
        let removed = self.windows.remove(window)?;
        if self.pins.get(&removed.target) == Some(&window) {
            self.pins.remove(&removed.target);
        }
        Some(removed.pinned)
    }

    /// Resolved `(start, end)` scroll positions of a window
    pub fn bounds(&self, window: WindowId) -> Option<(f32, f32)> {
        self.windows.get(window).map(|w| (w.start, w.end))
    }

    pub fn progress(&self, window: WindowId) -> Option<f32> {
        self.windows.get(window).and_then(|w| w.progress)
    }

    /// Current pin owner of `target`
    pub fn pin_owner(&self, target: TargetId) -> Option<WindowId> {
        self.pins.get(&target).copied()
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Re-resolve every window from fresh geometry
    ///
    /// Returns the targets `measure` could not find; their windows are left
    /// untouched for the caller to unregister. A window that would resolve
    /// empty keeps its previous bounds.
    pub fn remeasure<F>(&mut self, mut measure: F) -> Vec<TargetId>
    where
        F: FnMut(TargetId) -> Option<Rect>,
    {
        let mut gone = Vec::new();
        for (id, window) in self.windows.iter_mut() {
            let Some(rect) = measure(window.target) else {
                if !gone.contains(&window.target) {
                    gone.push(window.target);
                }
                continue;
            };

            let (start, end) = window.spec.resolve(&rect, self.viewport);
            if !(end > start) {
                tracing::warn!(
                    ?id,
                    target = %window.key,
                    start,
                    end,
                    "scroll window collapsed after remeasure; keeping previous bounds"
                );
                continue;
            }
            window.element_top = rect.top();
            window.start = start;
            window.end = end;
        }
        gone
    }

    /// Move to `scroll_y` and report every window whose state changed
    pub fn scroll(&mut self, scroll_y: f32) -> Vec<WindowUpdate> {
        self.scroll_y = scroll_y;
        self.refresh()
    }

    /// Recompute every window at the current scroll position
    pub fn refresh(&mut self) -> Vec<WindowUpdate> {
        let scroll_y = self.scroll_y;
        let mut updates = Vec::new();

        for (id, window) in self.windows.iter_mut() {
            let progress = window.progress_at(scroll_y);
            let should_pin = window.spec.pin && progress > 0.0 && progress < 1.0;
            let pin = match (window.pinned, should_pin) {
                (false, true) => Some(PinChange::Acquired),
                (true, false) => Some(PinChange::Released),
                _ => None,
            };
            window.pinned = should_pin;

            let previous = window.progress;
            if previous == Some(progress) && pin.is_none() {
                continue;
            }
            window.progress = Some(progress);

            if let Some(change) = pin {
                tracing::debug!(?id, target = %window.key, ?change, "pin changed");
            }
            updates.push(WindowUpdate {
                window: id,
                target: window.target,
                previous,
                progress,
                placement: window.placement(),
                pin,
            });
        }
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 1280.0,
        height: 800.0,
    };

    fn targets(n: usize) -> Vec<TargetId> {
        let mut ids: SlotMap<TargetId, ()> = SlotMap::with_key();
        (0..n).map(|_| ids.insert(())).collect()
    }

    fn clip_section() -> Rect {
        Rect::new(0.0, 1000.0, 1280.0, 800.0)
    }

    fn pinned(end: &str) -> WindowSpec {
        WindowSpec {
            start: "top top".parse().unwrap(),
            end: end.parse().unwrap(),
            pin: true,
            pin_spacing: true,
        }
    }

    #[test]
    fn test_progress_monotonic_and_clamped() {
        let ids = targets(1);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        let window = tracker
            .register_window(ids[0], "#stats".into(), clip_section(), WindowSpec::default())
            .unwrap();
        // top bottom = 200, bottom top = 1800
        assert_eq!(tracker.bounds(window), Some((200.0, 1800.0)));

        let mut last = 0.0;
        for y in (0..=2400).step_by(50) {
            tracker.scroll(y as f32);
            let progress = tracker.progress(window).unwrap();
            assert!((0.0..=1.0).contains(&progress));
            assert!(progress >= last);
            last = progress;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_reports_only_changes() {
        let ids = targets(1);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        tracker
            .register_window(ids[0], "#a".into(), clip_section(), WindowSpec::default())
            .unwrap();

        let first = tracker.scroll(0.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].previous, None);
        assert_eq!(first[0].progress, 0.0);

        // Still before the window
        assert!(tracker.scroll(100.0).is_empty());

        let inside = tracker.scroll(1000.0);
        assert_eq!(inside[0].previous, Some(0.0));
        assert!((inside[0].progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let ids = targets(1);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        let spec = WindowSpec {
            start: "bottom top".parse().unwrap(),
            end: "top top".parse().unwrap(),
            ..WindowSpec::default()
        };
        let err = tracker
            .register_window(ids[0], "#a".into(), clip_section(), spec)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidWindow {
                start: 1800.0,
                end: 1000.0
            }
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_pin_acquired_and_released_once() {
        let ids = targets(1);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        let window = tracker
            .register_window(ids[0], "#clip".into(), clip_section(), pinned("+=800"))
            .unwrap();

        assert_eq!(tracker.scroll(500.0)[0].placement, Placement::Flow);

        let entered = tracker.scroll(1200.0);
        assert_eq!(entered[0].pin, Some(PinChange::Acquired));
        assert_eq!(
            entered[0].placement,
            Placement::Pinned {
                viewport_y: 0.0,
                spacer: 800.0
            }
        );

        let mid = tracker.scroll(1400.0);
        assert_eq!(mid[0].pin, None);
        assert!(mid[0].placement.is_pinned());

        let left = tracker.scroll(2000.0);
        assert_eq!(left[0].pin, Some(PinChange::Released));
        assert_eq!(left[0].placement, Placement::Flow);

        // Further scrolling past the end is silent
        assert!(tracker.scroll(2600.0).is_empty());
        assert_eq!(tracker.unregister(window), Some(false));
    }

    #[test]
    fn test_conflicting_pin_keeps_first() {
        let ids = targets(2);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        let first = tracker
            .register_window(ids[0], "#clip".into(), clip_section(), pinned("+=800"))
            .unwrap();

        let err = tracker
            .register_window(ids[0], "#clip".into(), clip_section(), pinned("+=400"))
            .unwrap_err();
        assert_eq!(err, Error::ConflictingPin { target: "#clip".into() });
        assert_eq!(tracker.pin_owner(ids[0]), Some(first));
        assert_eq!(tracker.bounds(first), Some((1000.0, 1800.0)));

        // A different target pins fine alongside
        tracker
            .register_window(ids[1], "#other".into(), Rect::new(0.0, 3000.0, 100.0, 100.0), pinned("+=200"))
            .unwrap();
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_unregister_releases_reservation() {
        let ids = targets(1);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        let window = tracker
            .register_window(ids[0], "#clip".into(), clip_section(), pinned("+=800"))
            .unwrap();
        tracker.scroll(1200.0);
        assert_eq!(tracker.unregister(window), Some(true));
        assert_eq!(tracker.unregister(window), None);
        assert!(tracker
            .register_window(ids[0], "#clip".into(), clip_section(), pinned("+=800"))
            .is_ok());
    }

    #[test]
    fn test_remeasure_after_layout_shift() {
        let ids = targets(2);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        let window = tracker
            .register_window(ids[0], "#a".into(), clip_section(), WindowSpec::default())
            .unwrap();
        tracker
            .register_window(ids[1], "#b".into(), clip_section(), WindowSpec::default())
            .unwrap();

        tracker.set_viewport(Size::new(1280.0, 600.0));
        let gone = tracker.remeasure(|id| (id == ids[0]).then(|| Rect::new(0.0, 1500.0, 1280.0, 800.0)));
        assert_eq!(gone, vec![ids[1]]);
        assert_eq!(tracker.bounds(window), Some((900.0, 2300.0)));
    }

    #[test]
    fn test_pin_without_spacing() {
        let ids = targets(1);
        let mut tracker = ScrollTracker::new(VIEWPORT);
        let spec = WindowSpec {
            start: "top 20%".parse().unwrap(),
            end: "+=400".parse().unwrap(),
            pin: true,
            pin_spacing: false,
        };
        tracker
            .register_window(ids[0], "#card".into(), clip_section(), spec)
            .unwrap();
        let update = tracker.scroll(1000.0);
        match update[0].placement {
            Placement::Pinned { viewport_y, spacer } => {
                assert!((viewport_y - 160.0).abs() < 1e-3);
                assert_eq!(spacer, 0.0);
            }
            Placement::Flow => panic!("expected pinned placement"),
        }
    }
}
