//! Viewport visibility observer
//!
//! Tracks how much of each subscribed target lies inside the viewport and
//! reports a change whenever the visible fraction crosses one of the
//! subscription's thresholds. The first measurement of a subscription is
//! always reported so callers learn the initial state.
//!
//! Each subscription may carry a root margin in pixels: positive values grow
//! the viewport it is measured against, negative values shrink it.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use unveil_core::{Rect, TargetId};

new_key_type! {
    /// Handle to a visibility subscription
    pub struct SubscriptionId;
}

/// One reported threshold crossing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub subscription: SubscriptionId,
    pub target: TargetId,
    /// Visible area over target area, 0.0-1.0
    pub fraction: f32,
    pub is_intersecting: bool,
}

/// Result of one [`ViewportObserver::update`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObserverUpdate {
    pub intersections: Vec<Intersection>,
    /// Subscriptions dropped because their target could not be measured
    pub gone: Vec<(SubscriptionId, TargetId)>,
}

#[derive(Clone, Debug)]
struct Subscription {
    target: TargetId,
    thresholds: SmallVec<[f32; 4]>,
    /// Root margin in pixels
    margin: f32,
    /// Number of thresholds met at the last report
    band: Option<usize>,
}

impl Subscription {
    fn band(&self, fraction: f32) -> usize {
        self.thresholds
            .iter()
            .filter(|&&threshold| {
                if threshold <= 0.0 {
                    fraction > 0.0
                } else {
                    fraction >= threshold
                }
            })
            .count()
    }
}

#[derive(Debug, Default)]
pub struct ViewportObserver {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
}

impl ViewportObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report when `target`'s visible fraction crosses `threshold`
    pub fn observe(&mut self, target: TargetId, threshold: f32) -> SubscriptionId {
        self.observe_many(target, &[threshold])
    }

    /// Report when `target`'s visible fraction crosses any of `thresholds`
    ///
    /// Thresholds are clamped to 0.0-1.0. A 0.0 threshold is met as soon as
    /// any part of the target is visible.
    pub fn observe_many(&mut self, target: TargetId, thresholds: &[f32]) -> SubscriptionId {
        let mut thresholds: SmallVec<[f32; 4]> =
            thresholds.iter().map(|t| t.clamp(0.0, 1.0)).collect();
        if thresholds.is_empty() {
            thresholds.push(0.0);
        }
        thresholds.sort_by(f32::total_cmp);
        thresholds.dedup();

        self.subscriptions.insert(Subscription {
            target,
            thresholds,
            margin: 0.0,
            band: None,
        })
    }

    /// Measure `subscription` against the viewport grown by `margin` pixels
    ///
    /// Takes effect on the next update; returns `false` if the subscription
    /// is gone.
    pub fn set_margin(&mut self, subscription: SubscriptionId, margin: f32) -> bool {
        match self.subscriptions.get_mut(subscription) {
            Some(entry) => {
                entry.margin = margin;
                true
            }
            None => false,
        }
    }

    /// Stop reporting; returns `false` if the subscription was already gone
    pub fn unobserve(&mut self, subscription: SubscriptionId) -> bool {
        self.subscriptions.remove(subscription).is_some()
    }

    pub fn is_observing(&self, subscription: SubscriptionId) -> bool {
        self.subscriptions.contains_key(subscription)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Measure every subscribed target against `viewport`
    ///
    /// `measure` returns a target's document rect, or `None` if it no longer
    /// exists; such subscriptions are dropped and listed in
    /// [`ObserverUpdate::gone`] without an intersection report.
    pub fn update<F>(&mut self, viewport: &Rect, mut measure: F) -> ObserverUpdate
    where
        F: FnMut(TargetId) -> Option<Rect>,
    {
        let mut update = ObserverUpdate::default();

        for (id, subscription) in self.subscriptions.iter_mut() {
            let Some(rect) = measure(subscription.target) else {
                update.gone.push((id, subscription.target));
                continue;
            };

            let fraction = if subscription.margin == 0.0 {
                rect.visible_fraction(viewport)
            } else {
                rect.visible_fraction(&viewport.inflate(subscription.margin))
            };
            let band = subscription.band(fraction);
            if subscription.band == Some(band) {
                continue;
            }
            subscription.band = Some(band);

            tracing::trace!(?id, fraction, band, "visibility threshold crossed");
            update.intersections.push(Intersection {
                subscription: id,
                target: subscription.target,
                fraction,
                is_intersecting: band > 0,
            });
        }

        for (id, _) in &update.gone {
            self.subscriptions.remove(*id);
        }

        update
    }
}
