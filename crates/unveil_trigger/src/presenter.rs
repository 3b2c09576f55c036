//! Output side of the engine
//!
//! The registry never touches the presentation layer itself. Each computed
//! state and lifecycle notification is handed to a [`Presenter`], in
//! registration order of the triggers and index order within a group.

use crate::trigger::TriggerId;
use unveil_animation::CounterValue;
use unveil_core::{TargetId, VisualState};

/// Receives engine output
///
/// Everything except [`Presenter::on_apply`] defaults to doing nothing.
pub trait Presenter {
    /// A target's computed state changed
    fn on_apply(&mut self, target: TargetId, state: &VisualState);

    fn on_enter(&mut self, _trigger: TriggerId) {}

    fn on_leave(&mut self, _trigger: TriggerId) {}

    /// The trigger's animation reached its end
    fn on_fire(&mut self, _trigger: TriggerId) {}

    fn on_counter(&mut self, _trigger: TriggerId, _value: &CounterValue) {}

    fn on_counter_complete(&mut self, _trigger: TriggerId) {}
}

/// One delivered output
#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    Apply(TargetId, VisualState),
    Enter(TriggerId),
    Leave(TriggerId),
    Fire(TriggerId),
    Counter(TriggerId, CounterValue),
    CounterComplete(TriggerId),
}

impl Delivery {
    /// Trigger the delivery belongs to, if it names one
    pub fn trigger(&self) -> Option<TriggerId> {
        match self {
            Delivery::Apply(..) => None,
            Delivery::Enter(id)
            | Delivery::Leave(id)
            | Delivery::Fire(id)
            | Delivery::Counter(id, _)
            | Delivery::CounterComplete(id) => Some(*id),
        }
    }
}

/// Presenter that keeps every delivery in order
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub deliveries: Vec<Delivery>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far
    pub fn drain(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries)
    }

    /// Latest applied state of `target`
    pub fn last_state(&self, target: TargetId) -> Option<&VisualState> {
        self.deliveries.iter().rev().find_map(|d| match d {
            Delivery::Apply(id, state) if *id == target => Some(state),
            _ => None,
        })
    }

    pub fn count(&self, predicate: impl Fn(&Delivery) -> bool) -> usize {
        self.deliveries.iter().filter(|d| predicate(d)).count()
    }
}

impl Presenter for Recorder {
    fn on_apply(&mut self, target: TargetId, state: &VisualState) {
        self.deliveries.push(Delivery::Apply(target, state.clone()));
    }

    fn on_enter(&mut self, trigger: TriggerId) {
        self.deliveries.push(Delivery::Enter(trigger));
    }

    fn on_leave(&mut self, trigger: TriggerId) {
        self.deliveries.push(Delivery::Leave(trigger));
    }

    fn on_fire(&mut self, trigger: TriggerId) {
        self.deliveries.push(Delivery::Fire(trigger));
    }

    fn on_counter(&mut self, trigger: TriggerId, value: &CounterValue) {
        self.deliveries.push(Delivery::Counter(trigger, value.clone()));
    }

    fn on_counter_complete(&mut self, trigger: TriggerId) {
        self.deliveries.push(Delivery::CounterComplete(trigger));
    }
}
