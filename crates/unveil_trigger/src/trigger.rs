//! Trigger lifecycle state machine
//!
//! ```text
//! Idle --Arm--> Armed --Enter--> Active --Complete--> Fired --(once)--> Disposed
//!                 ^                |                    |
//!                 +------Leave-----+                    |
//!                 +---------------Leave (repeat)--------+
//! ```
//!
//! A repeating trigger that fired can also be entered again directly, which
//! happens when scrolling back into a window from past its end. `Dispose`
//! is accepted from every state except `Disposed`, which is terminal.

use crate::config::FirePolicy;
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a registered trigger
    pub struct TriggerId;
}

/// Lifecycle state of a trigger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TriggerState {
    #[default]
    Idle,
    /// Subscribed and waiting for its target
    Armed,
    /// Target visible, or scroll inside the window
    Active,
    /// Animation reached its end
    Fired,
    Disposed,
}

/// Inputs to the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    Arm,
    Enter,
    Leave,
    Complete,
    Dispose,
}

impl TriggerState {
    /// Handle an event and return the new state, or None if no transition
    pub fn on_event(&self, event: TriggerEvent, fire: FirePolicy) -> Option<Self> {
        use TriggerEvent::*;
        use TriggerState::*;
        match (self, event) {
            (Disposed, _) => None,
            (_, Dispose) => Some(Disposed),
            (Idle, Arm) => Some(Armed),
            (Armed, Enter) => Some(Active),
            (Active, Leave) => Some(Armed),
            (Active, Complete) => Some(Fired),
            // Playback can finish after the target has already left
            (Armed, Complete) => Some(Fired),
            (Fired, Leave) if fire == FirePolicy::Repeat => Some(Armed),
            (Fired, Enter) if fire == FirePolicy::Repeat => Some(Active),
            _ => None,
        }
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, TriggerState::Disposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FirePolicy::*;
    use TriggerEvent::*;

    fn run(events: &[TriggerEvent], fire: FirePolicy) -> TriggerState {
        events.iter().fold(TriggerState::Idle, |state, &event| {
            state.on_event(event, fire).unwrap_or(state)
        })
    }

    #[test]
    fn test_happy_path() {
        assert_eq!(run(&[Arm], Once), TriggerState::Armed);
        assert_eq!(run(&[Arm, Enter], Once), TriggerState::Active);
        assert_eq!(run(&[Arm, Enter, Complete], Once), TriggerState::Fired);
    }

    #[test]
    fn test_once_never_reenters_active() {
        let fired = run(&[Arm, Enter, Complete], Once);
        assert_eq!(fired.on_event(Leave, Once), None);
        assert_eq!(fired.on_event(Enter, Once), None);
        assert_eq!(fired.on_event(Dispose, Once), Some(TriggerState::Disposed));
    }

    #[test]
    fn test_repeat_rearms() {
        assert_eq!(run(&[Arm, Enter, Complete, Leave], Repeat), TriggerState::Armed);
        assert_eq!(run(&[Arm, Enter, Complete, Enter], Repeat), TriggerState::Active);
        assert_eq!(run(&[Arm, Enter, Leave, Enter], Repeat), TriggerState::Active);
    }

    #[test]
    fn test_enter_before_arm_ignored() {
        assert_eq!(TriggerState::Idle.on_event(Enter, Repeat), None);
    }

    #[test]
    fn test_disposed_is_terminal() {
        let disposed = run(&[Arm, Dispose], Repeat);
        assert_eq!(disposed, TriggerState::Disposed);
        for event in [Arm, Enter, Leave, Complete, Dispose] {
            assert_eq!(disposed.on_event(event, Repeat), None);
        }
        assert!(!disposed.is_live());
    }

    #[test]
    fn test_late_completion_after_leave() {
        assert_eq!(run(&[Arm, Enter, Leave, Complete], Once), TriggerState::Fired);
    }
}
