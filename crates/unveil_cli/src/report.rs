//! Simulation output
//!
//! [`Report`] is the presenter for `unveil simulate`: it prints every
//! delivery as a text line or a JSON object, stamped with the simulated
//! clock and scroll position.

use crate::scene::{Stage, TriggerInfo};
use serde::Serialize;
use slotmap::SecondaryMap;
use std::fmt::Write as _;
use unveil_animation::CounterValue;
use unveil_core::{Placement, PropertySet, TargetId, VisualState};
use unveil_trigger::{Presenter, TriggerId};

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Apply {
        target: &'a str,
        properties: &'a PropertySet,
        placement: &'a Placement,
    },
    Enter {
        trigger: &'a str,
    },
    Leave {
        trigger: &'a str,
    },
    Fire {
        trigger: &'a str,
    },
    Counter {
        trigger: &'a str,
        value: f64,
        text: String,
    },
    CounterComplete {
        trigger: &'a str,
    },
}

#[derive(Serialize)]
struct Line<'a> {
    time_ms: f64,
    scroll_y: f32,
    #[serde(flatten)]
    event: Event<'a>,
}

/// Delivery totals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub applies: usize,
    pub enters: usize,
    pub leaves: usize,
    pub fires: usize,
    pub counter_updates: usize,
}

pub struct Report {
    targets: SecondaryMap<TargetId, String>,
    triggers: SecondaryMap<TriggerId, TriggerInfo>,
    json: bool,
    time_ms: f64,
    scroll_y: f32,
    totals: Totals,
}

impl Report {
    pub fn new(stage: &Stage, json: bool) -> Self {
        Self {
            targets: stage.targets.clone(),
            triggers: stage.triggers.clone(),
            json,
            time_ms: 0.0,
            scroll_y: 0.0,
            totals: Totals::default(),
        }
    }

    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
    }

    /// Move the simulated clock forward
    pub fn advance(&mut self, dt_ms: f32) {
        self.time_ms += f64::from(dt_ms);
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    fn target_name(&self, target: TargetId) -> &str {
        self.targets.get(target).map_or("?", String::as_str)
    }

    fn trigger_name(&self, trigger: TriggerId) -> &str {
        self.triggers.get(trigger).map_or("?", |t| t.label.as_str())
    }

    fn emit(&self, event: Event<'_>) {
        if self.json {
            let line = Line {
                time_ms: self.time_ms,
                scroll_y: self.scroll_y,
                event,
            };
            match serde_json::to_string(&line) {
                Ok(text) => println!("{text}"),
                Err(err) => tracing::warn!(%err, "failed to encode report line"),
            }
        } else {
            println!(
                "{:>8.0}ms  y={:<6.0}  {}",
                self.time_ms,
                self.scroll_y,
                describe(&event)
            );
        }
    }
}

fn describe(event: &Event<'_>) -> String {
    match event {
        Event::Apply {
            target,
            properties,
            placement,
        } => {
            let mut line = format!("apply    {target}");
            for (property, value) in properties.iter() {
                let _ = write!(line, " {}={value:.3}", property.as_str());
            }
            if let Placement::Pinned { viewport_y, spacer } = placement {
                let _ = write!(line, " [pinned at {viewport_y:.0}, spacer {spacer:.0}]");
            }
            line
        }
        Event::Enter { trigger } => format!("enter    {trigger}"),
        Event::Leave { trigger } => format!("leave    {trigger}"),
        Event::Fire { trigger } => format!("fire     {trigger}"),
        Event::Counter { trigger, text, .. } => format!("counter  {trigger} {text}"),
        Event::CounterComplete { trigger } => format!("counted  {trigger}"),
    }
}

impl Presenter for Report {
    fn on_apply(&mut self, target: TargetId, state: &VisualState) {
        self.totals.applies += 1;
        self.emit(Event::Apply {
            target: self.target_name(target),
            properties: &state.properties,
            placement: &state.placement,
        });
    }

    fn on_enter(&mut self, trigger: TriggerId) {
        self.totals.enters += 1;
        self.emit(Event::Enter {
            trigger: self.trigger_name(trigger),
        });
    }

    fn on_leave(&mut self, trigger: TriggerId) {
        self.totals.leaves += 1;
        self.emit(Event::Leave {
            trigger: self.trigger_name(trigger),
        });
    }

    fn on_fire(&mut self, trigger: TriggerId) {
        self.totals.fires += 1;
        self.emit(Event::Fire {
            trigger: self.trigger_name(trigger),
        });
    }

    fn on_counter(&mut self, trigger: TriggerId, value: &CounterValue) {
        self.totals.counter_updates += 1;
        self.emit(Event::Counter {
            trigger: self.trigger_name(trigger),
            value: value.value(),
            text: value.format(),
        });
    }

    fn on_counter_complete(&mut self, trigger: TriggerId) {
        self.emit(Event::CounterComplete {
            trigger: self.trigger_name(trigger),
        });
    }
}
