//! Numeric count-up animation
//!
//! A [`Counter`] ramps a display value from a start to an end over a duration,
//! after an optional delay, reporting each intermediate value through a
//! callback. Starting a counter again cancels the ramp in progress; the
//! cancelled ramp never reports completion.

use crate::easing::Easing;
use crate::values::Interpolate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How intermediate values are presented
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterDisplay {
    /// Whole numbers, rounded down
    #[default]
    Integer,
    /// Raw fractional value
    Float,
}

/// Parameters of one ramp
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterSpec {
    #[serde(default)]
    pub from: f64,
    pub to: f64,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,
    #[serde(default)]
    pub delay_ms: u32,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub display: CounterDisplay,
    /// Appended after the number, e.g. `"+"` or `"%"`
    #[serde(default)]
    pub suffix: String,
}

fn default_duration_ms() -> u32 {
    2000
}

impl CounterSpec {
    pub fn new(from: f64, to: f64, duration_ms: u32) -> Self {
        Self {
            from,
            to,
            duration_ms,
            delay_ms: 0,
            easing: Easing::Linear,
            display: CounterDisplay::Integer,
            suffix: String::new(),
        }
    }

    /// Set delay before counting starts (builder pattern)
    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set easing (builder pattern)
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set display mode (builder pattern)
    pub fn display(mut self, display: CounterDisplay) -> Self {
        self.display = display;
        self
    }

    /// Set suffix (builder pattern)
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Raw value `elapsed_ms` after the ramp was started
    pub fn sample(&self, elapsed_ms: f64) -> f64 {
        let active = elapsed_ms - f64::from(self.delay_ms);
        if active <= 0.0 {
            return self.from;
        }
        if self.duration_ms == 0 || active >= f64::from(self.duration_ms) {
            return self.to;
        }
        let t = (active / f64::from(self.duration_ms)) as f32;
        self.from.lerp(self.to, self.easing.apply(t))
    }

    /// Time from start until the ramp reaches its end value
    pub fn total_ms(&self) -> f64 {
        f64::from(self.delay_ms) + f64::from(self.duration_ms)
    }
}

/// One reported counter value
#[derive(Clone, Debug, PartialEq)]
pub struct CounterValue {
    pub raw: f64,
    pub display: CounterDisplay,
    pub suffix: String,
}

impl CounterValue {
    /// Number as shown: floored for integer display
    pub fn value(&self) -> f64 {
        match self.display {
            CounterDisplay::Integer => self.raw.floor(),
            CounterDisplay::Float => self.raw,
        }
    }

    /// Formatted text with thousands separators and suffix, e.g. `"12,500+"`
    pub fn format(&self) -> String {
        let value = self.value();
        let mut text = match self.display {
            CounterDisplay::Integer => group_thousands(&format!("{:.0}", value.abs())),
            CounterDisplay::Float => {
                let fixed = format!("{:.2}", value.abs());
                match fixed.split_once('.') {
                    Some((whole, fraction)) => format!("{}.{}", group_thousands(whole), fraction),
                    None => group_thousands(&fixed),
                }
            }
        };
        if value < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0') {
            text.insert(0, '-');
        }
        text.push_str(&self.suffix);
        text
    }
}

impl fmt::Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

struct Ramp {
    spec: CounterSpec,
    elapsed_ms: f64,
    on_update: Box<dyn FnMut(CounterValue)>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

/// A restartable count-up animation
#[derive(Default)]
pub struct Counter {
    ramp: Option<Ramp>,
    value: Option<CounterValue>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a ramp, replacing any ramp in progress
    ///
    /// The replaced ramp's `on_complete` is dropped without being called.
    pub fn start<U, C>(&mut self, spec: CounterSpec, on_update: U, on_complete: C)
    where
        U: FnMut(CounterValue) + 'static,
        C: FnOnce() + 'static,
    {
        if self.ramp.take().is_some() {
            tracing::trace!("counter restarted before completing");
        }
        self.ramp = Some(Ramp {
            spec,
            elapsed_ms: 0.0,
            on_update: Box::new(on_update),
            on_complete: Some(Box::new(on_complete)),
        });
    }

    /// Advance by `dt_ms`; returns whether a ramp is still running
    ///
    /// No update is reported while the delay is pending. The final update
    /// carries exactly the end value and is followed by `on_complete`.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        let Some(ramp) = self.ramp.as_mut() else {
            return false;
        };

        ramp.elapsed_ms += dt_ms.max(0.0);
        if ramp.elapsed_ms < f64::from(ramp.spec.delay_ms) {
            return true;
        }

        let done = ramp.elapsed_ms >= ramp.spec.total_ms();
        let raw = if done {
            ramp.spec.to
        } else {
            ramp.spec.sample(ramp.elapsed_ms)
        };
        let value = CounterValue {
            raw,
            display: ramp.spec.display,
            suffix: ramp.spec.suffix.clone(),
        };
        let changed = self.value.as_ref() != Some(&value);
        self.value = Some(value.clone());
        if changed || done {
            (ramp.on_update)(value);
        }

        if done {
            if let Some(mut ramp) = self.ramp.take() {
                if let Some(on_complete) = ramp.on_complete.take() {
                    on_complete();
                }
            }
            return false;
        }
        true
    }

    /// Stop the ramp in progress without completing it
    pub fn cancel(&mut self) {
        self.ramp = None;
    }

    pub fn is_running(&self) -> bool {
        self.ramp.is_some()
    }

    /// Last reported value
    pub fn value(&self) -> Option<&CounterValue> {
        self.value.as_ref()
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("running", &self.is_running())
            .field("value", &self.value)
            .finish()
    }
}
