//! Keyframe steps and their placement on a timeline
//!
//! A [`KeyframeStep`] is one property transition: target values, an optional
//! explicit start set, a span and an easing, placed at an absolute offset on
//! its timeline. Offsets and spans share one unit (seconds for time-driven
//! playback; for scrubbed timelines only the ratios matter).
//!
//! [`Position`] is the authoring form of an offset and is resolved into an
//! absolute start by [`crate::timeline::TimelineBuilder`].

use crate::easing::Easing;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unveil_core::{Error, PropertySet};

/// One property-transition instruction within a timeline
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeStep {
    /// Values at the end of the step
    pub to: PropertySet,
    /// Explicit values at the start of the step; properties missing here start
    /// from whatever they hold when the step begins
    pub from: PropertySet,
    /// Absolute offset of the step's start within the timeline
    pub start: f32,
    /// Length of the step (zero applies `to` instantly)
    pub span: f32,
    pub easing: Easing,
}

impl KeyframeStep {
    pub fn new(to: PropertySet, span: f32) -> Self {
        Self {
            to,
            from: PropertySet::new(),
            start: 0.0,
            span,
            easing: Easing::Linear,
        }
    }

    /// Explicit start values (builder pattern)
    pub fn from(mut self, from: PropertySet) -> Self {
        self.from = from;
        self
    }

    /// Absolute start offset (builder pattern)
    pub fn at(mut self, start: f32) -> Self {
        self.start = start;
        self
    }

    /// Set easing (builder pattern)
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn end(&self) -> f32 {
        self.start + self.span
    }

    /// Local progress of this step at timeline offset `t`, clamped to 0.0-1.0
    pub fn local_progress(&self, t: f32) -> f32 {
        if self.span <= 0.0 {
            return if t >= self.start { 1.0 } else { 0.0 };
        }
        ((t - self.start) / self.span).clamp(0.0, 1.0)
    }
}

/// Where a step starts relative to the timeline built so far
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    /// Absolute offset: `"1.5"`
    At(f32),
    /// After the previous step ends, plus a gap: `">"`, `">0.2"`, `">-0.1"`
    AfterPrevious(f32),
    /// When the previous step starts, plus an offset: `"<"`, `"<0.3"`
    WithPrevious(f32),
    /// After the end of everything so far, plus a gap: `"+=0.5"`, `"-=0.2"`
    AfterEnd(f32),
}

impl Default for Position {
    fn default() -> Self {
        Position::AfterPrevious(0.0)
    }
}

impl Position {
    /// Resolve to an absolute offset given the previous step's bounds and the
    /// current end of the timeline
    pub fn resolve(&self, previous: Option<(f32, f32)>, timeline_end: f32) -> f32 {
        let (prev_start, prev_end) = previous.unwrap_or((0.0, 0.0));
        let start = match *self {
            Position::At(at) => at,
            Position::AfterPrevious(gap) => prev_end + gap,
            Position::WithPrevious(offset) => prev_start + offset,
            Position::AfterEnd(gap) => timeline_end + gap,
        };
        start.max(0.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Position::At(at) => write!(f, "{}", at),
            Position::AfterPrevious(gap) if gap == 0.0 => f.write_str(">"),
            Position::AfterPrevious(gap) => write!(f, ">{}", gap),
            Position::WithPrevious(offset) if offset == 0.0 => f.write_str("<"),
            Position::WithPrevious(offset) => write!(f, "<{}", offset),
            Position::AfterEnd(gap) if gap < 0.0 => write!(f, "-={}", -gap),
            Position::AfterEnd(gap) => write!(f, "+={}", gap),
        }
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let number = |s: &str| -> Result<f32, Error> {
            if s.is_empty() {
                return Ok(0.0);
            }
            s.trim()
                .parse::<f32>()
                .map_err(|_| Error::parse("position", input, format!("'{}' is not a number", s)))
        };

        if let Some(rest) = text.strip_prefix('>') {
            return Ok(Position::AfterPrevious(number(rest)?));
        }
        if let Some(rest) = text.strip_prefix('<') {
            return Ok(Position::WithPrevious(number(rest)?));
        }
        if let Some(rest) = text.strip_prefix("+=") {
            return Ok(Position::AfterEnd(number(rest)?));
        }
        if let Some(rest) = text.strip_prefix("-=") {
            return Ok(Position::AfterEnd(-number(rest)?));
        }
        if text.is_empty() {
            return Err(Error::parse("position", input, "empty position"));
        }
        Ok(Position::At(number(text)?))
    }
}

impl TryFrom<String> for Position {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.to_string()
    }
}

/// Serializable authoring form of a step, as written in scene files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
    pub to: PropertySet,
    #[serde(default)]
    pub from: PropertySet,
    #[serde(default = "default_span")]
    pub span: f32,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub position: Position,
}

fn default_span() -> f32 {
    0.5
}
