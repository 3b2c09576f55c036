//! Trigger and engine configuration
//!
//! [`TriggerConfig`] is immutable once a trigger is created. Its serialized
//! form is flat, so scene files read like
//!
//! ```toml
//! start = "top top"
//! end = "+=800"
//! scrub = 0.5
//! pin = true
//! fire = "once"
//! ```
//!
//! A config without `start`/`end` activates on visibility instead, with
//! `amount` giving the visible fraction required.

use crate::position::Offset;
use crate::scroll::WindowSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unveil_core::{Error, Result};

/// What activates a trigger
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Activation {
    /// Entering the viewport with at least `amount` of the target visible;
    /// `None` uses [`EngineConfig::default_amount`]
    ///
    /// `margin` grows the viewport by that many pixels on every side before
    /// measuring; `-100.0` waits until the target is 100px inside.
    Visibility { amount: Option<f32>, margin: f32 },
    /// Scrolling into the window between two offsets
    Scroll { start: Offset, end: Offset },
}

impl Default for Activation {
    fn default() -> Self {
        Activation::Visibility {
            amount: None,
            margin: 0.0,
        }
    }
}

/// Whether a trigger survives its first completion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirePolicy {
    /// Dispose after the first completion
    Once,
    /// Re-arm when the target leaves
    #[default]
    Repeat,
}

/// How scroll position drives the timeline
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ScrubValue", into = "ScrubValue")]
pub enum Scrub {
    /// Play the timeline in time, controlled by toggle actions
    #[default]
    Off,
    /// Timeline progress equals window progress
    Immediate,
    /// Timeline progress trails window progress, catching up in about this
    /// many seconds
    Smooth(f32),
}

impl Scrub {
    pub fn is_scrubbed(&self) -> bool {
        !matches!(self, Scrub::Off)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum ScrubValue {
    Flag(bool),
    Seconds(f32),
}

impl From<ScrubValue> for Scrub {
    fn from(value: ScrubValue) -> Self {
        match value {
            ScrubValue::Flag(false) => Scrub::Off,
            ScrubValue::Flag(true) => Scrub::Immediate,
            ScrubValue::Seconds(secs) if secs > 0.0 => Scrub::Smooth(secs),
            ScrubValue::Seconds(_) => Scrub::Immediate,
        }
    }
}

impl From<Scrub> for ScrubValue {
    fn from(scrub: Scrub) -> Self {
        match scrub {
            Scrub::Off => ScrubValue::Flag(false),
            Scrub::Immediate => ScrubValue::Flag(true),
            Scrub::Smooth(secs) => ScrubValue::Seconds(secs),
        }
    }
}

/// What a time-driven timeline does at one toggle point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToggleAction {
    Play,
    Pause,
    Resume,
    Reverse,
    Restart,
    Reset,
    Complete,
    #[default]
    None,
}

impl ToggleAction {
    fn as_str(self) -> &'static str {
        match self {
            ToggleAction::Play => "play",
            ToggleAction::Pause => "pause",
            ToggleAction::Resume => "resume",
            ToggleAction::Reverse => "reverse",
            ToggleAction::Restart => "restart",
            ToggleAction::Reset => "reset",
            ToggleAction::Complete => "complete",
            ToggleAction::None => "none",
        }
    }
}

impl FromStr for ToggleAction {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Ok(match input.trim() {
            "play" => ToggleAction::Play,
            "pause" => ToggleAction::Pause,
            "resume" => ToggleAction::Resume,
            "reverse" => ToggleAction::Reverse,
            "restart" => ToggleAction::Restart,
            "reset" => ToggleAction::Reset,
            "complete" => ToggleAction::Complete,
            "none" => ToggleAction::None,
            other => {
                return Err(Error::parse(
                    "toggle action",
                    input,
                    format!("unknown action '{}'", other),
                ))
            }
        })
    }
}

/// Actions for entering, leaving, entering back and leaving back
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToggleActions {
    pub on_enter: ToggleAction,
    pub on_leave: ToggleAction,
    pub on_enter_back: ToggleAction,
    pub on_leave_back: ToggleAction,
}

impl Default for ToggleActions {
    /// `play none none none`
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::None,
        }
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter.as_str(),
            self.on_leave.as_str(),
            self.on_enter_back.as_str(),
            self.on_leave_back.as_str()
        )
    }
}

impl FromStr for ToggleActions {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let [on_enter, on_leave, on_enter_back, on_leave_back] = parts.as_slice() else {
            return Err(Error::parse(
                "toggle actions",
                input,
                format!("expected 4 actions, found {}", parts.len()),
            ));
        };
        Ok(Self {
            on_enter: on_enter.parse()?,
            on_leave: on_leave.parse()?,
            on_enter_back: on_enter_back.parse()?,
            on_leave_back: on_leave_back.parse()?,
        })
    }
}

impl TryFrom<String> for ToggleActions {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ToggleActions> for String {
    fn from(actions: ToggleActions) -> Self {
        actions.to_string()
    }
}

/// When and how a trigger fires
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "TriggerConfigDef", into = "TriggerConfigDef")]
pub struct TriggerConfig {
    pub activation: Activation,
    pub fire: FirePolicy,
    pub pin: bool,
    pub pin_spacing: bool,
    pub scrub: Scrub,
    pub actions: ToggleActions,
}

impl TriggerConfig {
    /// Activate when `amount` of the target is visible
    pub fn visibility(amount: f32) -> Self {
        Self {
            activation: Activation::Visibility {
                amount: Some(amount),
                margin: 0.0,
            },
            ..Self::default()
        }
    }

    /// Activate inside the scroll window `start`..`end`
    pub fn scroll(start: Offset, end: Offset) -> Self {
        Self {
            activation: Activation::Scroll { start, end },
            pin_spacing: true,
            ..Self::default()
        }
    }

    /// Dispose after the first completion (builder pattern)
    pub fn once(mut self) -> Self {
        self.fire = FirePolicy::Once;
        self
    }

    /// Re-arm on re-entry (builder pattern)
    pub fn repeat(mut self) -> Self {
        self.fire = FirePolicy::Repeat;
        self
    }

    /// Viewport margin for visibility activation (builder pattern)
    ///
    /// Has no effect on scroll activation.
    pub fn margin(mut self, px: f32) -> Self {
        if let Activation::Visibility { margin, .. } = &mut self.activation {
            *margin = px;
        }
        self
    }

    /// Pin the target while inside the window (builder pattern)
    pub fn pin(mut self, pin: bool) -> Self {
        self.pin = pin;
        self
    }

    /// Reserve space for the pinned target (builder pattern)
    pub fn pin_spacing(mut self, spacing: bool) -> Self {
        self.pin_spacing = spacing;
        self
    }

    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn actions(mut self, actions: ToggleActions) -> Self {
        self.actions = actions;
        self
    }

    /// Window bounds for scroll activation
    pub fn window(&self) -> Option<WindowSpec> {
        match self.activation {
            Activation::Scroll { start, end } => Some(self.window_between(start, end)),
            Activation::Visibility { .. } => None,
        }
    }

    pub(crate) fn window_between(&self, start: Offset, end: Offset) -> WindowSpec {
        WindowSpec {
            start,
            end,
            pin: self.pin,
            pin_spacing: self.pin_spacing,
        }
    }

    /// Reject combinations that need a scroll window
    pub fn validate(&self) -> Result<()> {
        let Activation::Visibility { amount, margin } = self.activation else {
            return Ok(());
        };
        let invalid = |reason: &str| Error::parse("trigger config", "visibility", reason);
        if self.pin {
            return Err(invalid("pin requires a scroll window (start/end)"));
        }
        if self.scrub.is_scrubbed() {
            return Err(invalid("scrub requires a scroll window (start/end)"));
        }
        if let Some(amount) = amount {
            if !(0.0..=1.0).contains(&amount) {
                return Err(invalid("amount must be between 0 and 1"));
            }
        }
        if !margin.is_finite() {
            return Err(invalid("margin must be a finite number of pixels"));
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct TriggerConfigDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    margin: Option<f32>,
    #[serde(default)]
    fire: FirePolicy,
    #[serde(default)]
    pin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pin_spacing: Option<bool>,
    #[serde(default)]
    scrub: Scrub,
    #[serde(default)]
    actions: ToggleActions,
}

impl TryFrom<TriggerConfigDef> for TriggerConfig {
    type Error = Error;

    fn try_from(def: TriggerConfigDef) -> Result<Self> {
        let activation = match (def.start, def.end) {
            (None, None) => Activation::Visibility {
                amount: def.amount,
                margin: def.margin.unwrap_or(0.0),
            },
            _ if def.margin.is_some() => {
                return Err(Error::parse(
                    "trigger config",
                    "margin",
                    "margin applies to visibility triggers only",
                ));
            }
            (start, end) => Activation::Scroll {
                start: start.unwrap_or(Offset::START),
                end: end.unwrap_or(Offset::END),
            },
        };
        let config = TriggerConfig {
            activation,
            fire: def.fire,
            pin: def.pin,
            pin_spacing: def.pin_spacing.unwrap_or(true),
            scrub: def.scrub,
            actions: def.actions,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<TriggerConfig> for TriggerConfigDef {
    fn from(config: TriggerConfig) -> Self {
        let (start, end, amount, margin) = match config.activation {
            Activation::Visibility { amount, margin } => {
                (None, None, amount, (margin != 0.0).then_some(margin))
            }
            Activation::Scroll { start, end } => (Some(start), Some(end), None, None),
        };
        TriggerConfigDef {
            start,
            end,
            amount,
            margin,
            fire: config.fire,
            pin: config.pin,
            pin_spacing: Some(config.pin_spacing),
            scrub: config.scrub,
            actions: config.actions,
        }
    }
}

/// Engine-wide tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Visible fraction for visibility triggers that do not set `amount`
    pub default_amount: f32,
    /// Longest frame delta honoured by `tick`, in milliseconds
    pub max_frame_ms: f32,
    /// Progress tolerance at which smoothed scrubbing snaps to its target
    pub settle_epsilon: f32,
    /// Stagger for timelines defined without one
    pub default_stagger: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_amount: 0.2,
            max_frame_ms: 100.0,
            settle_epsilon: 0.0005,
            default_stagger: 0.0,
        }
    }
}

impl EngineConfig {
    /// Parse from TOML; missing keys keep their defaults
    pub fn from_toml(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::parse("engine config", input, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Edge;

    #[test]
    fn test_parse_toggle_actions() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions.on_enter, ToggleAction::Play);
        assert_eq!(actions.on_leave, ToggleAction::None);
        assert_eq!(actions.on_leave_back, ToggleAction::Reverse);
        assert_eq!(actions.to_string(), "play none none reverse");

        assert_eq!(ToggleActions::default().to_string(), "play none none none");
        assert!("play none".parse::<ToggleActions>().is_err());
        assert!("play none none rewind".parse::<ToggleActions>().is_err());
    }

    #[test]
    fn test_flat_scroll_config() {
        let config: TriggerConfig = toml::from_str(
            r#"
            start = "top top"
            end = "+=800"
            scrub = 0.5
            pin = true
            fire = "once"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.activation,
            Activation::Scroll {
                start: Offset::anchor(Edge::TOP, Edge::TOP),
                end: Offset::Relative(800.0),
            }
        );
        assert_eq!(config.scrub, Scrub::Smooth(0.5));
        assert_eq!(config.fire, FirePolicy::Once);
        assert!(config.pin);
        assert!(config.pin_spacing);
    }

    #[test]
    fn test_flat_visibility_config() {
        let config: TriggerConfig = toml::from_str(
            r#"
            amount = 0.3
            actions = "restart none none reset"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.activation,
            Activation::Visibility {
                amount: Some(0.3),
                margin: 0.0,
            }
        );
        assert_eq!(config.fire, FirePolicy::Repeat);
        assert_eq!(config.actions.on_leave_back, ToggleAction::Reset);
        assert!(config.window().is_none());
    }

    #[test]
    fn test_visibility_margin() {
        let config: TriggerConfig = toml::from_str("margin = -100.0\nfire = \"once\"").unwrap();
        assert_eq!(
            config.activation,
            Activation::Visibility {
                amount: None,
                margin: -100.0,
            }
        );
        assert_eq!(
            TriggerConfig::visibility(0.2).margin(-100.0).activation,
            Activation::Visibility {
                amount: Some(0.2),
                margin: -100.0,
            }
        );

        // Scroll windows have no viewport margin
        assert!(toml::from_str::<TriggerConfig>("start = \"top 80%\"\nmargin = -100.0").is_err());
        let scroll = TriggerConfig::scroll(Offset::START, Offset::END).margin(-100.0);
        assert!(matches!(scroll.activation, Activation::Scroll { .. }));
        assert!(TriggerConfig::visibility(0.2).margin(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_scrub_forms() {
        #[derive(Deserialize)]
        struct Holder {
            scrub: Scrub,
        }
        let parse = |s: &str| toml::from_str::<Holder>(s).unwrap().scrub;
        assert_eq!(parse("scrub = false"), Scrub::Off);
        assert_eq!(parse("scrub = true"), Scrub::Immediate);
        assert_eq!(parse("scrub = 1.5"), Scrub::Smooth(1.5));
    }

    #[test]
    fn test_pin_needs_scroll_window() {
        let result = toml::from_str::<TriggerConfig>("pin = true");
        assert!(result.is_err());
        assert!(TriggerConfig::visibility(0.2).pin(true).validate().is_err());
        assert!(TriggerConfig::visibility(1.5).validate().is_err());
        assert!(TriggerConfig::scroll(Offset::START, Offset::END)
            .pin(true)
            .scrub(Scrub::Immediate)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::from_toml("max_frame_ms = 50.0").unwrap();
        assert_eq!(config.max_frame_ms, 50.0);
        assert_eq!(config.default_amount, 0.2);
        assert!(EngineConfig::from_toml("max_frame_ms = \"fast\"").is_err());
    }
}
