//! Timeline scheduler
//!
//! A [`Timeline`] is an ordered list of [`KeyframeStep`]s plus the declared
//! starting values of every property it touches. Evaluation is a pure function
//! of `(timeline, progress)`:
//!
//! - progress maps linearly onto the timeline's total span;
//! - a step contributes once the playhead reaches its start, and holds its end
//!   values after it finishes;
//! - finished steps apply in the order they finished, then running steps apply
//!   in declaration order, so a later-declared step overrides an earlier one
//!   wherever they overlap;
//! - a step without an explicit `from` value starts from whatever the property
//!   holds at the step's start instant (computed once, at build time).
//!
//! Groups of targets share one timeline. With a stagger, member `i` lags by
//! `i * interval` and every member is compressed so the last one still
//! finishes at progress 1.
//!
//! # Example
//!
//! ```rust
//! use unveil_animation::{Easing, Stagger, Timeline};
//! use unveil_core::{Property, PropertySet};
//!
//! let timeline = Timeline::builder()
//!     .from_to(
//!         PropertySet::new().with(Property::OPACITY, 0.0).with(Property::Y, 60.0),
//!         PropertySet::new().with(Property::OPACITY, 1.0).with(Property::Y, 0.0),
//!         1.0,
//!         "power3.out".parse::<Easing>().unwrap(),
//!     )
//!     .stagger(Stagger::Progress(0.1))
//!     .build()
//!     .unwrap();
//!
//! let frame = timeline.evaluate(0.5, &["a", "b", "c"]);
//! assert_eq!(frame.len(), 3);
//! ```

use crate::easing::Easing;
use crate::keyframe::{KeyframeStep, Position, StepDef};
use crate::values::Interpolate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unveil_core::{Error, PropertySet, Result};

/// How members of a group are offset from one another
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Stagger {
    #[default]
    None,
    /// Lag per member, in normalized group progress
    Progress(f32),
    /// Each member starts this many timeline units after the previous one;
    /// the group's total span grows with its size
    Each(f32),
}

impl Stagger {
    fn amount(&self) -> f32 {
        match *self {
            Stagger::None => 0.0,
            Stagger::Progress(s) | Stagger::Each(s) => s,
        }
    }
}

/// Ordered keyframe steps with optional per-member stagger
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    initial: PropertySet,
    steps: Vec<KeyframeStep>,
    /// Start value of every `to` property of each step
    begins: Vec<PropertySet>,
    stagger: Stagger,
    span: f32,
}

impl Timeline {
    /// Define a timeline from steps whose `from` sets declare starting values
    pub fn new(steps: Vec<KeyframeStep>, stagger: Stagger) -> Result<Self> {
        Self::with_initial(PropertySet::new(), steps, stagger)
    }

    /// Define a timeline with explicit starting values
    ///
    /// Properties absent from `initial` take the `from` value of the first
    /// step (in declaration order) that declares one. Every property a step
    /// animates must end up with a starting value.
    pub fn with_initial(
        mut initial: PropertySet,
        steps: Vec<KeyframeStep>,
        stagger: Stagger,
    ) -> Result<Self> {
        let amount = stagger.amount();
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidTimeline(format!(
                "stagger must be a non-negative number, got {}",
                amount
            )));
        }

        for (index, step) in steps.iter().enumerate() {
            if !step.start.is_finite() || step.start < 0.0 {
                return Err(Error::InvalidTimeline(format!(
                    "step {} starts at {}",
                    index, step.start
                )));
            }
            if !step.span.is_finite() || step.span < 0.0 {
                return Err(Error::InvalidTimeline(format!(
                    "step {} has span {}",
                    index, step.span
                )));
            }
            for (property, value) in step.from.iter() {
                if !initial.contains(property) {
                    initial.set(property.clone(), value);
                }
            }
        }

        for step in &steps {
            if let Some(missing) = step.to.properties().find(|p| !initial.contains(p)) {
                return Err(Error::InvalidTimeline(format!(
                    "property '{}' has no starting value; declare it in the initial set or a from value",
                    missing
                )));
            }
        }

        let mut begins: Vec<PropertySet> = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let before = sample_steps(&initial, &steps[..index], &begins, step.start);
            let begin = step
                .to
                .properties()
                .map(|property| {
                    let value = step
                        .from
                        .get(property)
                        .or_else(|| before.get(property))
                        .unwrap_or_default();
                    (property.clone(), value)
                })
                .collect();
            begins.push(begin);
        }

        let span = steps.iter().map(KeyframeStep::end).fold(0.0f32, f32::max);

        Ok(Self {
            initial,
            steps,
            begins,
            stagger,
            span,
        })
    }

    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::default()
    }

    /// Total span of one member's animation, in timeline units
    pub fn span(&self) -> f32 {
        self.span
    }

    pub fn steps(&self) -> &[KeyframeStep] {
        &self.steps
    }

    pub fn stagger(&self) -> Stagger {
        self.stagger
    }

    /// Declared starting values
    pub fn initial_values(&self) -> &PropertySet {
        &self.initial
    }

    /// Values once every step has finished
    pub fn final_values(&self) -> PropertySet {
        self.sample(1.0)
    }

    /// Total span for a group of `len` members, in timeline units
    ///
    /// Only [`Stagger::Each`] lengthens the group; other staggers fit inside
    /// the single-member span.
    pub fn group_span(&self, len: usize) -> f32 {
        match self.stagger {
            Stagger::Each(each) if len > 1 => self.span + each * (len - 1) as f32,
            _ => self.span,
        }
    }

    /// Whether the stagger is too large for `len` members and gets compressed
    pub fn stagger_compressed(&self, len: usize) -> bool {
        len > 1 && self.raw_interval(len) * (len - 1) as f32 >= 1.0
    }

    fn raw_interval(&self, len: usize) -> f32 {
        match self.stagger {
            Stagger::None => 0.0,
            Stagger::Progress(s) => s,
            Stagger::Each(each) => {
                let total = self.group_span(len);
                if total > 0.0 {
                    each / total
                } else {
                    0.0
                }
            }
        }
    }

    /// Normalized lag between consecutive members of a group of `len`
    pub fn interval(&self, len: usize) -> f32 {
        if len < 2 {
            return 0.0;
        }
        if self.stagger_compressed(len) {
            1.0 / len as f32
        } else {
            self.raw_interval(len)
        }
    }

    /// Progress of member `index` within a group of `len` at group `progress`
    pub fn member_progress(&self, progress: f32, index: usize, len: usize) -> f32 {
        let progress = progress.clamp(0.0, 1.0);
        let interval = self.interval(len);
        if interval <= 0.0 {
            return progress;
        }
        let window = 1.0 - interval * (len - 1) as f32;
        ((progress - interval * index as f32) / window).clamp(0.0, 1.0)
    }

    /// Property values for a single member at `progress`
    pub fn sample(&self, progress: f32) -> PropertySet {
        let progress = progress.clamp(0.0, 1.0);
        if progress <= 0.0 {
            return self.initial.clone();
        }
        sample_steps(&self.initial, &self.steps, &self.begins, progress * self.span)
    }

    /// Property values for every member of `group`, in index order
    pub fn evaluate<K: Copy>(&self, progress: f32, group: &[K]) -> Vec<(K, PropertySet)> {
        let len = group.len();
        group
            .iter()
            .enumerate()
            .map(|(index, &key)| (key, self.sample(self.member_progress(progress, index, len))))
            .collect()
    }
}

/// Evaluate `timeline` for `group` at `progress`
pub fn evaluate<K: Copy>(timeline: &Timeline, progress: f32, group: &[K]) -> Vec<(K, PropertySet)> {
    timeline.evaluate(progress, group)
}

/// Values at absolute offset `t` using only `steps` (with matching `begins`)
fn sample_steps(
    initial: &PropertySet,
    steps: &[KeyframeStep],
    begins: &[PropertySet],
    t: f32,
) -> PropertySet {
    // (finished?, finish offset, declaration index)
    let mut order: Vec<(bool, f32, usize)> = steps
        .iter()
        .enumerate()
        .filter(|(_, step)| t >= step.start)
        .map(|(index, step)| {
            let finished = step.span <= 0.0 || t >= step.end();
            (finished, if finished { step.end() } else { 0.0 }, index)
        })
        .collect();

    order.sort_by(|a, b| match (a.0, b.0) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)),
    });

    let mut values = initial.clone();
    for (_, _, index) in order {
        let step = &steps[index];
        let eased = step.easing.apply(step.local_progress(t));
        for (property, end) in step.to.iter() {
            let begin = begins[index].get(property).unwrap_or(end);
            values.set(property.clone(), begin.lerp(end, eased));
        }
    }
    values
}

/// Fluent construction with relative step positions
#[derive(Clone, Debug, Default)]
pub struct TimelineBuilder {
    initial: PropertySet,
    steps: Vec<KeyframeStep>,
    stagger: Stagger,
    end: f32,
}

impl TimelineBuilder {
    /// Declare starting values
    pub fn initial(mut self, values: PropertySet) -> Self {
        self.initial.merge(&values);
        self
    }

    /// Animate to `to` right after the previous step
    pub fn to(self, to: PropertySet, span: f32, easing: Easing) -> Self {
        self.to_at(Position::default(), to, span, easing)
    }

    pub fn to_at(self, position: Position, to: PropertySet, span: f32, easing: Easing) -> Self {
        self.from_to_at(position, PropertySet::new(), to, span, easing)
    }

    /// Animate from explicit `from` values to `to` right after the previous step
    pub fn from_to(self, from: PropertySet, to: PropertySet, span: f32, easing: Easing) -> Self {
        self.from_to_at(Position::default(), from, to, span, easing)
    }

    pub fn from_to_at(
        mut self,
        position: Position,
        from: PropertySet,
        to: PropertySet,
        span: f32,
        easing: Easing,
    ) -> Self {
        let previous = self.steps.last().map(|s| (s.start, s.end()));
        let start = position.resolve(previous, self.end);
        let step = KeyframeStep::new(to, span)
            .from(from)
            .at(start)
            .easing(easing);
        self.end = self.end.max(step.end());
        self.steps.push(step);
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn build(self) -> Result<Timeline> {
        Timeline::with_initial(self.initial, self.steps, self.stagger)
    }
}

/// Serializable timeline definition, as written in scene files
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDef {
    #[serde(default)]
    pub initial: PropertySet,
    #[serde(default)]
    pub steps: Vec<StepDef>,
    /// Normalized lag per member
    #[serde(default)]
    pub stagger: Option<f32>,
    /// Per-member delay in timeline units
    #[serde(default)]
    pub stagger_each: Option<f32>,
}

impl TimelineDef {
    pub fn build(&self) -> Result<Timeline> {
        let stagger = match (self.stagger, self.stagger_each) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidTimeline(
                    "set either stagger or stagger_each, not both".into(),
                ))
            }
            (Some(progress), None) => Stagger::Progress(progress),
            (None, Some(each)) => Stagger::Each(each),
            (None, None) => Stagger::None,
        };

        self.steps
            .iter()
            .fold(
                Timeline::builder().initial(self.initial.clone()).stagger(stagger),
                |builder, step| {
                    builder.from_to_at(
                        step.position,
                        step.from.clone(),
                        step.to.clone(),
                        step.span,
                        step.easing,
                    )
                },
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EaseMode;
    use unveil_core::Property;

    const EPSILON: f32 = 1e-4;

    fn props(pairs: &[(&'static str, f32)]) -> PropertySet {
        pairs.iter().map(|&(k, v)| (k, v)).collect()
    }

    fn entrance() -> Timeline {
        Timeline::builder()
            .from_to(
                props(&[("opacity", 0.0), ("y", 60.0)]),
                props(&[("opacity", 1.0), ("y", 0.0)]),
                1.0,
                Easing::Linear,
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_boundaries_reproduce_declared_values() {
        let timeline = Timeline::builder()
            .initial(props(&[("width", 400.0), ("border_radius", 24.0)]))
            .to(props(&[("width", 1280.0), ("border_radius", 0.0)]), 1.0, Easing::power(2, EaseMode::InOut))
            .from_to_at(
                ">0.2".parse().unwrap(),
                props(&[("opacity", 0.0)]),
                props(&[("opacity", 1.0)]),
                0.5,
                Easing::power(2, EaseMode::InOut),
            )
            .build()
            .unwrap();

        let start = timeline.sample(0.0);
        assert_eq!(start.get(&Property::WIDTH), Some(400.0));
        assert_eq!(start.get(&Property::BORDER_RADIUS), Some(24.0));
        assert_eq!(start.get(&Property::OPACITY), Some(0.0));

        let end = timeline.sample(1.0);
        assert_eq!(end.get(&Property::WIDTH), Some(1280.0));
        assert_eq!(end.get(&Property::BORDER_RADIUS), Some(0.0));
        assert_eq!(end.get(&Property::OPACITY), Some(1.0));
    }

    #[test]
    fn test_linear_midpoint() {
        let mid = entrance().sample(0.5);
        assert!((mid.get(&Property::OPACITY).unwrap() - 0.5).abs() < EPSILON);
        assert!((mid.get(&Property::Y).unwrap() - 30.0).abs() < EPSILON);
    }

    #[test]
    fn test_step_holds_before_start() {
        // Opacity fades only in the second half
        let timeline = Timeline::builder()
            .initial(props(&[("opacity", 0.0), ("x", 0.0)]))
            .to(props(&[("x", 100.0)]), 1.0, Easing::Linear)
            .to(props(&[("opacity", 1.0)]), 1.0, Easing::Linear)
            .build()
            .unwrap();

        let quarter = timeline.sample(0.25);
        assert_eq!(quarter.get(&Property::OPACITY), Some(0.0));
        assert!((quarter.get(&Property::X).unwrap() - 50.0).abs() < EPSILON);

        let three_quarters = timeline.sample(0.75);
        assert!((three_quarters.get(&Property::OPACITY).unwrap() - 0.5).abs() < EPSILON);
        assert_eq!(three_quarters.get(&Property::X), Some(100.0));
    }

    #[test]
    fn test_overlap_later_declaration_wins() {
        let timeline = Timeline::builder()
            .initial(props(&[("opacity", 0.0)]))
            .to_at(Position::At(0.0), props(&[("opacity", 1.0)]), 2.0, Easing::Linear)
            .to_at(Position::At(1.0), props(&[("opacity", 0.0)]), 1.0, Easing::Linear)
            .build()
            .unwrap();

        // Second step starts from the first step's value at t = 1 (0.5)
        assert!((timeline.sample(0.5).get(&Property::OPACITY).unwrap() - 0.5).abs() < EPSILON);
        // Inside the overlap the second step drives the value down
        assert!((timeline.sample(0.75).get(&Property::OPACITY).unwrap() - 0.25).abs() < EPSILON);
        assert_eq!(timeline.sample(1.0).get(&Property::OPACITY), Some(0.0));
    }

    #[test]
    fn test_step_starts_from_previous_result() {
        let timeline = Timeline::builder()
            .initial(props(&[("scale", 1.0)]))
            .to(props(&[("scale", 2.0)]), 1.0, Easing::Linear)
            .to(props(&[("scale", 0.0)]), 1.0, Easing::Linear)
            .build()
            .unwrap();

        // Second step runs 2.0 -> 0.0 over the second half
        assert!((timeline.sample(0.75).get(&Property::SCALE).unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_missing_start_value_rejected() {
        let result = Timeline::builder()
            .to(props(&[("y", 0.0)]), 1.0, Easing::Linear)
            .build();
        assert!(matches!(result, Err(Error::InvalidTimeline(_))));
    }

    #[test]
    fn test_negative_stagger_rejected() {
        let result = Timeline::new(Vec::new(), Stagger::Progress(-0.1));
        assert!(matches!(result, Err(Error::InvalidTimeline(_))));
    }

    #[test]
    fn test_stagger_members_lag_by_index() {
        let timeline = Timeline::builder()
            .from_to(props(&[("opacity", 0.0)]), props(&[("opacity", 1.0)]), 1.0, Easing::Linear)
            .stagger(Stagger::Progress(0.1))
            .build()
            .unwrap();

        let at = |p: f32| -> Vec<f32> { (0..3).map(|i| timeline.member_progress(p, i, 3)).collect() };

        let early = at(0.1);
        assert!(early[0] >= early[1] && early[1] >= early[2]);
        assert!(early[0] > 0.0);

        for p in [0.0, 0.05, 0.3, 0.6, 0.95, 1.0] {
            let members = at(p);
            assert!(members.windows(2).all(|w| w[0] >= w[1]), "at {p}: {members:?}");
            assert!(members.iter().all(|m| (0.0..=1.0).contains(m)));
        }

        // The last member finishes exactly at the group deadline
        assert_eq!(at(1.0), vec![1.0, 1.0, 1.0]);
        assert!(at(0.99)[2] < 1.0);
    }

    #[test]
    fn test_stagger_compressed_when_too_large() {
        let timeline = Timeline::builder()
            .from_to(props(&[("opacity", 0.0)]), props(&[("opacity", 1.0)]), 1.0, Easing::Linear)
            .stagger(Stagger::Progress(0.4))
            .build()
            .unwrap();

        assert!(!timeline.stagger_compressed(2));
        assert!(timeline.stagger_compressed(4));
        assert!((timeline.interval(4) - 0.25).abs() < EPSILON);
        assert_eq!(timeline.member_progress(1.0, 3, 4), 1.0);
        assert_eq!(timeline.member_progress(0.75, 3, 4), 0.0);
    }

    #[test]
    fn test_stagger_each_extends_group() {
        // One-second cards starting 0.2s apart, three cards: 1.4s total
        let timeline = Timeline::builder()
            .from_to(props(&[("opacity", 0.0)]), props(&[("opacity", 1.0)]), 1.0, Easing::Linear)
            .stagger(Stagger::Each(0.2))
            .build()
            .unwrap();

        assert!((timeline.group_span(3) - 1.4).abs() < EPSILON);
        // Second card starts at 0.2 / 1.4 of the group
        let start_of_second = 0.2 / 1.4;
        assert_eq!(timeline.member_progress(start_of_second - 0.01, 1, 3), 0.0);
        assert!(timeline.member_progress(start_of_second + 0.05, 1, 3) > 0.0);
    }

    #[test]
    fn test_evaluate_is_pure_and_ordered() {
        let timeline = Timeline::builder()
            .from_to(props(&[("y", 60.0)]), props(&[("y", 0.0)]), 1.0, Easing::back_out(1.6))
            .stagger(Stagger::Progress(0.2))
            .build()
            .unwrap();

        let group = [10u32, 20, 30];
        let first = evaluate(&timeline, 0.42, &group);
        let second = evaluate(&timeline, 0.42, &group);
        assert_eq!(first, second);
        assert_eq!(first.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_timeline_def_builds() {
        let def: TimelineDef = serde_json::from_str(
            r#"{
                "initial": { "opacity": 0.0 },
                "steps": [
                    { "to": { "opacity": 1.0 }, "span": 0.5, "easing": "power2.inOut" },
                    { "to": { "opacity": 0.0 }, "span": 0.5, "position": ">0.2" }
                ],
                "stagger": 0.1
            }"#,
        )
        .unwrap();

        let timeline = def.build().unwrap();
        assert_eq!(timeline.steps().len(), 2);
        assert!((timeline.steps()[1].start - 0.7).abs() < EPSILON);
        assert!((timeline.span() - 1.2).abs() < EPSILON);
        assert_eq!(timeline.stagger(), Stagger::Progress(0.1));
    }
}
