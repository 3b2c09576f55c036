//! Trigger registry
//!
//! The [`Registry`] owns every registered target and trigger. The host feeds
//! it events (`scroll_to`, `resize`, `tick`, `refresh`) and receives output
//! through a [`Presenter`]:
//!
//! 1. pending disposals from [`RegistryHandle`]s are applied;
//! 2. visibility is measured and scroll windows are recomputed;
//! 3. triggers are stepped in registration order, producing lifecycle
//!    notifications, counter values and computed target states;
//! 4. outputs are delivered in that order, skipping any trigger disposed in
//!    the meantime (including by the presenter itself, through a handle).
//!
//! Targets whose geometry disappears are dropped along with every trigger
//! that uses them; this is logged, not reported as an error.

use crate::config::{Activation, EngineConfig, FirePolicy, Scrub, ToggleAction, TriggerConfig};
use crate::observer::{SubscriptionId, ViewportObserver};
use crate::presenter::Presenter;
use crate::scroll::{ScrollTracker, WindowId, WindowUpdate};
use crate::trigger::{TriggerEvent, TriggerId, TriggerState};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::{smallvec, SmallVec};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use unveil_animation::{
    Counter, CounterSpec, CounterValue, KeyframeStep, PlayState, Playhead, Spring, SpringConfig,
    Stagger, Timeline,
};
use unveil_core::{
    Error, Geometry, Placement, PropertySet, Rect, Result, Size, TargetId, TargetKey, VisualState,
};

/// A counter attached to a trigger
///
/// The counter has its own fire policy: a `Once` counter runs on the first
/// activation only, even when its trigger repeats.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterBinding {
    pub spec: CounterSpec,
    pub fire: FirePolicy,
}

impl CounterBinding {
    pub fn new(spec: CounterSpec) -> Self {
        Self {
            spec,
            fire: FirePolicy::Once,
        }
    }

    /// Run again on every activation (builder pattern)
    pub fn repeat(mut self) -> Self {
        self.fire = FirePolicy::Repeat;
        self
    }
}

/// Everything needed to create a trigger
#[derive(Clone, Debug)]
pub struct TriggerSpec {
    pub config: TriggerConfig,
    /// Animated targets; the first one is also the observed / pinned element
    pub targets: Vec<TargetId>,
    pub timeline: Option<Timeline>,
    pub counter: Option<CounterBinding>,
}

impl TriggerSpec {
    pub fn new(config: TriggerConfig, targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self {
            config,
            targets: targets.into_iter().collect(),
            timeline: None,
            counter: None,
        }
    }

    pub fn timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    pub fn counter(mut self, counter: CounterBinding) -> Self {
        self.counter = Some(counter);
        self
    }
}

/// Weak handle for requesting disposal from inside presenter callbacks
///
/// Requests take effect before the next output is delivered and suppress
/// every output still queued for the trigger.
#[derive(Clone, Debug)]
pub struct RegistryHandle {
    pending: Weak<RefCell<FxHashSet<TriggerId>>>,
}

impl RegistryHandle {
    /// Request disposal; returns `false` if the registry is gone
    pub fn dispose(&self, trigger: TriggerId) -> bool {
        match self.pending.upgrade() {
            Some(pending) => {
                pending.borrow_mut().insert(trigger);
                true
            }
            None => false,
        }
    }

    /// Check if the registry is still alive
    pub fn is_alive(&self) -> bool {
        self.pending.strong_count() > 0
    }
}

struct TargetEntry {
    key: TargetKey,
    geometry: Box<dyn Geometry>,
    triggers: SmallVec<[TriggerId; 4]>,
}

#[derive(Clone, Copy, Debug)]
enum Binding {
    Visibility(SubscriptionId),
    Scroll(WindowId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Crossing {
    Enter,
    Leave,
    EnterBack,
    LeaveBack,
}

enum CounterEvent {
    Update(TriggerId, CounterValue),
    Complete(TriggerId),
}

type CounterOutbox = Rc<RefCell<VecDeque<CounterEvent>>>;

enum Output {
    Apply(TriggerId, TargetId, VisualState),
    Enter(TriggerId),
    Leave(TriggerId),
    Fire(TriggerId),
    Counter(TriggerId, CounterValue),
    CounterComplete(TriggerId),
}

impl Output {
    fn trigger(&self) -> TriggerId {
        match self {
            Output::Apply(id, ..)
            | Output::Enter(id)
            | Output::Leave(id)
            | Output::Fire(id)
            | Output::Counter(id, _)
            | Output::CounterComplete(id) => *id,
        }
    }
}

struct CounterSlot {
    binding: CounterBinding,
    counter: Counter,
    runs: u32,
}

struct TriggerEntry {
    config: TriggerConfig,
    targets: SmallVec<[TargetId; 4]>,
    binding: Binding,
    state: TriggerState,
    timeline: Option<Timeline>,
    /// Time-driven playback for unscrubbed timelines
    playhead: Option<Playhead>,
    /// Smoothed progress for `Scrub::Smooth`
    smoothing: Option<Spring>,
    window_progress: f32,
    placement: Placement,
    counter: Option<CounterSlot>,
    counter_running: bool,
    /// `on_fire` already emitted since the last entry
    fired: bool,
}

impl TriggerEntry {
    fn transition(&mut self, id: TriggerId, event: TriggerEvent) -> bool {
        match self.state.on_event(event, self.config.fire) {
            Some(next) => {
                tracing::debug!(?id, from = ?self.state, to = ?next, ?event, "trigger transition");
                self.state = next;
                true
            }
            None => false,
        }
    }

    fn crossings(
        &mut self,
        visibility: &FxHashMap<SubscriptionId, bool>,
        windows: &FxHashMap<WindowId, WindowUpdate>,
    ) -> SmallVec<[Crossing; 2]> {
        match self.binding {
            Binding::Visibility(subscription) => match visibility.get(&subscription) {
                Some(true) => smallvec![Crossing::Enter],
                Some(false) => smallvec![Crossing::Leave],
                None => SmallVec::new(),
            },
            Binding::Scroll(window) => {
                let Some(update) = windows.get(&window) else {
                    return SmallVec::new();
                };
                self.window_progress = update.progress;
                self.placement = update.placement;
                zone_crossings(update.previous.unwrap_or(0.0), update.progress)
            }
        }
    }

    fn cross(&mut self, id: TriggerId, crossing: Crossing, outbox: &CounterOutbox, out: &mut Vec<Output>) {
        let actions = self.config.actions;
        let (event, action) = match crossing {
            Crossing::Enter => (TriggerEvent::Enter, actions.on_enter),
            Crossing::EnterBack => (TriggerEvent::Enter, actions.on_enter_back),
            Crossing::Leave => (TriggerEvent::Leave, actions.on_leave),
            Crossing::LeaveBack => (TriggerEvent::Leave, actions.on_leave_back),
        };
        if !self.transition(id, event) {
            return;
        }

        if event == TriggerEvent::Enter {
            out.push(Output::Enter(id));
            self.fired = false;
            self.start_counter(id, outbox);
        } else {
            out.push(Output::Leave(id));
        }

        if let Some(playhead) = self.playhead.as_mut() {
            apply_action(playhead, action);
        }
    }

    fn start_counter(&mut self, id: TriggerId, outbox: &CounterOutbox) {
        let Some(slot) = self.counter.as_mut() else {
            return;
        };
        if slot.binding.fire == FirePolicy::Once && slot.runs > 0 {
            return;
        }
        slot.runs += 1;

        let updates = outbox.clone();
        let completions = outbox.clone();
        slot.counter.start(
            slot.binding.spec.clone(),
            move |value| updates.borrow_mut().push_back(CounterEvent::Update(id, value)),
            move || completions.borrow_mut().push_back(CounterEvent::Complete(id)),
        );
        self.counter_running = true;
    }

    fn advance(&mut self, dt_ms: f32, outbox: &CounterOutbox, out: &mut Vec<Output>) {
        if let Some(playhead) = self.playhead.as_mut() {
            if let Some(event) = playhead.tick(dt_ms) {
                tracing::trace!(?event, "playhead reached an end");
            }
        }

        if let Some(spring) = self.smoothing.as_mut() {
            spring.set_target(self.window_progress);
            if dt_ms > 0.0 {
                spring.step(dt_ms / 1000.0);
            }
        }

        if let Some(slot) = self.counter.as_mut() {
            if dt_ms > 0.0 {
                slot.counter.tick(f64::from(dt_ms));
            }
        }

        let events: Vec<CounterEvent> = outbox.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                CounterEvent::Update(trigger, value) => out.push(Output::Counter(trigger, value)),
                CounterEvent::Complete(trigger) => {
                    self.counter_running = false;
                    out.push(Output::CounterComplete(trigger));
                }
            }
        }
    }

    /// Normalized progress that drives the timeline
    fn progress(&self) -> f32 {
        if let Some(playhead) = &self.playhead {
            return playhead.progress();
        }
        if let Some(spring) = &self.smoothing {
            return spring.value().clamp(0.0, 1.0);
        }
        self.window_progress
    }

    fn animation_done(&self) -> bool {
        if let Some(playhead) = &self.playhead {
            return playhead.state() == PlayState::Finished && playhead.progress() >= 1.0;
        }
        match self.binding {
            Binding::Scroll(_) => self.progress() >= 1.0,
            Binding::Visibility(_) => self.state == TriggerState::Active,
        }
    }

    fn emit_states(
        &self,
        id: TriggerId,
        applied: &mut FxHashMap<(TriggerId, TargetId), VisualState>,
        out: &mut Vec<Output>,
    ) {
        if self.timeline.is_none() && !self.config.pin {
            return;
        }

        let progress = self.progress();
        let frame: Vec<(TargetId, PropertySet)> = match &self.timeline {
            Some(timeline) => timeline.evaluate(progress, &self.targets),
            None => self
                .targets
                .iter()
                .take(1)
                .map(|&target| (target, PropertySet::new()))
                .collect(),
        };

        for (index, (target, properties)) in frame.into_iter().enumerate() {
            let placement = if index == 0 && self.config.pin {
                self.placement
            } else {
                Placement::Flow
            };
            let state = VisualState::new(properties, placement);
            if applied.get(&(id, target)) == Some(&state) {
                continue;
            }
            tracing::trace!(?id, ?target, progress, "target state changed");
            applied.insert((id, target), state.clone());
            out.push(Output::Apply(id, target, state));
        }
    }

    fn check_complete(&mut self, id: TriggerId, out: &mut Vec<Output>) {
        if self.fired || self.counter_running || !self.animation_done() {
            return;
        }
        if self.transition(id, TriggerEvent::Complete) {
            self.fired = true;
            out.push(Output::Fire(id));
        }
    }
}

fn zone(progress: f32) -> u8 {
    if progress <= 0.0 {
        0
    } else if progress >= 1.0 {
        2
    } else {
        1
    }
}

fn zone_crossings(from: f32, to: f32) -> SmallVec<[Crossing; 2]> {
    match (zone(from), zone(to)) {
        (0, 1) => smallvec![Crossing::Enter],
        (0, 2) => smallvec![Crossing::Enter, Crossing::Leave],
        (1, 2) => smallvec![Crossing::Leave],
        (2, 1) => smallvec![Crossing::EnterBack],
        (2, 0) => smallvec![Crossing::EnterBack, Crossing::LeaveBack],
        (1, 0) => smallvec![Crossing::LeaveBack],
        _ => SmallVec::new(),
    }
}

fn apply_action(playhead: &mut Playhead, action: ToggleAction) {
    match action {
        ToggleAction::Play => playhead.play(),
        ToggleAction::Pause => playhead.pause(),
        ToggleAction::Resume => playhead.resume(),
        ToggleAction::Reverse => playhead.reverse(),
        ToggleAction::Restart => playhead.restart(),
        ToggleAction::Reset => playhead.reset(),
        ToggleAction::Complete => playhead.complete(),
        ToggleAction::None => {}
    }
}

/// Owns targets and triggers and turns host events into presenter output
pub struct Registry {
    config: EngineConfig,
    targets: SlotMap<TargetId, TargetEntry>,
    keys: FxHashMap<TargetKey, TargetId>,
    triggers: SlotMap<TriggerId, TriggerEntry>,
    /// Live triggers in registration order
    order: Vec<TriggerId>,
    observer: ViewportObserver,
    tracker: ScrollTracker,
    scroll_y: f32,
    outbox: CounterOutbox,
    pending: Rc<RefCell<FxHashSet<TriggerId>>>,
    /// Last state handed to the presenter per trigger and target
    applied: FxHashMap<(TriggerId, TargetId), VisualState>,
}

impl Registry {
    pub fn new(viewport: Size) -> Self {
        Self::with_config(viewport, EngineConfig::default())
    }

    pub fn with_config(viewport: Size, config: EngineConfig) -> Self {
        Self {
            config,
            targets: SlotMap::with_key(),
            keys: FxHashMap::default(),
            triggers: SlotMap::with_key(),
            order: Vec::new(),
            observer: ViewportObserver::new(),
            tracker: ScrollTracker::new(viewport),
            scroll_y: 0.0,
            outbox: Rc::new(RefCell::new(VecDeque::new())),
            pending: Rc::new(RefCell::new(FxHashSet::default())),
            applied: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn handle(&self) -> RegistryHandle {
        RegistryHandle {
            pending: Rc::downgrade(&self.pending),
        }
    }

    pub fn viewport(&self) -> Size {
        self.tracker.viewport()
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Number of live triggers
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an element under a unique key
    pub fn register_target(
        &mut self,
        key: impl Into<TargetKey>,
        geometry: impl Geometry + 'static,
    ) -> Result<TargetId> {
        let key = key.into();
        if self.keys.contains_key(&key) {
            return Err(Error::DuplicateRegistration { target: key });
        }
        let id = self.targets.insert(TargetEntry {
            key: key.clone(),
            geometry: Box::new(geometry),
            triggers: SmallVec::new(),
        });
        tracing::debug!(?id, target = %key, "target registered");
        self.keys.insert(key, id);
        Ok(id)
    }

    pub fn target_id(&self, key: &TargetKey) -> Option<TargetId> {
        self.keys.get(key).copied()
    }

    pub fn target_key(&self, target: TargetId) -> Option<&TargetKey> {
        self.targets.get(target).map(|t| &t.key)
    }

    /// Build a timeline, using the engine's default stagger when none is given
    pub fn define_timeline(&self, steps: Vec<KeyframeStep>, stagger: Option<Stagger>) -> Result<Timeline> {
        let stagger = stagger.unwrap_or_else(|| {
            if self.config.default_stagger > 0.0 {
                Stagger::Progress(self.config.default_stagger)
            } else {
                Stagger::None
            }
        });
        Timeline::new(steps, stagger)
    }

    /// Create and arm a trigger
    ///
    /// Nothing is delivered until the next event.
    pub fn create_trigger(&mut self, spec: TriggerSpec) -> Result<TriggerId> {
        let TriggerSpec {
            config,
            targets,
            timeline,
            counter,
        } = spec;

        config.validate()?;
        let Some(&lead) = targets.first() else {
            return Err(Error::EmptyGroup);
        };
        if targets.iter().any(|t| !self.targets.contains_key(*t)) {
            return Err(Error::UnknownTarget);
        }

        let lead_entry = &self.targets[lead];
        let binding = match config.activation {
            Activation::Scroll { start, end } => {
                let rect = lead_entry.geometry.measure().ok_or_else(|| Error::TargetGone {
                    target: lead_entry.key.clone(),
                })?;
                let window = config.window_between(start, end);
                let id = self
                    .tracker
                    .register_window(lead, lead_entry.key.clone(), rect, window)?;
                Binding::Scroll(id)
            }
            Activation::Visibility { amount, margin } => {
                let amount = amount.unwrap_or(self.config.default_amount);
                let subscription = self.observer.observe(lead, amount);
                self.observer.set_margin(subscription, margin);
                Binding::Visibility(subscription)
            }
        };

        let mut group: SmallVec<[TargetId; 4]> = SmallVec::new();
        for target in targets {
            if !group.contains(&target) {
                group.push(target);
            }
        }

        if let Some(timeline) = &timeline {
            if timeline.stagger_compressed(group.len()) {
                tracing::warn!(
                    members = group.len(),
                    stagger = ?timeline.stagger(),
                    "stagger too large for group; compressing to 1/n"
                );
            }
        }

        let playhead = match (&timeline, config.scrub) {
            (Some(timeline), Scrub::Off) => Some(Playhead::new(timeline.group_span(group.len()) * 1000.0)),
            _ => None,
        };
        let smoothing = match config.scrub {
            Scrub::Smooth(seconds) => Some(
                Spring::new(SpringConfig::settling_in(seconds), 0.0)
                    .with_epsilon(self.config.settle_epsilon),
            ),
            _ => None,
        };

        let mut entry = TriggerEntry {
            config,
            targets: group.clone(),
            binding,
            state: TriggerState::Idle,
            timeline,
            playhead,
            smoothing,
            window_progress: 0.0,
            placement: Placement::Flow,
            counter: counter.map(|binding| CounterSlot {
                binding,
                counter: Counter::new(),
                runs: 0,
            }),
            counter_running: false,
            fired: false,
        };

        let id = self.triggers.insert_with_key(|id| {
            entry.transition(id, TriggerEvent::Arm);
            entry
        });
        self.order.push(id);
        for target in group {
            if let Some(target) = self.targets.get_mut(target) {
                target.triggers.push(id);
            }
        }
        Ok(id)
    }

    pub fn trigger_state(&self, trigger: TriggerId) -> Option<TriggerState> {
        self.triggers.get(trigger).map(|t| t.state)
    }

    /// Progress currently driving the trigger's timeline
    pub fn progress(&self, trigger: TriggerId) -> Option<f32> {
        self.triggers.get(trigger).map(TriggerEntry::progress)
    }

    /// Resolved scroll window of a scroll-activated trigger
    pub fn window(&self, trigger: TriggerId) -> Option<(f32, f32)> {
        match self.triggers.get(trigger)?.binding {
            Binding::Scroll(window) => self.tracker.bounds(window),
            Binding::Visibility(_) => None,
        }
    }

    // =========================================================================
    // Disposal
    // =========================================================================

    pub fn dispose(&mut self, trigger: TriggerId) -> Result<()> {
        self.pending.borrow_mut().remove(&trigger);
        if self.remove_trigger(trigger, "disposed") {
            Ok(())
        } else {
            Err(Error::UnknownTrigger)
        }
    }

    /// Remove a target and every trigger that animates it
    pub fn dispose_target(&mut self, target: TargetId) -> Result<()> {
        let entry = self.targets.remove(target).ok_or(Error::UnknownTarget)?;
        self.keys.remove(&entry.key);
        for trigger in entry.triggers {
            self.remove_trigger(trigger, "target disposed");
        }
        self.applied.retain(|(_, t), _| *t != target);
        tracing::debug!(?target, key = %entry.key, "target disposed");
        Ok(())
    }

    /// Tear down every trigger and target
    pub fn dispose_all(&mut self) {
        for trigger in self.order.clone() {
            self.remove_trigger(trigger, "dispose all");
        }
        self.targets.clear();
        self.keys.clear();
        self.applied.clear();
        self.pending.borrow_mut().clear();
        self.outbox.borrow_mut().clear();
    }

    fn remove_trigger(&mut self, id: TriggerId, reason: &'static str) -> bool {
        let Some(mut entry) = self.triggers.remove(id) else {
            return false;
        };
        entry.transition(id, TriggerEvent::Dispose);

        match entry.binding {
            Binding::Visibility(subscription) => {
                self.observer.unobserve(subscription);
            }
            Binding::Scroll(window) => {
                if self.tracker.unregister(window) == Some(true) {
                    tracing::debug!(?id, "pin released by disposal");
                }
            }
        }
        if let Some(slot) = entry.counter.as_mut() {
            slot.counter.cancel();
        }

        self.order.retain(|t| *t != id);
        for target in &entry.targets {
            if let Some(target) = self.targets.get_mut(*target) {
                target.triggers.retain(|t| *t != id);
            }
        }
        self.applied.retain(|(t, _), _| *t != id);
        self.outbox.borrow_mut().retain(|event| match event {
            CounterEvent::Update(t, _) | CounterEvent::Complete(t) => *t != id,
        });

        tracing::debug!(?id, reason, "trigger disposed");
        true
    }

    fn absorb_pending(&mut self) {
        let pending: Vec<TriggerId> = self.pending.borrow_mut().drain().collect();
        for id in pending {
            self.remove_trigger(id, "disposed through handle");
        }
    }

    fn drop_gone_target(&mut self, target: TargetId) {
        if let Some(entry) = self.targets.get(target) {
            tracing::debug!(?target, key = %entry.key, "target geometry gone; dropping its triggers");
        }
        // Already removed targets are fine
        let _ = self.dispose_target(target);
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Move the viewport to `scroll_y`
    pub fn scroll_to<P: Presenter>(&mut self, scroll_y: f32, presenter: &mut P) {
        self.scroll_y = scroll_y;
        self.run(0.0, presenter);
    }

    /// Change the viewport size; every scroll window is re-resolved
    pub fn resize<P: Presenter>(&mut self, viewport: Size, presenter: &mut P) {
        self.tracker.set_viewport(viewport);
        self.remeasure();
        self.run(0.0, presenter);
    }

    /// Advance time-driven animations by `dt_ms`
    ///
    /// The delta is capped at [`EngineConfig::max_frame_ms`].
    pub fn tick<P: Presenter>(&mut self, dt_ms: f32, presenter: &mut P) {
        let dt_ms = dt_ms.clamp(0.0, self.config.max_frame_ms);
        self.run(dt_ms, presenter);
    }

    /// Re-measure every target after a layout change
    pub fn refresh<P: Presenter>(&mut self, presenter: &mut P) {
        self.remeasure();
        self.run(0.0, presenter);
    }

    fn remeasure(&mut self) {
        let gone: Vec<TargetId> = self
            .targets
            .iter()
            .filter(|(_, t)| t.geometry.measure().is_none())
            .map(|(id, _)| id)
            .collect();
        for target in gone {
            self.drop_gone_target(target);
        }

        let targets = &self.targets;
        let missing = self
            .tracker
            .remeasure(|id| targets.get(id).and_then(|t| t.geometry.measure()));
        for target in missing {
            self.drop_gone_target(target);
        }
    }

    fn run<P: Presenter>(&mut self, dt_ms: f32, presenter: &mut P) {
        self.absorb_pending();

        // Every target, not only those behind a subscription
        let gone: SmallVec<[TargetId; 4]> = self
            .targets
            .iter()
            .filter(|(_, target)| target.geometry.measure().is_none())
            .map(|(id, _)| id)
            .collect();
        for target in gone {
            self.drop_gone_target(target);
        }

        let viewport = Rect::viewport(self.tracker.viewport(), self.scroll_y);
        let targets = &self.targets;
        let update = self
            .observer
            .update(&viewport, |id| targets.get(id).and_then(|t| t.geometry.measure()));
        for (_, target) in update.gone {
            self.drop_gone_target(target);
        }

        let visibility: FxHashMap<SubscriptionId, bool> = update
            .intersections
            .iter()
            .map(|i| (i.subscription, i.is_intersecting))
            .collect();
        let windows: FxHashMap<WindowId, WindowUpdate> = self
            .tracker
            .scroll(self.scroll_y)
            .into_iter()
            .map(|u| (u.window, u))
            .collect();

        let mut outputs = Vec::new();
        let Registry {
            triggers,
            order,
            outbox,
            applied,
            ..
        } = self;
        for &id in order.iter() {
            let Some(entry) = triggers.get_mut(id) else {
                continue;
            };
            for crossing in entry.crossings(&visibility, &windows) {
                entry.cross(id, crossing, outbox, &mut outputs);
            }
            entry.advance(dt_ms, outbox, &mut outputs);
            entry.emit_states(id, applied, &mut outputs);
            entry.check_complete(id, &mut outputs);
        }

        self.deliver(outputs, presenter);
    }

    fn deliver<P: Presenter>(&mut self, outputs: Vec<Output>, presenter: &mut P) {
        for output in outputs {
            let trigger = output.trigger();
            if !self.triggers.contains_key(trigger) || self.pending.borrow().contains(&trigger) {
                continue;
            }

            match output {
                Output::Apply(_, target, state) => presenter.on_apply(target, &state),
                Output::Enter(_) => presenter.on_enter(trigger),
                Output::Leave(_) => presenter.on_leave(trigger),
                Output::Counter(_, value) => presenter.on_counter(trigger, &value),
                Output::CounterComplete(_) => presenter.on_counter_complete(trigger),
                Output::Fire(_) => {
                    presenter.on_fire(trigger);
                    let once = self
                        .triggers
                        .get(trigger)
                        .is_some_and(|t| t.config.fire == FirePolicy::Once);
                    if once {
                        self.remove_trigger(trigger, "fired once");
                    }
                }
            }
        }
        self.absorb_pending();
    }
}
