//! Scene files
//!
//! A scene describes a page to simulate: the viewport, the rects of every
//! animated element, named timelines and the triggers that bind them.
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[targets]]
//! key = "#stats"
//! y = 1600
//! height = 400
//!
//! [timelines.rise]
//! preset = "fade_up"
//!
//! [[triggers]]
//! targets = ["#stats"]
//! timeline = "rise"
//! amount = 0.3
//! fire = "once"
//! ```

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use slotmap::SecondaryMap;
use std::fs;
use std::path::Path;
use unveil_animation::{AnimationPreset, CounterSpec, Stagger, Timeline, TimelineDef};
use unveil_core::{Rect, Size, StaticGeometry, TargetId};
use unveil_trigger::{
    CounterBinding, EngineConfig, FirePolicy, Registry, TriggerConfig, TriggerId, TriggerSpec,
};

#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub viewport: ViewportDef,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub targets: Vec<TargetDef>,
    #[serde(default)]
    pub timelines: IndexMap<String, TimelineEntry>,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ViewportDef {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportDef {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Element rect in document coordinates
#[derive(Debug, Deserialize)]
pub struct TargetDef {
    pub key: String,
    #[serde(default)]
    pub x: f32,
    pub y: f32,
    /// Defaults to the viewport width
    #[serde(default)]
    pub width: Option<f32>,
    pub height: f32,
}

/// Either a named preset or a custom step list
#[derive(Debug, Deserialize)]
pub struct TimelineEntry {
    #[serde(default)]
    pub preset: Option<AnimationPreset>,
    #[serde(flatten)]
    pub def: TimelineDef,
}

impl TimelineEntry {
    fn build(&self) -> Result<Timeline> {
        let Some(preset) = self.preset else {
            return Ok(self.def.build()?);
        };
        if !self.def.steps.is_empty() {
            bail!("a preset timeline cannot also list steps");
        }
        let stagger = match (self.def.stagger, self.def.stagger_each) {
            (Some(_), Some(_)) => bail!("set either stagger or stagger_each, not both"),
            (Some(progress), None) => Stagger::Progress(progress),
            (None, Some(each)) => Stagger::Each(each),
            (None, None) => Stagger::None,
        };
        Ok(preset.timeline(stagger)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct TriggerDef {
    /// Label used in reports
    #[serde(default)]
    pub name: Option<String>,
    pub targets: Vec<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub counter: Option<CounterSpec>,
    /// Defaults to `once`
    #[serde(default)]
    pub counter_fire: Option<FirePolicy>,
    #[serde(flatten)]
    pub config: TriggerConfig,
}

/// What a report needs to know about a created trigger
#[derive(Clone, Debug)]
pub struct TriggerInfo {
    pub label: String,
    pub config: TriggerConfig,
    /// Timeline span in seconds, for time-driven playback
    pub span: Option<f32>,
    pub members: usize,
}

/// A scene loaded into a live registry
pub struct Stage {
    pub registry: Registry,
    pub targets: SecondaryMap<TargetId, String>,
    pub triggers: SecondaryMap<TriggerId, TriggerInfo>,
    /// Triggers in declaration order
    pub order: Vec<TriggerId>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn viewport(&self) -> Size {
        Size::new(self.viewport.width, self.viewport.height)
    }

    /// Largest scroll position that still shows content
    pub fn scroll_extent(&self) -> f32 {
        let bottom = self
            .targets
            .iter()
            .map(|t| t.y + t.height)
            .fold(0.0_f32, f32::max);
        (bottom - self.viewport.height).max(0.0)
    }

    /// Register every target and create every trigger
    pub fn build(&self) -> Result<Stage> {
        let viewport = self.viewport();
        let mut registry = Registry::with_config(viewport, self.engine.clone());

        let mut keys: IndexMap<&str, TargetId> = IndexMap::new();
        let mut targets = SecondaryMap::new();
        for def in &self.targets {
            let rect = Rect::new(def.x, def.y, def.width.unwrap_or(viewport.width), def.height);
            let id = registry
                .register_target(def.key.as_str(), StaticGeometry::new(rect))
                .with_context(|| format!("target '{}'", def.key))?;
            keys.insert(def.key.as_str(), id);
            targets.insert(id, def.key.clone());
        }

        let mut timelines: IndexMap<&str, Timeline> = IndexMap::new();
        for (name, entry) in &self.timelines {
            let timeline = entry
                .build()
                .with_context(|| format!("timeline '{name}'"))?;
            timelines.insert(name.as_str(), timeline);
        }

        let mut triggers = SecondaryMap::new();
        let mut order = Vec::new();
        for (index, def) in self.triggers.iter().enumerate() {
            let label = def.name.clone().unwrap_or_else(|| match def.targets.first() {
                Some(first) => format!("trigger {index} ({first})"),
                None => format!("trigger {index}"),
            });

            let mut members = Vec::with_capacity(def.targets.len());
            for key in &def.targets {
                let Some(&id) = keys.get(key.as_str()) else {
                    bail!("{label}: unknown target '{key}'");
                };
                members.push(id);
            }

            let mut spec = TriggerSpec::new(def.config, members);
            if let Some(name) = &def.timeline {
                let Some(timeline) = timelines.get(name.as_str()) else {
                    bail!("{label}: unknown timeline '{name}'");
                };
                spec = spec.timeline(timeline.clone());
            }
            if let Some(counter) = &def.counter {
                let mut binding = CounterBinding::new(counter.clone());
                binding.fire = def.counter_fire.unwrap_or(FirePolicy::Once);
                spec = spec.counter(binding);
            }

            let span = spec.timeline.as_ref().map(|t| t.group_span(spec.targets.len()));
            let members = spec.targets.len();
            let id = registry.create_trigger(spec).with_context(|| label.clone())?;
            triggers.insert(
                id,
                TriggerInfo {
                    label,
                    config: def.config,
                    span,
                    members,
                },
            );
            order.push(id);
        }

        Ok(Stage {
            registry,
            targets,
            triggers,
            order,
        })
    }
}
