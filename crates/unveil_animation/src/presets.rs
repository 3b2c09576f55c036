//! Common entrance animations

use crate::easing::{EaseMode, Easing};
use crate::timeline::{Stagger, Timeline};
use serde::{Deserialize, Serialize};
use unveil_core::{Property, PropertySet, Result};

/// Named entrance animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPreset {
    /// Fade in while rising 60px
    FadeUp,
    /// Fade in place
    FadeIn,
    /// Grow from 90% while fading in
    ScaleIn,
    /// Card flip-in: rise, tilt back and settle with overshoot
    CardEntrance,
}

impl AnimationPreset {
    /// Build the preset's timeline with the given stagger
    pub fn timeline(self, stagger: Stagger) -> Result<Timeline> {
        let (from, to, span, easing) = match self {
            AnimationPreset::FadeUp => (
                PropertySet::new()
                    .with(Property::OPACITY, 0.0)
                    .with(Property::Y, 60.0),
                PropertySet::new()
                    .with(Property::OPACITY, 1.0)
                    .with(Property::Y, 0.0),
                0.6,
                Easing::EaseOut,
            ),
            AnimationPreset::FadeIn => (
                PropertySet::new().with(Property::OPACITY, 0.0),
                PropertySet::new().with(Property::OPACITY, 1.0),
                0.5,
                Easing::power(1, EaseMode::Out),
            ),
            AnimationPreset::ScaleIn => (
                PropertySet::new()
                    .with(Property::OPACITY, 0.0)
                    .with(Property::SCALE, 0.9),
                PropertySet::new()
                    .with(Property::OPACITY, 1.0)
                    .with(Property::SCALE, 1.0),
                0.5,
                Easing::power(2, EaseMode::Out),
            ),
            AnimationPreset::CardEntrance => (
                PropertySet::new()
                    .with(Property::OPACITY, 0.0)
                    .with(Property::Y, 60.0)
                    .with(Property::ROTATE_Y, -10.0)
                    .with(Property::SCALE, 0.94),
                PropertySet::new()
                    .with(Property::OPACITY, 1.0)
                    .with(Property::Y, 0.0)
                    .with(Property::ROTATE_Y, 0.0)
                    .with(Property::SCALE, 1.0),
                1.0,
                Easing::back_out(1.6),
            ),
        };

        Timeline::builder()
            .from_to(from, to, span, easing)
            .stagger(stagger)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_start_hidden_and_end_visible() {
        for preset in [
            AnimationPreset::FadeUp,
            AnimationPreset::FadeIn,
            AnimationPreset::ScaleIn,
            AnimationPreset::CardEntrance,
        ] {
            let timeline = preset.timeline(Stagger::None).unwrap();
            assert_eq!(timeline.sample(0.0).get(&Property::OPACITY), Some(0.0));
            assert_eq!(timeline.sample(1.0).get(&Property::OPACITY), Some(1.0));
        }
    }

    #[test]
    fn test_card_entrance_overshoots() {
        let timeline = AnimationPreset::CardEntrance
            .timeline(Stagger::Each(0.2))
            .unwrap();
        // back.out pushes y past zero before settling
        let overshoot = (1..100)
            .map(|i| timeline.sample(i as f32 / 100.0).get(&Property::Y).unwrap_or(0.0))
            .fold(f32::MAX, f32::min);
        assert!(overshoot < 0.0);
        assert_eq!(timeline.final_values().get(&Property::Y), Some(0.0));
    }
}
