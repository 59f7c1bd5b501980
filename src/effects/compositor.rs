use serde::{Deserialize, Serialize};

use crate::effects::composite::over_in_place;
use crate::effects::scale::{scaled_centered, softened};
use crate::foundation::error::ReelResult;
use crate::render::layer::Layer;

/// Opacity of the glow copy beneath the primary text.
pub const GLOW_OPACITY: f32 = 0.3;
/// Extra font size of the glow copy.
pub const GLOW_SIZE_BOOST: f32 = 4.0;

const BLUR_SCALE: f32 = 0.5;
const BLUR_OPACITY: f32 = 0.7;
/// `(scale, opacity)` of the diamond copies, bottom to top.
const DIAMOND_COPIES: [(f32, f32); 3] = [(0.3, 0.4), (0.6, 0.6), (0.8, 0.8)];

/// Visual treatment of a text layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Text only.
    Fade,
    /// Softened copy beneath the text.
    Blur,
    /// Three shrunken copies beneath the text.
    DiamondBlur,
}

impl Effect {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Blur => "blur",
            Self::DiamondBlur => "diamond_blur",
        }
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a layer is visible and how it fades.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeline {
    /// Seconds before the layer starts fading in.
    pub start: f64,
    /// Fade-in length.
    pub fade_in: f64,
    /// Fade-out length, ending at `end`.
    pub fade_out: f64,
    /// End of the video.
    pub end: f64,
}

impl Timeline {
    /// Opacity at time `t`: zero before `start`, linear ramps in and out, zero from `end` on.
    pub fn opacity(&self, t: f64) -> f32 {
        if t < self.start || t >= self.end {
            return 0.0;
        }
        let fade_in = if self.fade_in > 0.0 {
            ((t - self.start) / self.fade_in).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let fade_out = if self.fade_out > 0.0 {
            ((self.end - t) / self.fade_out).clamp(0.0, 1.0)
        } else {
            1.0
        };
        fade_in.min(fade_out) as f32
    }
}

/// A precomposited text stack and the timeline it plays on.
#[derive(Clone, Debug)]
pub struct EffectLayer {
    /// Effect actually applied (after any fallback).
    pub effect: Effect,
    /// Flattened stack, composited with one group opacity per frame.
    pub composite: Layer,
    /// Visibility over time.
    pub timeline: Timeline,
}

impl EffectLayer {
    /// Draw this layer over `frame` at time `t`.
    pub fn draw_onto(&self, frame: &mut Layer, t: f64) -> ReelResult<()> {
        let opacity = self.timeline.opacity(t);
        if opacity <= 0.0 {
            return Ok(());
        }
        over_in_place(&mut frame.data, &self.composite.data, opacity)
    }
}

/// Stack `base` over its glow copy.
pub fn with_glow(base: &Layer, glow: &Layer) -> ReelResult<Layer> {
    let mut out = Layer::transparent(base.canvas());
    over_in_place(&mut out.data, &glow.data, GLOW_OPACITY)?;
    over_in_place(&mut out.data, &base.data, 1.0)?;
    Ok(out)
}

fn build_stack(base: &Layer, effect: Effect) -> ReelResult<Layer> {
    let beneath: Vec<(Layer, f32)> = match effect {
        Effect::Fade => return Ok(base.clone()),
        Effect::Blur => vec![(softened(base, BLUR_SCALE)?, BLUR_OPACITY)],
        Effect::DiamondBlur => DIAMOND_COPIES
            .iter()
            .map(|&(scale, opacity)| Ok((scaled_centered(base, scale)?, opacity)))
            .collect::<ReelResult<_>>()?,
    };

    let mut out = Layer::transparent(base.canvas());
    for (copy, opacity) in &beneath {
        over_in_place(&mut out.data, &copy.data, *opacity)?;
    }
    over_in_place(&mut out.data, &base.data, 1.0)?;
    Ok(out)
}

/// Build `effect` over `base`. A failure degrades to [`Effect::Fade`] with a warning.
pub fn apply_effect(base: Layer, effect: Effect, timeline: Timeline) -> EffectLayer {
    match build_stack(&base, effect) {
        Ok(composite) => EffectLayer {
            effect,
            composite,
            timeline,
        },
        Err(e) => {
            tracing::warn!(effect = %effect, error = %e, "effect failed, falling back to fade");
            EffectLayer {
                effect: Effect::Fade,
                composite: base,
                timeline,
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/compositor.rs"]
mod tests;
