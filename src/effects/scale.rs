use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::layer::Layer;

fn to_image(layer: &Layer) -> ReelResult<RgbaImage> {
    RgbaImage::from_raw(layer.width, layer.height, layer.data.clone())
        .ok_or_else(|| ReelError::render("layer buffer does not match its dimensions"))
}

fn scaled_dims(layer: &Layer, factor: f32) -> ReelResult<(u32, u32)> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ReelError::render(format!("invalid scale factor {factor}")));
    }
    let w = ((layer.width as f32) * factor).round().max(1.0) as u32;
    let h = ((layer.height as f32) * factor).round().max(1.0) as u32;
    Ok((w, h))
}

/// Copy of `layer` shrunk by `factor` and centered on a transparent layer of the same size.
///
/// Premultiplied data resamples correctly with a linear filter, so no unpremultiply is needed.
pub fn scaled_centered(layer: &Layer, factor: f32) -> ReelResult<Layer> {
    let (w, h) = scaled_dims(layer, factor)?;
    if w > layer.width || h > layer.height {
        return Err(ReelError::render(format!(
            "scaled copy {w}x{h} does not fit in {}x{}",
            layer.width, layer.height
        )));
    }
    let small = imageops::resize(&to_image(layer)?, w, h, FilterType::Triangle);
    let mut out = RgbaImage::new(layer.width, layer.height);
    let x = i64::from((layer.width - w) / 2);
    let y = i64::from((layer.height - h) / 2);
    imageops::replace(&mut out, &small, x, y);
    Ok(Layer {
        width: layer.width,
        height: layer.height,
        data: out.into_raw(),
    })
}

/// Blur approximation: shrink by `factor`, then scale back to full size.
pub fn softened(layer: &Layer, factor: f32) -> ReelResult<Layer> {
    let (w, h) = scaled_dims(layer, factor)?;
    let small = imageops::resize(&to_image(layer)?, w, h, FilterType::Triangle);
    let back = imageops::resize(&small, layer.width, layer.height, FilterType::Triangle);
    Ok(Layer {
        width: layer.width,
        height: layer.height,
        data: back.into_raw(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/scale.rs"]
mod tests;
