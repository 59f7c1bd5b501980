use super::*;
use crate::foundation::color::Rgba8;
use crate::foundation::core::Canvas;

fn white_square(size: u32) -> Layer {
    Layer::solid(
        Canvas {
            width: size,
            height: size,
        },
        Rgba8::rgb(255, 255, 255),
    )
}

#[test]
fn scaled_copy_is_centered_with_transparent_border() {
    let out = scaled_centered(&white_square(20), 0.5).unwrap();
    assert_eq!((out.width, out.height), (20, 20));
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel(19, 19), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel(10, 10), Some([255, 255, 255, 255]));
}

#[test]
fn softened_keeps_dimensions_and_uniform_content() {
    let out = softened(&white_square(16), 0.5).unwrap();
    assert_eq!((out.width, out.height), (16, 16));
    assert_eq!(out.pixel(8, 8), Some([255, 255, 255, 255]));
}

#[test]
fn invalid_factors_are_render_errors() {
    let layer = white_square(4);
    assert!(matches!(
        scaled_centered(&layer, 0.0),
        Err(ReelError::Render(_))
    ));
    assert!(scaled_centered(&layer, 2.0).is_err());
    assert!(softened(&layer, f32::NAN).is_err());
}
