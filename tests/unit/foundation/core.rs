use super::*;

#[test]
fn fps_new_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::whole(30).is_ok());
}

#[test]
fn fps_frame_time_round_trip() {
    let fps = Fps::whole(30).unwrap();
    assert!((fps.frame_to_secs(FrameIndex(45)) - 1.5).abs() < 1e-9);
    assert_eq!(fps.secs_to_frames_ceil(15.0), 450);
    assert_eq!(fps.secs_to_frames_ceil(0.01), 1);
}

#[test]
fn canvas_rgba_len_is_four_bytes_per_pixel() {
    let c = Canvas {
        width: 4,
        height: 3,
    };
    assert_eq!(c.rgba_len(), 48);
}
