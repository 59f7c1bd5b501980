use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::color::Rgba8;
use chrono::TimeZone as _;

const CANVAS: Canvas = Canvas {
    width: 8,
    height: 8,
};

fn white_square() -> Layer {
    let mut layer = Layer::transparent(CANVAS);
    for y in 2..6 {
        for x in 2..6 {
            let i = ((y * CANVAS.width + x) * 4) as usize;
            layer.data[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    }
    layer
}

#[test]
fn output_path_uses_prefix_and_timestamp() {
    let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
    let path = output_path(Path::new("videos"), "quote_video", at);
    assert_eq!(path, Path::new("videos").join("quote_video_20240309_070501.mp4"));
}

#[test]
fn frames_cover_whole_duration() {
    let bg = Layer::solid(CANVAS, Rgba8::rgb(0, 0, 0));
    let mut sink = InMemorySink::new();
    let fps = Fps::whole(10).unwrap();
    let n = render_frames(&bg, &[], fps, 1.05, None, &mut sink).unwrap();
    assert_eq!(n, 11);
    assert_eq!(sink.frames().len(), 11);
    assert!(sink.is_finished());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (8, 8));
    assert!(cfg.audio.is_none());
}

#[test]
fn text_fades_in_and_out_over_background() {
    let bg = Layer::solid(CANVAS, Rgba8::rgb(0, 0, 0));
    let layer = apply_effect(
        white_square(),
        Effect::Fade,
        Timeline {
            start: 0.0,
            fade_in: 1.0,
            fade_out: 1.0,
            end: 4.0,
        },
    );
    let mut sink = InMemorySink::new();
    let fps = Fps::whole(2).unwrap();
    render_frames(&bg, &[layer], fps, 4.0, None, &mut sink).unwrap();

    let centre = |i: usize| sink.frames()[i].1.pixel(3, 3).unwrap()[0];
    // t = 0.0, 0.5, 1.0, ..., 3.5
    assert_eq!(centre(0), 0);
    assert!(centre(1) > 100 && centre(1) < 160);
    assert_eq!(centre(2), 255);
    assert_eq!(centre(5), 255);
    assert!(centre(7) > 100 && centre(7) < 160);
    // Outside the text the background is untouched.
    assert_eq!(sink.frames()[4].1.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
}

#[test]
fn staggered_layer_stays_hidden_until_start() {
    let bg = Layer::transparent(CANVAS);
    let late = apply_effect(
        white_square(),
        Effect::Fade,
        Timeline {
            start: 1.5,
            fade_in: 1.0,
            fade_out: 1.0,
            end: 5.0,
        },
    );
    let mut sink = InMemorySink::new();
    render_frames(&bg, &[late], Fps::whole(2).unwrap(), 5.0, None, &mut sink).unwrap();
    assert!(sink.frames()[0].1.is_blank());
    assert!(sink.frames()[3].1.is_blank());
    assert!(!sink.frames()[4].1.is_blank());
}

#[test]
fn renderer_trait_is_object_safe() {
    struct Fixed(PathBuf);
    impl Renderer for Fixed {
        fn render(&mut self, _job: &RenderJob) -> ReelResult<PathBuf> {
            Ok(self.0.clone())
        }
    }
    let mut r: Box<dyn Renderer> = Box::new(Fixed(PathBuf::from("a.mp4")));
    let job = RenderJob {
        quote_text: "q".into(),
        author_text: "a".into(),
        music_path: PathBuf::from("m.mp3"),
        effect: Effect::Blur,
        duration_secs: 1.0,
        canvas: CANVAS,
    };
    assert_eq!(r.render(&job).unwrap(), PathBuf::from("a.mp4"));
}
