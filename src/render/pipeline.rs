use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::audio::track::prepare_soundtrack;
use crate::config::{TextConfig, VideoConfig};
use crate::effects::compositor::{
    Effect, EffectLayer, GLOW_SIZE_BOOST, Timeline, apply_effect, with_glow,
};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::layer::Layer;
use crate::text::engine::{BlockStyle, TextEngine};
use crate::text::layout::{BlockMetrics, Placement};

/// Everything needed to render one video.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderJob {
    /// Quote body, without surrounding quotes.
    pub quote_text: String,
    /// Author name, without the leading dash.
    pub author_text: String,
    /// Local audio file.
    pub music_path: PathBuf,
    /// Effect applied to both text blocks.
    pub effect: Effect,
    /// Video length.
    pub duration_secs: f64,
    /// Output size.
    pub canvas: Canvas,
}

/// Turns a [`RenderJob`] into an MP4 on disk.
pub trait Renderer {
    /// Render and return the artifact path.
    fn render(&mut self, job: &RenderJob) -> ReelResult<PathBuf>;
}

/// `<prefix>_<YYYYmmdd_HHMMSS>.mp4` inside `dir`.
pub fn output_path(dir: &Path, prefix: &str, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("{prefix}_{}.mp4", at.format("%Y%m%d_%H%M%S")))
}

/// Build the quote and author layers with their timelines.
pub fn compose_text_layers(
    engine: &mut TextEngine,
    job: &RenderJob,
    text: &TextConfig,
) -> ReelResult<[EffectLayer; 2]> {
    let canvas = job.canvas;
    let w = canvas.width as f32;
    let h = canvas.height as f32;

    let quote_style = BlockStyle {
        metrics: BlockMetrics {
            font_size: text.quote_font_size,
            line_spacing: text.line_spacing,
            margin: text.margin,
        },
        color: text.quote_color,
        max_width: w - text.quote_wrap_inset,
        placement: Placement::Centered,
    };
    let author_style = BlockStyle {
        metrics: BlockMetrics {
            font_size: text.author_font_size,
            ..quote_style.metrics
        },
        color: text.author_color,
        max_width: w - text.author_wrap_inset,
        placement: Placement::Top(h * text.author_top_ratio),
    };

    let quote = text_block(engine, &format!("\"{}\"", job.quote_text), &quote_style, canvas, text.glow)?;
    let author = text_block(engine, &format!("- {}", job.author_text), &author_style, canvas, text.glow)?;

    let timeline = |start: f64| Timeline {
        start,
        fade_in: text.fade_in_secs,
        fade_out: text.fade_out_secs,
        end: job.duration_secs,
    };
    Ok([
        apply_effect(quote, job.effect, timeline(0.0)),
        apply_effect(author, job.effect, timeline(text.stagger_secs)),
    ])
}

fn text_block(
    engine: &mut TextEngine,
    text: &str,
    style: &BlockStyle,
    canvas: Canvas,
    glow: bool,
) -> ReelResult<Layer> {
    let base = engine.render_block(text, style, canvas)?;
    if !glow {
        return Ok(base);
    }
    let mut glow_style = *style;
    glow_style.metrics.font_size += GLOW_SIZE_BOOST;
    let glow_layer = engine.render_block(text, &glow_style, canvas)?;
    with_glow(&base, &glow_layer)
}

/// Stream `duration_secs` of frames into `sink`: background, then each layer in order.
pub fn render_frames(
    background: &Layer,
    layers: &[EffectLayer],
    fps: Fps,
    duration_secs: f64,
    audio: Option<AudioInputConfig>,
    sink: &mut dyn FrameSink,
) -> ReelResult<u64> {
    let frames = fps.secs_to_frames_ceil(duration_secs);
    sink.begin(SinkConfig {
        width: background.width,
        height: background.height,
        fps,
        audio,
    })?;

    let mut frame = background.clone();
    for i in 0..frames {
        let idx = FrameIndex(i);
        let t = fps.frame_to_secs(idx);
        frame.data.copy_from_slice(&background.data);
        for layer in layers {
            layer.draw_onto(&mut frame, t)?;
        }
        sink.push_frame(idx, &frame)?;
    }

    sink.end()?;
    Ok(frames)
}

/// Production renderer: Parley text, effect stacks, `ffmpeg` encode.
#[derive(Debug)]
pub struct VideoRenderer {
    video: VideoConfig,
    text: TextConfig,
    engine: Option<TextEngine>,
}

impl VideoRenderer {
    /// Renderer for the given settings. Fonts resolve on first use.
    pub fn new(video: VideoConfig, text: TextConfig) -> Self {
        Self {
            video,
            text,
            engine: None,
        }
    }

    fn engine(&mut self) -> ReelResult<&mut TextEngine> {
        if self.engine.is_none() {
            self.engine = Some(TextEngine::new(&self.text.font_candidates)?);
        }
        self.engine
            .as_mut()
            .ok_or_else(|| ReelError::render("text engine unavailable"))
    }
}

impl Renderer for VideoRenderer {
    #[tracing::instrument(skip_all, fields(effect = %job.effect))]
    fn render(&mut self, job: &RenderJob) -> ReelResult<PathBuf> {
        let fps = self.video.frame_rate()?;
        let text = self.text.clone();
        let layers = compose_text_layers(self.engine()?, job, &text)?;
        let background = Layer::solid(job.canvas, self.video.background);

        let out_path = output_path(&self.video.output_dir, &self.video.output_prefix, Local::now());
        let pcm_path = out_path.with_extension("f32le");
        let audio = prepare_soundtrack(
            &job.music_path,
            job.duration_secs,
            self.video.audio_fade_out_secs,
            &pcm_path,
        )?;

        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: out_path.clone(),
            overwrite: true,
            bg_rgba: self.video.background.to_array(),
        });
        let result = render_frames(&background, &layers, fps, job.duration_secs, Some(audio), &mut sink);

        if let Err(e) = std::fs::remove_file(&pcm_path) {
            tracing::warn!(path = %pcm_path.display(), error = %e, "failed to remove soundtrack scratch file");
        }
        let frames = result?;
        tracing::info!(path = %out_path.display(), frames, "rendered video");
        Ok(out_path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
