use std::path::Path;
use std::process::Command;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{ReelError, ReelResult};

/// Sample rate of the muxed soundtrack.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Channel count of the muxed soundtrack.
pub const MIX_CHANNELS: u16 = 2;

/// Decode any audio file `ffmpeg` understands to interleaved stereo `f32` at `sample_rate`.
pub fn decode_stereo_f32(path: &Path, sample_rate: u32) -> ReelResult<Vec<f32>> {
    if !path.is_file() {
        return Err(ReelError::render(format!(
            "music file '{}' does not exist",
            path.display()
        )));
    }
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-vn", "-f", "f32le", "-acodec", "pcm_f32le"])
        .args(["-ac", &MIX_CHANNELS.to_string()])
        .args(["-ar", &sample_rate.to_string()])
        .arg("pipe:1")
        .output()
        .map_err(|e| ReelError::render(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::render(format!(
            "audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    pcm_from_le_bytes(&out.stdout)
}

fn pcm_from_le_bytes(bytes: &[u8]) -> ReelResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(ReelError::render(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Truncate, or pad with silence, to exactly `duration_secs`.
pub fn fit_to_duration(pcm: &mut Vec<f32>, duration_secs: f64, sample_rate: u32, channels: u16) {
    let frames = (duration_secs * f64::from(sample_rate)).round().max(0.0) as usize;
    pcm.resize(frames * usize::from(channels), 0.0);
}

/// Linear fade to silence over the last `fade_secs`.
pub fn apply_fade_out(pcm: &mut [f32], fade_secs: f64, sample_rate: u32, channels: u16) {
    let channels = usize::from(channels.max(1));
    let total_frames = pcm.len() / channels;
    let fade_frames = ((fade_secs * f64::from(sample_rate)).round().max(0.0) as usize).min(total_frames);
    if fade_frames == 0 {
        return;
    }
    let first = total_frames - fade_frames;
    for (i, frame) in pcm.chunks_exact_mut(channels).enumerate().skip(first) {
        let gain = (total_frames - 1 - i) as f32 / fade_frames as f32;
        for s in frame {
            *s *= gain;
        }
    }
}

/// Write interleaved samples as raw little-endian `f32`.
pub fn write_f32le(samples: &[f32], out_path: &Path) -> ReelResult<()> {
    ensure_parent_dir(out_path)?;
    let mut bytes = Vec::<u8>::with_capacity(samples.len() * 4);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        ReelError::render(format!(
            "failed to write soundtrack '{}': {e}",
            out_path.display()
        ))
    })
}

/// Decode `music`, fit it to the video, fade its tail and write it for the encoder.
pub fn prepare_soundtrack(
    music: &Path,
    duration_secs: f64,
    fade_out_secs: f64,
    pcm_path: &Path,
) -> ReelResult<AudioInputConfig> {
    let mut pcm = decode_stereo_f32(music, MIX_SAMPLE_RATE)?;
    let decoded_secs = pcm.len() as f64 / f64::from(MIX_SAMPLE_RATE) / f64::from(MIX_CHANNELS);
    if decoded_secs < duration_secs {
        tracing::info!(
            decoded_secs,
            duration_secs,
            "music shorter than the video, padding with silence"
        );
    }
    fit_to_duration(&mut pcm, duration_secs, MIX_SAMPLE_RATE, MIX_CHANNELS);
    apply_fade_out(&mut pcm, fade_out_secs, MIX_SAMPLE_RATE, MIX_CHANNELS);
    write_f32le(&pcm, pcm_path)?;
    Ok(AudioInputConfig {
        path: pcm_path.to_path_buf(),
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
