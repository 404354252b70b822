//! Compressed-audio transcoding via the ffmpeg CLI.
//!
//! The mixing chain itself is pure PCM; only the mp3 boundary shells
//! out. ffmpeg being absent is an expected condition that the mixer
//! degrades around, not an error that fails the pipeline.

use std::io::Write;
use std::process::Command;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{Result, VelaError};

/// Whether an ffmpeg binary is on the PATH. Checked once per process.
pub fn ffmpeg_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        let found = Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        debug!(found, "Probed for ffmpeg");
        found
    })
}

/// Decode arbitrary compressed audio bytes to 16-bit PCM WAV.
pub fn decode_to_wav(input: &[u8]) -> Result<Vec<u8>> {
    run_ffmpeg(input, "in.audio", "out.wav", &["-f", "wav", "-acodec", "pcm_s16le"])
}

/// Encode WAV bytes to mp3.
pub fn encode_wav_to_mp3(input: &[u8]) -> Result<Vec<u8>> {
    run_ffmpeg(input, "in.wav", "out.mp3", &["-f", "mp3", "-b:a", "128k"])
}

fn run_ffmpeg(input: &[u8], in_name: &str, out_name: &str, args: &[&str]) -> Result<Vec<u8>> {
    if !ffmpeg_available() {
        return Err(VelaError::MixingUnavailable(
            "ffmpeg not found on PATH".to_string(),
        ));
    }

    let dir = tempfile::tempdir()?;
    let in_path = dir.path().join(in_name);
    let out_path = dir.path().join(out_name);

    let mut file = std::fs::File::create(&in_path)?;
    file.write_all(input)?;
    drop(file);

    let status = Command::new("ffmpeg")
        .arg("-i")
        .arg(&in_path)
        .args(args)
        .arg("-y")
        .arg(&out_path)
        .output()
        .map_err(|e| VelaError::MixingUnavailable(format!("ffmpeg failed to start: {e}")))?;

    if !status.status.success() {
        let stderr = String::from_utf8_lossy(&status.stderr);
        return Err(VelaError::MixingUnavailable(format!(
            "ffmpeg exited with {}: {}",
            status.status,
            stderr.lines().last().unwrap_or_default()
        )));
    }

    Ok(std::fs::read(&out_path)?)
}
