//! MP4 output through the system `ffmpeg` binary.
//!
//! Frames are converted to packed RGB8 and piped to ffmpeg's stdin as raw
//! video; ffmpeg encodes H.264 in a `yuv420p` MP4.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use chromafield_core::error::EngineError;
use chromafield_core::frame::{Frame, CHANNELS};
use tracing::{info, warn};

use crate::pixel::write_rgb8;
use crate::sink::{check_frame, FrameSink};

/// Output settings for an [`FfmpegSink`].
#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub width: usize,
    pub height: usize,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl VideoConfig {
    /// MP4 settings that overwrite any existing file.
    pub fn mp4(out_path: impl Into<PathBuf>, width: usize, height: usize, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    /// Rejects settings ffmpeg would refuse.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        if self.fps == 0 {
            return Err(EngineError::InvalidConfig("video fps must be non-zero".into()));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // yuv420p subsamples chroma 2x2
            return Err(EngineError::InvalidConfig(format!(
                "video width/height must be even for yuv420p output, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// True if an `ffmpeg` executable answers `-version`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> Result<(), EngineError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                EngineError::Io(format!(
                    "failed to create output directory '{}': {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}

/// Streams frames into a running ffmpeg process.
///
/// Dropping the sink without calling [`FrameSink::finish`] kills and reaps
/// the encoder; the partial output file is left on disk.
pub struct FfmpegSink {
    cfg: VideoConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
    written: u64,
}

impl FfmpegSink {
    /// Validates `cfg` and spawns ffmpeg.
    pub fn spawn(cfg: VideoConfig) -> Result<Self, EngineError> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(EngineError::Io(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(EngineError::Encode(
                "ffmpeg is required for MP4 output, but was not found on PATH".into(),
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" })
            .args([
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", cfg.width, cfg.height),
                "-r",
                &cfg.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(&cfg.out_path);

        Self::start(cfg, cmd)
    }

    /// Spawns `cmd` as the encoder with piped stdin and stderr.
    fn start(cfg: VideoConfig, mut cmd: Command) -> Result<Self, EngineError> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::Encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Encode("failed to open ffmpeg stdin".into()))?;

        info!(
            path = %cfg.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            "started ffmpeg encoder"
        );

        Ok(Self {
            scratch: vec![0u8; cfg.width * cfg.height * CHANNELS],
            cfg,
            child: Some(child),
            stdin: Some(stdin),
            written: 0,
        })
    }

    /// Closes stdin, waits for the encoder to exit, and folds its stderr
    /// into an error describing `context`.
    fn collect_failure(&mut self, context: String) -> EngineError {
        drop(self.stdin.take());
        let Some(child) = self.child.take() else {
            return EngineError::Encode(context);
        };
        match child.wait_with_output() {
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                EngineError::Encode(format!(
                    "{context}; ffmpeg exited with status {}: {}",
                    output.status,
                    stderr.trim()
                ))
            }
            Err(e) => EngineError::Encode(format!("{context}; failed to wait for ffmpeg: {e}")),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), EngineError> {
        check_frame(frame, self.cfg.width, self.cfg.height)?;
        if !write_rgb8(frame, &mut self.scratch) {
            return Err(EngineError::Encode("frame buffer size mismatch".into()));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EngineError::Encode("ffmpeg encoder is already finalized".into()))?;
        if let Err(e) = stdin.write_all(&self.scratch) {
            let context = format!("failed to write frame {} to ffmpeg: {e}", self.written);
            return Err(self.collect_failure(context));
        }
        self.written += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.written
    }

    fn finish(mut self: Box<Self>) -> Result<(), EngineError> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| EngineError::Encode("ffmpeg encoder is already finalized".into()))?;

        let output = child
            .wait_with_output()
            .map_err(|e| EngineError::Encode(format!("failed to wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        info!(path = %self.cfg.out_path.display(), frames = self.written, "video complete");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        drop(self.stdin.take());
        let _ = child.kill();
        let _ = child.wait();
        warn!(
            path = %self.cfg.out_path.display(),
            frames = self.written,
            "ffmpeg encoder dropped before finish; output is incomplete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_odd_dimensions() {
        let cfg = VideoConfig::mp4("out.mp4", 63, 48, 30);
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
        let cfg = VideoConfig::mp4("out.mp4", 64, 47, 30);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_fps_and_dimensions() {
        assert!(VideoConfig::mp4("out.mp4", 64, 48, 0).validate().is_err());
        assert!(matches!(
            VideoConfig::mp4("out.mp4", 0, 48, 30).validate(),
            Err(EngineError::InvalidDimensions)
        ));
    }

    #[test]
    fn validate_accepts_reference_settings() {
        assert!(VideoConfig::mp4("output.mp4", 1280, 720, 30).validate().is_ok());
    }

    #[test]
    fn existing_file_without_overwrite_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exists.mp4");
        std::fs::write(&path, b"x").unwrap();
        let cfg = VideoConfig {
            overwrite: false,
            ..VideoConfig::mp4(&path, 16, 16, 30)
        };
        assert!(matches!(FfmpegSink::spawn(cfg), Err(EngineError::Io(_))));
    }

    #[cfg(unix)]
    fn stand_in(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[cfg(unix)]
    #[test]
    fn encoder_exit_mid_stream_reports_its_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = VideoConfig::mp4(dir.path().join("clip.mp4"), 16, 16, 30);
        let mut sink =
            FfmpegSink::start(cfg, stand_in("echo 'encoder gave up' >&2; exit 3")).unwrap();
        let frame = Frame::new(16, 16).unwrap();

        // far more bytes than a pipe buffers, so a write must hit the closed pipe
        let err = (0..10_000)
            .find_map(|_| sink.write_frame(&frame).err())
            .expect("writing to an exited encoder fails");
        match err {
            EngineError::Encode(msg) => {
                assert!(msg.contains("encoder gave up"), "stderr missing: {msg}");
                assert!(msg.contains("status"), "exit status missing: {msg}");
            }
            other => panic!("expected Encode, got {other:?}"),
        }
        assert!(sink.child.is_none(), "encoder was not reaped");
        assert!(sink.write_frame(&frame).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn finish_reports_encoder_stderr_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = VideoConfig::mp4(dir.path().join("clip.mp4"), 16, 16, 30);
        let sink = Box::new(
            FfmpegSink::start(cfg, stand_in("cat >/dev/null; echo 'bad trailer' >&2; exit 1"))
                .unwrap(),
        );
        match sink.finish() {
            Err(EngineError::Encode(msg)) => assert!(msg.contains("bad trailer"), "{msg}"),
            other => panic!("expected Encode, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn finish_succeeds_when_encoder_drains_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = VideoConfig::mp4(dir.path().join("clip.mp4"), 16, 16, 30);
        let mut sink = Box::new(FfmpegSink::start(cfg, stand_in("cat >/dev/null")).unwrap());
        let frame = Frame::new(16, 16).unwrap();
        for _ in 0..3 {
            sink.write_frame(&frame).unwrap();
        }
        assert_eq!(sink.frames_written(), 3);
        sink.finish().unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn dropping_an_unfinished_sink_reaps_the_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = VideoConfig::mp4(dir.path().join("clip.mp4"), 16, 16, 30);
        let sink = FfmpegSink::start(cfg, stand_in("sleep 30")).unwrap();
        let pid = sink.child.as_ref().unwrap().id();

        let started = std::time::Instant::now();
        drop(sink);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        // a zombie keeps its /proc entry until reaped
        assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
    }

    #[test]
    fn encodes_a_short_clip_when_ffmpeg_is_available() {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clip.mp4");
        let mut sink = Box::new(FfmpegSink::spawn(VideoConfig::mp4(&path, 16, 16, 30)).unwrap());
        let mut frame = Frame::new(16, 16).unwrap();
        for i in 0..5 {
            frame.fill(i as f64 / 5.0);
            sink.write_frame(&frame).unwrap();
        }
        assert_eq!(sink.frames_written(), 5);
        sink.finish().unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
