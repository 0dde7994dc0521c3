//! Session configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use gestura_actuator::ActionMap;
use gestura_common::config::AppConfig;
use gestura_common::error::{GestureError, GestureResult};
use gestura_platform_core::ScreenSize;
use gestura_recognition_core::{ArbiterConfig, DebouncerConfig, DetectorConfig, StabilizerConfig};

/// Every tunable of one gesture session.
///
/// The sequence normalization policy is not part of a session: it lives in
/// the template model, which applies it to templates and live windows alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SessionFile")]
pub struct SessionConfig {
    /// Pipeline frame rate. Faster sources are thinned to this rate.
    pub fps: u32,

    pub detector: DetectorConfig,

    pub stabilizer: StabilizerConfig,

    pub arbiter: ArbiterConfig,

    pub debouncer: DebouncerConfig,

    /// Gesture label → injected action.
    pub actions: ActionMap,
}

/// Session file as written by hand. Stabilizer counts left out of the file
/// are derived from the file's `fps`, not from the default rate.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SessionFile {
    fps: u32,
    detector: DetectorConfig,
    stabilizer: StabilizerOverrides,
    arbiter: ArbiterConfig,
    debouncer: DebouncerConfig,
    actions: ActionMap,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StabilizerOverrides {
    fps: Option<u32>,
    stable_frames: Option<u32>,
    countdown_frames: Option<u32>,
    display_frames: Option<u32>,
}

impl Default for SessionFile {
    fn default() -> Self {
        let base = SessionConfig::default();
        Self {
            fps: base.fps,
            detector: base.detector,
            stabilizer: StabilizerOverrides::default(),
            arbiter: base.arbiter,
            debouncer: base.debouncer,
            actions: base.actions,
        }
    }
}

impl From<SessionFile> for SessionConfig {
    fn from(file: SessionFile) -> Self {
        let derived = StabilizerConfig::for_fps(file.fps);
        let o = file.stabilizer;
        Self {
            fps: file.fps,
            detector: file.detector,
            stabilizer: StabilizerConfig {
                fps: o.fps.unwrap_or(derived.fps),
                stable_frames: o.stable_frames.unwrap_or(derived.stable_frames),
                countdown_frames: o.countdown_frames.unwrap_or(derived.countdown_frames),
                display_frames: o.display_frames.unwrap_or(derived.display_frames),
            },
            arbiter: file.arbiter,
            debouncer: file.debouncer,
            actions: file.actions,
        }
    }
}

impl SessionConfig {
    /// Defaults with frame-count thresholds derived from `fps`.
    pub fn for_pipeline(fps: u32, screen: ScreenSize) -> Self {
        let fps = fps.max(1);
        Self {
            fps,
            detector: DetectorConfig::default(),
            stabilizer: StabilizerConfig::for_fps(fps),
            arbiter: ArbiterConfig {
                screen,
                ..ArbiterConfig::default()
            },
            debouncer: DebouncerConfig::default(),
            actions: ActionMap::default(),
        }
    }

    /// Derive from the application's pipeline defaults.
    pub fn from_app(app: &AppConfig) -> Self {
        Self::for_pipeline(
            app.pipeline.fps,
            ScreenSize::new(app.pipeline.screen_width, app.pipeline.screen_height),
        )
    }

    /// Load a session file. Missing fields take their defaults.
    pub fn load(path: &Path) -> GestureResult<Self> {
        if !path.exists() {
            return Err(GestureError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| GestureError::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> GestureResult<()> {
        if self.fps == 0 || self.stabilizer.fps == 0 {
            return Err(GestureError::config("fps must be positive"));
        }
        if self.stabilizer.fps != self.fps {
            return Err(GestureError::config(format!(
                "stabilizer counts frames at {} fps but the session runs at {} fps",
                self.stabilizer.fps, self.fps
            )));
        }
        if self.stabilizer.stable_frames == 0 || self.stabilizer.countdown_frames == 0 {
            return Err(GestureError::config(
                "stable_frames and countdown_frames must be positive",
            ));
        }
        if self.debouncer.window_len < 2 {
            return Err(GestureError::config("debouncer window must hold at least 2 frames"));
        }
        if !(0.0..=1.0).contains(&self.arbiter_alpha()) {
            return Err(GestureError::config("smoothing alpha must be within [0, 1]"));
        }
        for label in self.actions.unknown_labels() {
            tracing::warn!(gesture = label, "Action table entry names no known gesture");
        }
        Ok(())
    }

    fn arbiter_alpha(&self) -> f64 {
        match self.arbiter.smoothing {
            gestura_recognition_core::cursor_smooth::SmoothingAlgorithm::Ema { alpha } => alpha,
            _ => 0.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_pipeline(20, ScreenSize::default())
    }
}
