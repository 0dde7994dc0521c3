//! Gestura Recognition Core
//!
//! Turns noisy per-frame hand landmarks into a small number of stable,
//! de-duplicated, rate-limited gesture activations:
//! - **Poses:** per-hand geometric predicates (fist, flat, pointing, stop, ok)
//! - **Detectors:** two-hand frame patterns (zoom in, zoom out, stop)
//! - **Stabilizer:** run-length + countdown commit state machine
//! - **Arbiter:** held-pose mode toggle and direct cursor/click control
//! - **Debouncer:** sliding window, sequence classifier, stability + cooldown gate
//! - **Normalizer:** fixed-length resampling and standardization
//!
//! This crate is pure computation: frames in, decisions out. Time is read
//! from frame timestamps, never from a wall clock.

pub mod arbiter;
pub mod classifier;
pub mod counters;
pub mod cursor_smooth;
pub mod debouncer;
pub mod detectors;
pub mod normalizer;
pub mod pose;
pub mod stabilizer;
pub mod window;

pub use arbiter::{ArbiterConfig, ControlMode, ModeArbiter};
pub use classifier::TemplateClassifier;
pub use counters::GestureCounters;
pub use cursor_smooth::CursorSmoother;
pub use debouncer::{ClassificationDebouncer, DebouncerConfig};
pub use detectors::{DetectorConfig, GestureDetector};
pub use normalizer::{NormalizationPolicy, NormalizerConfig, SequenceNormalizer};
pub use stabilizer::{GestureStabilizer, StabilizerConfig};
pub use window::SequenceWindow;
