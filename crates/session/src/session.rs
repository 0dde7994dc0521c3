//! Gesture session: owns every piece of per-session recognition state and
//! advances it one frame at a time.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use gestura_actuator::{ActionDispatcher, GestureSource};
use gestura_common::clock::{RateController, SessionClock, TimestampNs};
use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::action::ActionCommand;
use gestura_hand_model::frame::FrameSnapshot;
use gestura_hand_model::gesture::{Classification, GestureCandidate};
use gestura_platform_core::{FeedbackChannel, FeedbackCue, HandTracker, SequenceClassifier, SilentFeedback};
use gestura_recognition_core::arbiter::ArbiterOutput;
use gestura_recognition_core::stabilizer::StabilizerUpdate;
use gestura_recognition_core::{
    ClassificationDebouncer, ControlMode, GestureCounters, GestureDetector, GestureStabilizer,
    ModeArbiter,
};

use crate::config::SessionConfig;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
}

/// Everything one frame produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub timestamp_ns: TimestampNs,
    pub arbiter: ArbiterOutput,

    /// Present in gesture mode only.
    pub candidate: Option<GestureCandidate>,
    pub stabilizer: Option<StabilizerUpdate>,
    pub classification: Option<Classification>,

    /// Commands handed to the injector this frame, in order.
    pub dispatched: Vec<ActionCommand>,
}

impl TickReport {
    pub fn mode(&self) -> ControlMode {
        self.arbiter.mode
    }
}

/// End-of-session summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub started_at: String,
    pub finished_at: String,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub frames_throttled: u64,
    pub mode_toggles: u64,

    /// Stabilizer commits per gesture.
    pub committed: GestureCounters,

    /// Classifier dispatches per label.
    pub classified: GestureCounters,

    pub commands: u64,
    pub injection_failures: u64,
    pub unmapped_gestures: u64,
}

impl SessionReport {
    /// Lifetime trigger count per gesture, both sources combined.
    pub fn gesture_counts(&self) -> GestureCounters {
        let mut all = self.committed.clone();
        all.merge(&self.classified);
        all
    }

    /// Human-readable report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Frames: {} processed, {} skipped, {} throttled\n",
            self.frames_processed, self.frames_skipped, self.frames_throttled
        ));
        out.push_str(&format!("Mode toggles: {}\n", self.mode_toggles));
        out.push_str(&format!(
            "Commands: {} ({} failed, {} unmapped gestures)\n",
            self.commands, self.injection_failures, self.unmapped_gestures
        ));
        let counts = self.gesture_counts();
        if counts.is_empty() {
            out.push_str("Gestures: none\n");
        } else {
            out.push_str("Gestures:\n");
            for (label, count) in counts.iter() {
                out.push_str(&format!("  {:<18} {count}\n", label.as_str()));
            }
        }
        out
    }

    pub fn write_json(&self, path: &Path) -> GestureResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Drives detectors, stabilizer, arbiter and debouncer over a frame stream.
pub struct GestureSession {
    config: SessionConfig,
    state: SessionState,
    clock: SessionClock,
    detector: GestureDetector,
    stabilizer: GestureStabilizer,
    arbiter: ModeArbiter,
    debouncer: Option<(ClassificationDebouncer, Box<dyn SequenceClassifier + Send>)>,
    dispatcher: ActionDispatcher,
    feedback: Box<dyn FeedbackChannel>,
    stop_flag: Arc<AtomicBool>,
    frames_processed: u64,
    frames_skipped: u64,
    frames_throttled: u64,
    mode_toggles: u64,
}

impl GestureSession {
    pub fn new(config: SessionConfig, dispatcher: ActionDispatcher) -> Self {
        Self {
            detector: GestureDetector::new(config.detector.clone()),
            stabilizer: GestureStabilizer::new(config.stabilizer.clone()),
            arbiter: ModeArbiter::new(config.arbiter.clone()),
            config,
            state: SessionState::Idle,
            clock: SessionClock::start(),
            debouncer: None,
            dispatcher,
            feedback: Box::new(SilentFeedback),
            stop_flag: Arc::new(AtomicBool::new(false)),
            frames_processed: 0,
            frames_skipped: 0,
            frames_throttled: 0,
            mode_toggles: 0,
        }
    }

    /// Attach a sequence classifier. Its window must match the debouncer's.
    pub fn with_classifier(
        mut self,
        classifier: Box<dyn SequenceClassifier + Send>,
    ) -> GestureResult<Self> {
        if classifier.window_len() != self.config.debouncer.window_len {
            return Err(GestureError::config(format!(
                "classifier window is {} frames but the debouncer window is {}",
                classifier.window_len(),
                self.config.debouncer.window_len
            )));
        }
        let debouncer = ClassificationDebouncer::new(self.config.debouncer.clone());
        self.debouncer = Some((debouncer, classifier));
        Ok(self)
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackChannel>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> ControlMode {
        self.arbiter.mode()
    }

    pub fn stabilizer(&self) -> &GestureStabilizer {
        &self.stabilizer
    }

    pub fn arbiter(&self) -> &ModeArbiter {
        &self.arbiter
    }

    /// Set the stop flag. The run loop exits before the next frame.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Advance every component by one frame.
    pub fn tick(&mut self, frame: &FrameSnapshot) -> GestureResult<TickReport> {
        let now = frame.timestamp_ns;
        self.frames_processed += 1;

        let arbiter = self.arbiter.update(frame);
        let mut dispatched = Vec::new();

        if let Some(mode) = arbiter.mode_changed {
            self.mode_toggles += 1;
            self.stabilizer.reset();
            if let Some((debouncer, _)) = self.debouncer.as_mut() {
                debouncer.reset();
            }
            self.cue(match mode {
                ControlMode::Direct => FeedbackCue::ModeEnabled,
                ControlMode::Gesture => FeedbackCue::ModeDisabled,
            });
        }

        for command in &arbiter.commands {
            self.dispatcher.execute(command, now);
            if *command == ActionCommand::Click {
                self.cue(FeedbackCue::Click);
            }
            dispatched.push(command.clone());
        }

        let mut report = TickReport {
            timestamp_ns: now,
            arbiter,
            candidate: None,
            stabilizer: None,
            classification: None,
            dispatched: Vec::new(),
        };

        if report.arbiter.mode == ControlMode::Gesture {
            let candidate = self.detector.classify(frame);
            let update = self.stabilizer.update(candidate);
            if let Some(committed) = update.committed {
                if let Some(label) = committed.label() {
                    if let Some(cmd) =
                        self.dispatcher
                            .dispatch_gesture(label.as_str(), GestureSource::Stabilizer, now)
                    {
                        dispatched.push(cmd);
                    }
                }
                self.cue(FeedbackCue::GestureCommitted);
            }
            report.candidate = Some(candidate);
            report.stabilizer = Some(update);

            if let Some((debouncer, classifier)) = self.debouncer.as_mut() {
                let outcome = debouncer.observe(frame, classifier.as_ref())?;
                if let Some(label) = outcome.dispatched {
                    if let Some(cmd) =
                        self.dispatcher
                            .dispatch_gesture(label.as_str(), GestureSource::Classifier, now)
                    {
                        dispatched.push(cmd);
                    }
                }
                report.classification = outcome.prediction;
            }
        }

        report.dispatched = dispatched;
        Ok(report)
    }

    /// Pull frames from `tracker` until it ends or the stop flag is set.
    ///
    /// Frames arriving faster than the configured fps are thinned. With
    /// `realtime`, each frame waits until its timestamp relative to the
    /// start of the run.
    pub async fn run(
        &mut self,
        tracker: &mut dyn HandTracker,
        realtime: bool,
    ) -> GestureResult<SessionReport> {
        if self.state == SessionState::Running {
            return Err(GestureError::session("Session already running"));
        }
        self.state = SessionState::Running;
        tracing::info!(tracker = tracker.name(), fps = self.config.fps, realtime, "Gesture session started");

        let started = tokio::time::Instant::now();
        let mut rate = RateController::new(self.config.fps);
        let mut first_ts: Option<TimestampNs> = None;

        while !self.stop_flag.load(Ordering::Relaxed) {
            let frame = match tracker.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("Tracker stream ended");
                    break;
                }
                Err(e) if e.is_frame_local() => {
                    tracing::warn!(error = %e, "Skipping malformed frame");
                    self.frames_skipped += 1;
                    continue;
                }
                Err(e) => {
                    self.state = SessionState::Stopped;
                    return Err(e);
                }
            };

            if !rate.should_tick(frame.timestamp_ns) {
                self.frames_throttled += 1;
                continue;
            }

            if realtime {
                let base = *first_ts.get_or_insert(frame.timestamp_ns);
                let offset = frame.timestamp_ns.saturating_sub(base);
                tokio::time::sleep_until(started + std::time::Duration::from_nanos(offset)).await;
            } else {
                tokio::task::yield_now().await;
            }

            if let Err(e) = self.tick(&frame) {
                self.state = SessionState::Stopped;
                return Err(e);
            }
        }

        if let Err(e) = self.dispatcher.flush() {
            tracing::warn!(error = %e, "Failed to flush action journal");
        }
        self.state = SessionState::Stopped;

        let report = self.report();
        tracing::info!(
            frames = report.frames_processed,
            skipped = report.frames_skipped,
            gestures = report.gesture_counts().total(),
            elapsed_secs = self.clock.elapsed_secs(),
            "Gesture session stopped"
        );
        Ok(report)
    }

    /// Snapshot of the session counters.
    pub fn report(&self) -> SessionReport {
        let stats = self.dispatcher.stats();
        SessionReport {
            started_at: self.clock.epoch_wall().to_string(),
            finished_at: chrono::Utc::now().to_rfc3339(),
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            frames_throttled: self.frames_throttled,
            mode_toggles: self.mode_toggles,
            committed: self.stabilizer.counters().clone(),
            classified: self
                .debouncer
                .as_ref()
                .map(|(d, _)| d.counters().clone())
                .unwrap_or_default(),
            commands: stats.commands,
            injection_failures: stats.failures,
            unmapped_gestures: stats.unmapped,
        }
    }

    /// Feedback never affects recognition state.
    fn cue(&mut self, cue: FeedbackCue) {
        if let Err(e) = self.feedback.play(cue) {
            tracing::debug!(error = %e, ?cue, "Feedback cue failed");
        }
    }
}
