//! Run a gesture session over a recording.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Context;

use gestura_actuator::{ActionDispatcher, JournalHeader, JournalWriter, LogInjector};
use gestura_common::clock::SessionClock;
use gestura_common::config::AppConfig;
use gestura_recognition_core::TemplateClassifier;
use gestura_session::{GestureSession, LogFeedback, ReplayTracker, SessionConfig, TerminalBell};

pub struct RunOptions {
    pub recording: PathBuf,
    pub session: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub journal: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub realtime: bool,
    pub bell: bool,
}

pub async fn run(app: &AppConfig, mut opts: RunOptions) -> anyhow::Result<()> {
    opts.recording = super::resolve_recording(app, &opts.recording);
    let config = match &opts.session {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load session config {}", path.display()))?,
        None => SessionConfig::from_app(app),
    };

    let mut tracker = ReplayTracker::open(&opts.recording)
        .with_context(|| format!("Failed to open recording {}", opts.recording.display()))?;
    if let Some(header) = tracker.header() {
        if header.fps < config.fps {
            tracing::warn!(
                recording_fps = header.fps,
                pipeline_fps = config.fps,
                "Recording is slower than the pipeline; frame-count thresholds will stretch"
            );
        }
    }

    println!("Gesture session: {}", opts.recording.display());
    println!("  Frames: {}", tracker.remaining());
    println!("  Pipeline FPS: {}", config.fps);
    println!("  Activation hold: {:.1}s", config.arbiter.activation_secs);
    println!("  Actions mapped: {}", config.actions.len());

    let mut dispatcher = ActionDispatcher::new(Box::new(LogInjector::new()), config.actions.clone());
    if let Some(path) = &opts.journal {
        let header = JournalHeader::new(SessionClock::start().epoch_wall());
        let journal = JournalWriter::new(path.clone(), header)
            .with_context(|| format!("Failed to create journal {}", path.display()))?;
        println!("  Journal: {}", path.display());
        dispatcher = dispatcher.with_journal(journal);
    }

    let mut session = GestureSession::new(config, dispatcher);

    if let Some(path) = &opts.model {
        let classifier = TemplateClassifier::load(path)
            .with_context(|| format!("Failed to load template model {}", path.display()))?;
        println!("  Classifier labels: {}", classifier.labels().len());
        session = session.with_classifier(Box::new(classifier))?;
    }

    session = if opts.bell {
        session.with_feedback(Box::new(TerminalBell))
    } else {
        session.with_feedback(Box::new(LogFeedback))
    };
    println!();

    let stop = session.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping session");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let report = session.run(&mut tracker, opts.realtime).await?;

    println!("{}", report.render());
    if let Some(path) = &opts.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}
