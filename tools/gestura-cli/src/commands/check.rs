//! Validate configuration and model files.

use std::path::PathBuf;

use gestura_common::config::AppConfig;
use gestura_platform_core::SequenceClassifier;
use gestura_recognition_core::TemplateClassifier;
use gestura_session::SessionConfig;

pub fn run(app: &AppConfig, session: Option<PathBuf>, model: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Gestura Check");
    println!("{}", "=".repeat(50));

    let mut failures = 0;

    let config = match &session {
        Some(path) => match SessionConfig::load(path) {
            Ok(config) => {
                println!("[OK] Session config: {}", path.display());
                Some(config)
            }
            Err(e) => {
                println!("[FAIL] Session config: {e}");
                failures += 1;
                None
            }
        },
        None => {
            println!("[OK] Session config: defaults from app config");
            Some(SessionConfig::from_app(app))
        }
    };

    if let Some(config) = &config {
        println!(
            "     {} fps, stable {} frames, countdown {} frames",
            config.fps, config.stabilizer.stable_frames, config.stabilizer.countdown_frames
        );
        println!(
            "     activation {:.1}s, screen {}x{}",
            config.arbiter.activation_secs, config.arbiter.screen.width, config.arbiter.screen.height
        );
        let unknown = config.actions.unknown_labels();
        if unknown.is_empty() {
            println!("[OK] Action table: {} entries", config.actions.len());
        } else {
            println!(
                "[WARN] Action table: {} entries, unknown gestures: {}",
                config.actions.len(),
                unknown.join(", ")
            );
        }
    }

    if let Some(path) = &model {
        match TemplateClassifier::load(path) {
            Ok(classifier) => {
                let labels: Vec<_> = classifier.labels().iter().map(|l| l.as_str()).collect();
                println!(
                    "[OK] Template model: {} ({} frames, {} policy, labels: {})",
                    path.display(),
                    classifier.window_len(),
                    classifier.policy().kind(),
                    labels.join(", ")
                );
                if let Some(config) = &config {
                    if classifier.window_len() != config.debouncer.window_len {
                        println!(
                            "[FAIL] Model window {} does not match debouncer window {}",
                            classifier.window_len(),
                            config.debouncer.window_len
                        );
                        failures += 1;
                    }
                }
            }
            Err(e) => {
                println!("[FAIL] Template model: {e}");
                failures += 1;
            }
        }
    }

    println!();
    if failures == 0 {
        println!("All checks passed.");
        Ok(())
    } else {
        anyhow::bail!("{failures} check(s) failed")
    }
}
