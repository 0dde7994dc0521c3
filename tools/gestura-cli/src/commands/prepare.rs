//! Prepare a classifier template from a recording.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;

use gestura_common::config::AppConfig;
use gestura_hand_model::gesture::GestureLabel;
use gestura_hand_model::sequence::LandmarkSequence;
use gestura_platform_core::HandTracker;
use gestura_recognition_core::classifier::{Template, TemplateModel};
use gestura_recognition_core::{NormalizationPolicy, NormalizerConfig, SequenceNormalizer};
use gestura_session::ReplayTracker;

/// Normalization policy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    PerSequence,
    /// Statistics fitted over every template in the model
    Dataset,
    None,
}

impl PolicyArg {
    fn kind(self) -> &'static str {
        match self {
            Self::PerSequence => "per_sequence",
            Self::Dataset => "dataset",
            Self::None => "none",
        }
    }
}

pub struct PrepareOptions {
    pub recording: PathBuf,
    pub label: String,
    pub output: Option<PathBuf>,
    pub append_to: Option<PathBuf>,
    pub policy: Option<PolicyArg>,
    pub frames: usize,
    pub min_frames: usize,
}

pub fn run(app: &AppConfig, opts: PrepareOptions) -> anyhow::Result<()> {
    let label: GestureLabel = opts
        .label
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}; known labels: {}", known_labels()))?;

    let recording = super::resolve_recording(app, &opts.recording);
    let (sequence, skipped) = read_sequence(&recording)?;

    if opts.output.is_some() || opts.append_to.is_none() {
        let policy = match opts.policy.unwrap_or(PolicyArg::PerSequence) {
            PolicyArg::PerSequence => NormalizationPolicy::PerSequence,
            PolicyArg::None => NormalizationPolicy::None,
            PolicyArg::Dataset => anyhow::bail!(
                "dataset statistics are fitted over a model; use --append-to without --output"
            ),
        };
        let normalizer = SequenceNormalizer::new(NormalizerConfig {
            target_frames: opts.frames,
            min_frames: opts.min_frames,
            policy,
        });
        let prepared = normalizer
            .prepare(&sequence)
            .with_context(|| format!("Failed to prepare {}", recording.display()))?;
        let template = Template {
            label,
            frames: LandmarkSequence::new(prepared).to_rows(),
        };
        let json = serde_json::to_string_pretty(&template)?;
        match &opts.output {
            Some(path) => {
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Template saved to: {}", path.display());
            }
            None => println!("{json}"),
        }
    }

    if let Some(path) = &opts.append_to {
        let model = append_template(path, label, &sequence, &opts)
            .with_context(|| format!("Failed to prepare {}", recording.display()))?;
        eprintln!(
            "Model {} now holds {} template(s), policy {}",
            path.display(),
            model.templates.len(),
            model.policy.kind()
        );
    }

    eprintln!(
        "Prepared '{label}' from {} hand frames ({skipped} skipped) -> {} frames",
        sequence.len(),
        opts.frames
    );
    Ok(())
}

/// Dominant-hand sequence of a recording and the count of skipped frames.
fn read_sequence(recording: &Path) -> anyhow::Result<(LandmarkSequence, usize)> {
    let mut tracker = ReplayTracker::open(recording)
        .with_context(|| format!("Failed to open recording {}", recording.display()))?;

    let mut snapshots = Vec::with_capacity(tracker.remaining());
    let mut skipped = 0usize;
    loop {
        match tracker.next_frame() {
            Ok(Some(frame)) => snapshots.push(frame),
            Ok(None) => break,
            Err(e) if e.is_frame_local() => {
                tracing::warn!(error = %e, "Skipping malformed frame");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let (side, sequence) = LandmarkSequence::dominant_from_frames(&snapshots)
        .ok_or_else(|| anyhow::anyhow!("Recording contains no hands"))?;
    tracing::debug!(%side, frames = sequence.len(), "Dominant hand selected");
    Ok((sequence, skipped))
}

/// Add a recording to a model file, creating the model if needed.
///
/// The template is stored resampled, so the model's own policy normalizes
/// it together with every live window.
pub(crate) fn append_template(
    path: &Path,
    label: GestureLabel,
    sequence: &LandmarkSequence,
    opts: &PrepareOptions,
) -> anyhow::Result<TemplateModel> {
    let mut model = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model {}", path.display()))?;
        let model: TemplateModel = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse model {}", path.display()))?;
        if model.window_len != opts.frames {
            anyhow::bail!(
                "Model {} expects {} frames per template, prepared {}",
                path.display(),
                model.window_len,
                opts.frames
            );
        }
        if let Some(policy) = opts.policy {
            if policy.kind() != model.policy.kind() {
                anyhow::bail!(
                    "Model {} uses the {} policy, requested {}",
                    path.display(),
                    model.policy.kind(),
                    policy.kind()
                );
            }
        }
        model
    } else {
        TemplateModel::new(
            opts.frames,
            match opts.policy {
                Some(PolicyArg::None) => NormalizationPolicy::None,
                _ => NormalizationPolicy::PerSequence,
            },
        )
    };

    model.push_sequence(label, sequence, opts.min_frames)?;
    if opts.policy == Some(PolicyArg::Dataset) {
        model.refit_dataset()?;
    }

    std::fs::write(path, serde_json::to_string_pretty(&model)?)
        .with_context(|| format!("Failed to write model {}", path.display()))?;
    Ok(model)
}

fn known_labels() -> String {
    GestureLabel::ALL
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestura_hand_model::landmark::{FrameVector, CHANNELS};
    use gestura_platform_core::SequenceClassifier;
    use gestura_recognition_core::TemplateClassifier;

    fn recording(len: usize, phase: f64) -> LandmarkSequence {
        let frames: Vec<FrameVector> = (0..len)
            .map(|i| {
                let mut f = [0.0; CHANNELS];
                for (c, v) in f.iter_mut().enumerate() {
                    *v = 0.5 + 0.2 * ((i as f64) * 0.4 + phase + c as f64 * 0.02).sin();
                }
                f
            })
            .collect();
        LandmarkSequence::new(frames)
    }

    fn options(policy: Option<PolicyArg>) -> PrepareOptions {
        PrepareOptions {
            recording: PathBuf::new(),
            label: String::new(),
            output: None,
            append_to: None,
            policy,
            frames: 20,
            min_frames: 10,
        }
    }

    fn temp_model(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gestura-{name}-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_appended_recordings_classify_as_themselves_without_standardization() {
        let path = temp_model("none-policy");
        let opts = options(Some(PolicyArg::None));
        append_template(&path, GestureLabel::Wave, &recording(20, 0.0), &opts).unwrap();
        // Later appends inherit the stored policy.
        let model =
            append_template(&path, GestureLabel::Shake, &recording(20, 2.0), &options(None))
                .unwrap();
        assert_eq!(model.policy, NormalizationPolicy::None);
        assert!(model.templates[0].frames.iter().flatten().all(|v| (0.0..=1.0).contains(v)));

        let clf = TemplateClassifier::load(&path).unwrap();
        let wave = recording(20, 0.0);
        let got = clf.classify(wave.frames()).unwrap();
        assert_eq!(got.label, GestureLabel::Wave);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_dataset_policy_is_fitted_on_append() {
        let path = temp_model("dataset-policy");
        let opts = options(Some(PolicyArg::Dataset));
        append_template(&path, GestureLabel::Wave, &recording(30, 0.0), &opts).unwrap();
        let model =
            append_template(&path, GestureLabel::Shake, &recording(25, 2.0), &opts).unwrap();
        assert_eq!(model.policy.kind(), "dataset");

        let clf = TemplateClassifier::load(&path).unwrap();
        assert_eq!(clf.policy().kind(), "dataset");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_policy_mismatch_is_refused() {
        let path = temp_model("policy-mismatch");
        append_template(&path, GestureLabel::Wave, &recording(20, 0.0), &options(None)).unwrap();
        let err = append_template(
            &path,
            GestureLabel::Shake,
            &recording(20, 2.0),
            &options(Some(PolicyArg::None)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("per_sequence"), "{err}");

        let mut longer = options(None);
        longer.frames = 30;
        assert!(append_template(&path, GestureLabel::Shake, &recording(20, 2.0), &longer).is_err());
        std::fs::remove_file(&path).ok();
    }
}
