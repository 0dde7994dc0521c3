//! Nearest-template sequence classifier.
//!
//! A model file lists one or more resampled sequences per label. Templates and
//! live windows are standardized with the model's policy when the model is
//! loaded and on every call, so both sides of a distance always share one
//! normalization. A window takes the label of the closest template by mean
//! squared distance.
//!
//! ```json
//! {
//!   "window_len": 100,
//!   "policy": { "kind": "per_sequence" },
//!   "templates": [ { "label": "wave", "frames": [[0.1, ...], ...] } ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::gesture::{Classification, GestureLabel};
use gestura_hand_model::landmark::{FrameVector, CHANNELS};
use gestura_hand_model::sequence::LandmarkSequence;
use gestura_platform_core::SequenceClassifier;

use crate::normalizer::{
    fit_dataset_stats, standardize, NormalizationPolicy, NormalizerConfig, SequenceNormalizer,
};

/// One labelled sequence, resampled to the model's window but not standardized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub label: GestureLabel,
    pub frames: Vec<Vec<f64>>,
}

/// On-disk model description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateModel {
    pub window_len: usize,
    #[serde(default)]
    pub policy: NormalizationPolicy,
    pub templates: Vec<Template>,
}

impl TemplateModel {
    pub fn new(window_len: usize, policy: NormalizationPolicy) -> Self {
        Self {
            window_len,
            policy,
            templates: Vec::new(),
        }
    }

    /// Resample a recorded sequence to the window and add it under `label`.
    ///
    /// A `Dataset` policy is refitted over every template afterwards.
    pub fn push_sequence(
        &mut self,
        label: GestureLabel,
        sequence: &LandmarkSequence,
        min_frames: usize,
    ) -> GestureResult<()> {
        let resampler = SequenceNormalizer::new(NormalizerConfig {
            target_frames: self.window_len,
            min_frames,
            policy: NormalizationPolicy::None,
        });
        let frames = resampler.prepare(sequence)?;
        self.templates.push(Template {
            label,
            frames: LandmarkSequence::new(frames).to_rows(),
        });
        if matches!(self.policy, NormalizationPolicy::Dataset { .. }) {
            self.refit_dataset()?;
        }
        Ok(())
    }

    /// Switch to a `Dataset` policy fitted over the current templates.
    pub fn refit_dataset(&mut self) -> GestureResult<()> {
        let sequences = self
            .templates
            .iter()
            .map(|t| template_frames(t, self.window_len))
            .collect::<GestureResult<Vec<_>>>()?;
        self.policy = NormalizationPolicy::dataset(fit_dataset_stats(&sequences)?);
        Ok(())
    }
}

fn template_frames(template: &Template, window_len: usize) -> GestureResult<Vec<FrameVector>> {
    if template.frames.len() != window_len {
        return Err(GestureError::classifier(format!(
            "template {} has {} frames, expected {window_len}",
            template.label,
            template.frames.len(),
        )));
    }
    LandmarkSequence::from_rows(&template.frames)
        .map(LandmarkSequence::into_frames)
        .map_err(|e| GestureError::classifier(format!("template {}: {e}", template.label)))
}

#[derive(Debug, Clone)]
pub struct TemplateClassifier {
    window_len: usize,
    normalizer: SequenceNormalizer,
    templates: Vec<(GestureLabel, Vec<FrameVector>)>,
}

impl TemplateClassifier {
    /// Validate shapes and build the classifier.
    pub fn from_model(model: TemplateModel) -> GestureResult<Self> {
        if model.window_len < 2 {
            return Err(GestureError::classifier(format!(
                "window length must be at least 2, got {}",
                model.window_len
            )));
        }
        if model.templates.is_empty() {
            return Err(GestureError::classifier("model contains no templates"));
        }

        let mut templates = Vec::with_capacity(model.templates.len());
        for template in &model.templates {
            let mut frames = template_frames(template, model.window_len)?;
            standardize(&mut frames, &model.policy)?;
            templates.push((template.label, frames));
        }

        let normalizer = SequenceNormalizer::new(NormalizerConfig {
            target_frames: model.window_len,
            min_frames: model.window_len,
            policy: model.policy,
        });

        Ok(Self {
            window_len: model.window_len,
            normalizer,
            templates,
        })
    }

    /// Load a model file. A missing file is reported as [`GestureError::FileNotFound`].
    pub fn load(path: &Path) -> GestureResult<Self> {
        if !path.exists() {
            return Err(GestureError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let model: TemplateModel = serde_json::from_str(&content)?;
        let classifier = Self::from_model(model)?;
        tracing::info!(
            path = %path.display(),
            templates = classifier.templates.len(),
            window_len = classifier.window_len,
            "Template model loaded"
        );
        Ok(classifier)
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.normalizer.config().policy
    }

    /// Distinct labels, in first-seen order.
    pub fn labels(&self) -> Vec<GestureLabel> {
        let mut labels = Vec::new();
        for (label, _) in &self.templates {
            if !labels.contains(label) {
                labels.push(*label);
            }
        }
        labels
    }
}

impl SequenceClassifier for TemplateClassifier {
    fn classify(&self, window: &[FrameVector]) -> GestureResult<Classification> {
        if window.len() != self.window_len {
            return Err(GestureError::classifier(format!(
                "expected a {}-frame window, got {}",
                self.window_len,
                window.len()
            )));
        }
        let normalized = self.normalizer.normalize(window)?;

        let distances: Vec<f64> = self
            .templates
            .iter()
            .map(|(_, frames)| mean_squared_distance(&normalized, frames))
            .collect();

        // Ties resolve to the first template.
        let (best, d_min) = distances
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |acc, (i, d)| if d < acc.1 { (i, d) } else { acc });

        let denom: f64 = distances.iter().map(|d| (d_min - d).exp()).sum();
        let score = if denom > 0.0 { 1.0 / denom } else { 0.0 };

        Ok(Classification {
            label: self.templates[best].0,
            score,
        })
    }

    fn window_len(&self) -> usize {
        self.window_len
    }
}

fn mean_squared_distance(a: &[FrameVector], b: &[FrameVector]) -> f64 {
    let total: f64 = a
        .iter()
        .zip(b)
        .flat_map(|(fa, fb)| fa.iter().zip(fb.iter()))
        .map(|(x, y)| (x - y).powi(2))
        .sum();
    total / (a.len() * CHANNELS) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::resample;

    fn wave(len: usize, phase: f64) -> Vec<FrameVector> {
        (0..len)
            .map(|i| {
                let mut f = [0.0; CHANNELS];
                for (c, v) in f.iter_mut().enumerate() {
                    *v = ((i as f64) * 0.3 + phase + c as f64 * 0.01).sin();
                }
                f
            })
            .collect()
    }

    fn model(len: usize) -> TemplateModel {
        model_with(len, NormalizationPolicy::PerSequence)
    }

    fn model_with(len: usize, policy: NormalizationPolicy) -> TemplateModel {
        let mut model = TemplateModel::new(len, policy);
        model
            .push_sequence(GestureLabel::Wave, &LandmarkSequence::new(wave(len, 0.0)), 2)
            .unwrap();
        model
            .push_sequence(GestureLabel::Shake, &LandmarkSequence::new(wave(len, 1.5)), 2)
            .unwrap();
        model
    }

    #[test]
    fn test_picks_nearest_template() {
        let clf = TemplateClassifier::from_model(model(20)).unwrap();
        let got = clf.classify(&wave(20, 1.5)).unwrap();
        assert_eq!(got.label, GestureLabel::Shake);
        assert!(got.score > 0.5 && got.score <= 1.0);

        // Deterministic for identical input.
        assert_eq!(clf.classify(&wave(20, 1.5)).unwrap(), got);
        assert_eq!(clf.labels(), vec![GestureLabel::Wave, GestureLabel::Shake]);
    }

    #[test]
    fn test_rejects_wrong_window() {
        let clf = TemplateClassifier::from_model(model(20)).unwrap();
        assert!(matches!(
            clf.classify(&wave(19, 0.0)),
            Err(GestureError::Classifier { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_models() {
        let mut m = model(20);
        m.templates[0].frames.pop();
        assert!(TemplateClassifier::from_model(m).is_err());

        let mut m = model(20);
        m.templates[1].frames[3].push(0.0);
        assert!(TemplateClassifier::from_model(m).is_err());

        let mut m = model(20);
        m.templates.clear();
        assert!(TemplateClassifier::from_model(m).is_err());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = std::env::temp_dir().join("gestura-no-such-model.json");
        let err = TemplateClassifier::load(&path).unwrap_err();
        assert!(matches!(err, GestureError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_round_trip() {
        let path = std::env::temp_dir().join(format!("gestura-model-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&model(12)).unwrap()).unwrap();
        let clf = TemplateClassifier::load(&path).unwrap();
        assert_eq!(clf.window_len(), 12);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_recorded_sequence_matches_itself_under_every_policy() {
        let recordings = [(GestureLabel::Wave, 0.0), (GestureLabel::Shake, 1.5)];
        for policy in [NormalizationPolicy::PerSequence, NormalizationPolicy::None] {
            let clf = TemplateClassifier::from_model(model_with(16, policy.clone())).unwrap();
            for (label, phase) in recordings {
                assert_eq!(clf.classify(&wave(16, phase)).unwrap().label, label, "{policy:?}");
            }
        }
    }

    #[test]
    fn test_templates_are_stored_resampled_only() {
        let m = model_with(16, NormalizationPolicy::None);
        let raw = wave(16, 0.0);
        assert_eq!(m.templates[0].frames[4], raw[4].to_vec());
    }

    #[test]
    fn test_dataset_policy_is_refitted_on_push() {
        let mut m = TemplateModel::new(12, NormalizationPolicy::dataset(
            crate::normalizer::ChannelStats {
                mean: vec![0.0; CHANNELS],
                std: vec![1.0; CHANNELS],
            },
        ));
        m.push_sequence(GestureLabel::Wave, &LandmarkSequence::new(wave(30, 0.0)), 10)
            .unwrap();
        m.push_sequence(GestureLabel::Shake, &LandmarkSequence::new(wave(18, 1.5)), 10)
            .unwrap();

        let NormalizationPolicy::Dataset { mean, .. } = &m.policy else {
            panic!("expected a dataset policy, got {:?}", m.policy);
        };
        assert_eq!(mean.len(), CHANNELS);
        assert!(mean.iter().any(|m| m.abs() > 1e-3));

        let clf = TemplateClassifier::from_model(m).unwrap();
        let shake = resample(&wave(18, 1.5), 12).unwrap();
        assert_eq!(clf.classify(&shake).unwrap().label, GestureLabel::Shake);
    }

    #[test]
    fn test_push_rejects_short_recordings() {
        let mut m = TemplateModel::new(12, NormalizationPolicy::PerSequence);
        let err = m
            .push_sequence(GestureLabel::Wave, &LandmarkSequence::new(wave(5, 0.0)), 10)
            .unwrap_err();
        assert!(matches!(err, GestureError::SequenceTooShort { frames: 5, min: 10 }));
        assert!(m.templates.is_empty());
    }
}
