//! Fixed-length resampling and per-channel standardization.
//!
//! Every channel is resampled independently by linear interpolation over
//! `[0, 1]`, then standardized according to a [`NormalizationPolicy`].
//! Standard deviations are population values; near-constant channels are
//! centred but left unscaled.

use serde::{Deserialize, Serialize};

use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::landmark::{FrameVector, CHANNELS};
use gestura_hand_model::sequence::LandmarkSequence;

/// Channels whose deviation falls below this are only centred.
const STD_FLOOR: f64 = 10.0 * f64::EPSILON;

/// How resampled frames are standardized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationPolicy {
    /// Statistics from the sequence being normalized.
    #[default]
    PerSequence,

    /// Fixed statistics fitted over a whole dataset.
    Dataset { mean: Vec<f64>, std: Vec<f64> },

    /// Resample only.
    None,
}

impl NormalizationPolicy {
    pub fn dataset(stats: ChannelStats) -> Self {
        Self::Dataset {
            mean: stats.mean,
            std: stats.std,
        }
    }

    /// Serialized tag, without any statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PerSequence => "per_sequence",
            Self::Dataset { .. } => "dataset",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Output length `T`.
    pub target_frames: usize,

    /// Shorter sequences are rejected instead of stretched.
    pub min_frames: usize,

    pub policy: NormalizationPolicy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            target_frames: 100,
            min_frames: 10,
            policy: NormalizationPolicy::PerSequence,
        }
    }
}

/// Per-channel mean and population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl ChannelStats {
    pub fn from_frames(frames: &[FrameVector]) -> GestureResult<Self> {
        Self::accumulate(frames.iter())
    }

    fn accumulate<'a>(frames: impl Iterator<Item = &'a FrameVector> + Clone) -> GestureResult<Self> {
        let n = frames.clone().count();
        if n == 0 {
            return Err(GestureError::sequence("cannot compute statistics of an empty sequence"));
        }
        let mut mean = vec![0.0; CHANNELS];
        for frame in frames.clone() {
            for (m, v) in mean.iter_mut().zip(frame) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n as f64);

        let mut var = vec![0.0; CHANNELS];
        for frame in frames {
            for ((acc, v), m) in var.iter_mut().zip(frame).zip(&mean) {
                *acc += (v - m).powi(2);
            }
        }
        let std = var.into_iter().map(|v| (v / n as f64).sqrt()).collect();
        Ok(Self { mean, std })
    }

    fn validate(&self) -> GestureResult<()> {
        if self.mean.len() != CHANNELS || self.std.len() != CHANNELS {
            return Err(GestureError::config(format!(
                "dataset statistics need {CHANNELS} channels, got mean={} std={}",
                self.mean.len(),
                self.std.len()
            )));
        }
        Ok(())
    }
}

/// Fit dataset-wide statistics over already-resampled sequences.
pub fn fit_dataset_stats(sequences: &[Vec<FrameVector>]) -> GestureResult<ChannelStats> {
    ChannelStats::accumulate(sequences.iter().flatten())
}

/// Linearly resample `frames` to `target` evenly spaced points.
///
/// Output frame `j` samples the source at `j * (n - 1) / (target - 1)`, so
/// resampling to the original length reproduces it exactly.
pub fn resample(frames: &[FrameVector], target: usize) -> GestureResult<Vec<FrameVector>> {
    let n = frames.len();
    if n < 2 {
        return Err(GestureError::sequence(format!(
            "interpolation needs at least 2 frames, got {n}"
        )));
    }
    if target == 0 {
        return Err(GestureError::sequence("target frame count must be positive"));
    }

    let step = if target > 1 {
        (n - 1) as f64 / (target - 1) as f64
    } else {
        0.0
    };

    let out = (0..target)
        .map(|j| {
            let pos = j as f64 * step;
            let lo = (pos.floor() as usize).min(n - 1);
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            let mut frame = [0.0; CHANNELS];
            for (c, value) in frame.iter_mut().enumerate() {
                let a = frames[lo][c];
                let b = frames[hi][c];
                *value = a + (b - a) * frac;
            }
            frame
        })
        .collect();
    Ok(out)
}

/// Standardize `frames` in place.
pub fn standardize(frames: &mut [FrameVector], policy: &NormalizationPolicy) -> GestureResult<()> {
    let stats = match policy {
        NormalizationPolicy::None => return Ok(()),
        NormalizationPolicy::PerSequence => ChannelStats::from_frames(frames)?,
        NormalizationPolicy::Dataset { mean, std } => {
            let stats = ChannelStats {
                mean: mean.clone(),
                std: std.clone(),
            };
            stats.validate()?;
            stats
        }
    };

    for frame in frames.iter_mut() {
        for ((v, m), s) in frame.iter_mut().zip(&stats.mean).zip(&stats.std) {
            let scale = if *s < STD_FLOOR { 1.0 } else { *s };
            *v = (*v - m) / scale;
        }
    }
    Ok(())
}

/// Turns recorded or live sequences into the fixed `(T, 63)` shape the
/// sequence classifier consumes.
#[derive(Debug, Clone, Default)]
pub struct SequenceNormalizer {
    config: NormalizerConfig,
}

impl SequenceNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Reject short sequences, then resample and standardize.
    pub fn prepare(&self, sequence: &LandmarkSequence) -> GestureResult<Vec<FrameVector>> {
        if sequence.len() < self.config.min_frames {
            return Err(GestureError::SequenceTooShort {
                frames: sequence.len(),
                min: self.config.min_frames,
            });
        }
        self.normalize(sequence.frames())
    }

    /// Resample and standardize without the minimum-length check.
    pub fn normalize(&self, frames: &[FrameVector]) -> GestureResult<Vec<FrameVector>> {
        let mut out = resample(frames, self.config.target_frames)?;
        standardize(&mut out, &self.config.policy)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp(len: usize) -> Vec<FrameVector> {
        (0..len)
            .map(|i| {
                let mut f = [0.0; CHANNELS];
                for (c, v) in f.iter_mut().enumerate() {
                    *v = i as f64 * (c + 1) as f64;
                }
                f
            })
            .collect()
    }

    #[test]
    fn test_resample_midpoints() {
        let frames = ramp(3);
        let out = resample(&frames, 5).unwrap();
        assert_eq!(out.len(), 5);
        let firsts: Vec<f64> = out.iter().map(|f| f[0]).collect();
        assert_eq!(firsts, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_resample_rejects_single_frame() {
        assert!(matches!(resample(&ramp(1), 10), Err(GestureError::Sequence { .. })));
        assert!(resample(&ramp(2), 0).is_err());
    }

    #[test]
    fn test_prepare_rejects_short_sequences() {
        let normalizer = SequenceNormalizer::default();
        let err = normalizer
            .prepare(&LandmarkSequence::new(ramp(9)))
            .unwrap_err();
        assert!(matches!(err, GestureError::SequenceTooShort { frames: 9, min: 10 }));
        assert_eq!(normalizer.prepare(&LandmarkSequence::new(ramp(10))).unwrap().len(), 100);
    }

    #[test]
    fn test_per_sequence_output_is_standard() {
        let out = SequenceNormalizer::default().normalize(&ramp(37)).unwrap();
        let stats = ChannelStats::from_frames(&out).unwrap();
        for c in 0..CHANNELS {
            assert!(stats.mean[c].abs() < 1e-9);
            assert!((stats.std[c] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_channel_is_centred_only() {
        let frames = vec![[0.25; CHANNELS]; 12];
        let out = SequenceNormalizer::default().normalize(&frames).unwrap();
        assert!(out.iter().all(|f| f.iter().all(|v| v.abs() < 1e-12)));
    }

    #[test]
    fn test_dataset_policy() {
        let a = resample(&ramp(20), 10).unwrap();
        let b = resample(&ramp(40), 10).unwrap();
        let stats = fit_dataset_stats(&[a.clone(), b]).unwrap();
        let normalizer = SequenceNormalizer::new(NormalizerConfig {
            target_frames: 10,
            policy: NormalizationPolicy::dataset(stats.clone()),
            ..Default::default()
        });
        let out = normalizer.normalize(&a).unwrap();
        let expected = (a[3][5] - stats.mean[5]) / stats.std[5];
        assert!((out[3][5] - expected).abs() < 1e-12);

        let broken = SequenceNormalizer::new(NormalizerConfig {
            policy: NormalizationPolicy::Dataset {
                mean: vec![0.0; 3],
                std: vec![1.0; 3],
            },
            ..Default::default()
        });
        assert!(matches!(broken.normalize(&a), Err(GestureError::Config { .. })));
    }

    #[test]
    fn test_policy_serde_shape() {
        let json = serde_json::to_string(&NormalizationPolicy::PerSequence).unwrap();
        assert_eq!(json, r#"{"kind":"per_sequence"}"#);
        let none: NormalizationPolicy = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(none, NormalizationPolicy::None);
        assert_eq!(none.kind(), "none");
        let dataset = NormalizationPolicy::Dataset { mean: vec![], std: vec![] };
        assert!(serde_json::to_string(&dataset).unwrap().contains(dataset.kind()));
    }

    fn arb_sequence() -> impl Strategy<Value = Vec<FrameVector>> {
        prop::collection::vec(prop::collection::vec(-1.0f64..1.0, CHANNELS), 2..40).prop_map(
            |rows| {
                rows.into_iter()
                    .map(|r| FrameVector::try_from(r.as_slice()).unwrap())
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_identity_resample_matches_standardized_original(frames in arb_sequence()) {
            let t = frames.len();
            let normalizer = SequenceNormalizer::new(NormalizerConfig {
                target_frames: t,
                ..Default::default()
            });
            let got = normalizer.normalize(&frames).unwrap();

            let mut expected = frames.clone();
            standardize(&mut expected, &NormalizationPolicy::PerSequence).unwrap();

            for (g, e) in got.iter().zip(&expected) {
                for (a, b) in g.iter().zip(e) {
                    prop_assert!((a - b).abs() < 1e-9);
                }
            }
        }
    }
}
