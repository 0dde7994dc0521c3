//! Fixed-capacity sliding window of flattened landmark vectors.

use std::collections::VecDeque;

use gestura_hand_model::landmark::FrameVector;

/// Keeps the most recent `capacity` frames, oldest first.
#[derive(Debug, Clone)]
pub struct SequenceWindow {
    capacity: usize,
    frames: VecDeque<FrameVector>,
}

impl SequenceWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a frame, dropping the oldest once full.
    pub fn push(&mut self, frame: FrameVector) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Contiguous oldest-to-newest view.
    pub fn as_slice(&mut self) -> &[FrameVector] {
        self.frames.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameVector> {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestura_hand_model::landmark::CHANNELS;

    fn vector(v: f64) -> FrameVector {
        [v; CHANNELS]
    }

    #[test]
    fn test_slides_oldest_out() {
        let mut w = SequenceWindow::new(3);
        for i in 0..5 {
            w.push(vector(i as f64));
        }
        assert!(w.is_full());
        let firsts: Vec<f64> = w.as_slice().iter().map(|f| f[0]).collect();
        assert_eq!(firsts, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_fills_gradually() {
        let mut w = SequenceWindow::new(100);
        w.push(vector(0.0));
        assert_eq!(w.len(), 1);
        assert!(!w.is_full());
        w.clear();
        assert!(w.is_empty());
    }
}
