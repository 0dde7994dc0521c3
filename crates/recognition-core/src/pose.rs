//! Single-hand pose predicates.
//!
//! Image-space `y` grows downward, so a fingertip is "extended" when its `y`
//! is smaller than its proximal joint's and "folded" when it is larger.
//! Landmark noise makes exact ties rare; a tie counts as neither.

use gestura_hand_model::landmark::{joint, HandObservation};

/// Thumb-tip to index-tip distance below which the hand is pinching.
pub const OK_PINCH_THRESHOLD: f64 = 0.05;

/// The five digits with their (tip, joint) comparison pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    /// Non-thumb fingers.
    pub const FOUR: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// `(tip, joint)` landmark indices compared for this finger.
    pub fn pair(&self) -> (usize, usize) {
        match self {
            Self::Thumb => (joint::THUMB_TIP, joint::THUMB_IP),
            Self::Index => (joint::INDEX_TIP, joint::INDEX_PIP),
            Self::Middle => (joint::MIDDLE_TIP, joint::MIDDLE_PIP),
            Self::Ring => (joint::RING_TIP, joint::RING_PIP),
            Self::Pinky => (joint::PINKY_TIP, joint::PINKY_PIP),
        }
    }
}

/// Tip above its joint.
pub fn is_finger_extended(hand: &HandObservation, finger: Finger) -> bool {
    let (tip, pip) = finger.pair();
    hand.landmark(tip).y < hand.landmark(pip).y
}

/// Tip below its joint.
pub fn is_finger_folded(hand: &HandObservation, finger: Finger) -> bool {
    let (tip, pip) = finger.pair();
    hand.landmark(tip).y > hand.landmark(pip).y
}

/// All four non-thumb fingers folded.
pub fn is_fist(hand: &HandObservation) -> bool {
    Finger::FOUR.iter().all(|&f| is_finger_folded(hand, f))
}

/// All five fingers extended, thumb included.
pub fn is_flat(hand: &HandObservation) -> bool {
    Finger::ALL.iter().all(|&f| is_finger_extended(hand, f))
}

/// Alias of [`is_flat`], used when the pose gates an action rather than a gesture.
pub fn is_extended(hand: &HandObservation) -> bool {
    is_flat(hand)
}

/// Open palm held up to lock out the other hand's actions.
pub fn is_stop(hand: &HandObservation) -> bool {
    let [thumb, index, middle, ring, pinky] = Finger::ALL.map(|f| is_finger_extended(hand, f));
    thumb && index && middle && ring && pinky
}

/// Index extended, middle/ring/pinky folded. Thumb ignored.
pub fn is_pointing(hand: &HandObservation) -> bool {
    is_finger_extended(hand, Finger::Index)
        && [Finger::Middle, Finger::Ring, Finger::Pinky]
            .iter()
            .all(|&f| is_finger_folded(hand, f))
}

/// Thumb and index tips touching with the middle finger up.
pub fn is_okay_gesture(hand: &HandObservation) -> bool {
    is_okay_gesture_within(hand, OK_PINCH_THRESHOLD)
}

/// [`is_okay_gesture`] with an explicit pinch distance.
pub fn is_okay_gesture_within(hand: &HandObservation, pinch_threshold: f64) -> bool {
    let pinch = hand
        .landmark(joint::THUMB_TIP)
        .distance_xy(hand.landmark(joint::INDEX_TIP));
    pinch < pinch_threshold && is_finger_extended(hand, Finger::Middle)
}
