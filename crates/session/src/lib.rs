//! Gestura Session
//!
//! Wires a hand tracker, the recognition components, and the action
//! dispatcher into one gesture session.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                  GestureSession                   │
//! │                                                   │
//! │  HandTracker ──► ModeArbiter ──► Direct commands  │
//! │       │               │                           │
//! │       │         (gesture mode)                    │
//! │       │               ▼                           │
//! │       ├──────► Detector ─► Stabilizer ─┐          │
//! │       │                                ▼          │
//! │       └──────► Debouncer+Classifier ─► Dispatcher │
//! │                                          │        │
//! │                              Injector + Journal   │
//! └───────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod feedback;
pub mod session;
pub mod source;

pub use config::SessionConfig;
pub use feedback::{LogFeedback, TerminalBell};
pub use session::*;
pub use source::ReplayTracker;
