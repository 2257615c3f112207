//! Microphone capture and frequency extraction

pub mod capture;
pub mod frame_loop;
pub mod session;
pub mod spectrum;

pub use capture::{AudioCapture, StartOutcome, MIC_ALERT};
pub use frame_loop::{FrameLoop, FrameScheduler, RafScheduler};
pub use session::{Analyser, AudioSource, CaptureSession, Microphone};
