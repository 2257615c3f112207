//! Audio capture controller
//!
//! Idle -> Opening -> Capturing -> Idle. While capturing, every frame
//! samples the analyser, emits `audio_frequency` and redraws the spectrum.

use std::cell::RefCell;
use std::rc::Rc;

use lightdeck_protocol::ClientEvent;

use super::frame_loop::{FrameLoop, FrameScheduler};
use super::session::{Analyser, AudioSource};
use super::spectrum::dominant_frequency;
use crate::channel::Emitter;
use crate::page::{ControlPair, Page};

pub const MIC_ALERT: &str = "Could not access microphone. Please check permissions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A capture is already running or being opened
    AlreadyActive,
    /// Microphone access failed; the user was alerted
    Denied,
    /// `stop` arrived while access was still pending
    Cancelled,
    /// Start again after a stop while access was pending; the pending
    /// request completes the start
    Resumed,
}

enum CaptureState<S, F: FrameScheduler + 'static> {
    Idle,
    Opening { cancelled: bool },
    Capturing {
        session: Rc<RefCell<S>>,
        frames: FrameLoop<F>,
    },
}

pub struct AudioCapture<A: AudioSource, E, P, F: FrameScheduler + 'static> {
    source: A,
    emitter: Rc<E>,
    page: Rc<P>,
    scheduler: F,
    state: RefCell<CaptureState<A::Session, F>>,
}

impl<A, E, P, F> AudioCapture<A, E, P, F>
where
    A: AudioSource,
    E: Emitter + 'static,
    P: Page + 'static,
    F: FrameScheduler + Clone + 'static,
{
    pub fn new(source: A, emitter: Rc<E>, page: Rc<P>, scheduler: F) -> Self {
        Self {
            source,
            emitter,
            page,
            scheduler,
            state: RefCell::new(CaptureState::Idle),
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(*self.state.borrow(), CaptureState::Capturing { .. })
    }

    pub async fn start(&self) -> StartOutcome {
        {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                CaptureState::Idle => {}
                CaptureState::Opening { cancelled } if *cancelled => {
                    *cancelled = false;
                    tracing::debug!("Audio capture resumed while opening");
                    return StartOutcome::Resumed;
                }
                _ => {
                    tracing::debug!("Audio capture already active");
                    return StartOutcome::AlreadyActive;
                }
            }
            *state = CaptureState::Opening { cancelled: false };
        }

        let opened = self.source.open().await;
        let cancelled = matches!(
            *self.state.borrow(),
            CaptureState::Opening { cancelled: true }
        );
        *self.state.borrow_mut() = CaptureState::Idle;

        let session = match opened {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "Error accessing microphone");
                if cancelled {
                    return StartOutcome::Cancelled;
                }
                self.page.alert(MIC_ALERT);
                return StartOutcome::Denied;
            }
        };
        if cancelled {
            session.close();
            return StartOutcome::Cancelled;
        }

        self.page.set_running(ControlPair::Audio, true);
        self.emitter.emit(ClientEvent::AudioStarted);

        let session = Rc::new(RefCell::new(session));
        let frames = FrameLoop::start(
            self.scheduler.clone(),
            frame_step(session.clone(), self.emitter.clone(), self.page.clone()),
        );
        *self.state.borrow_mut() = CaptureState::Capturing { session, frames };
        tracing::info!("Audio capture started");
        StartOutcome::Started
    }

    /// Stop capturing. Buttons are reset and `audio_stopped` is emitted
    /// even when nothing was running.
    pub fn stop(&self) {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), CaptureState::Idle);
        match previous {
            CaptureState::Capturing { session, frames } => {
                frames.cancel();
                drop(frames);
                match Rc::try_unwrap(session) {
                    Ok(session) => session.into_inner().close(),
                    Err(_) => tracing::warn!("Capture session still referenced, not closed"),
                }
                tracing::info!("Audio capture stopped");
            }
            CaptureState::Opening { .. } => {
                *self.state.borrow_mut() = CaptureState::Opening { cancelled: true };
            }
            CaptureState::Idle => {}
        }
        self.page.set_running(ControlPair::Audio, false);
        self.emitter.emit(ClientEvent::AudioStopped);
    }
}

fn frame_step<S, E, P>(session: Rc<RefCell<S>>, emitter: Rc<E>, page: Rc<P>) -> impl FnMut()
where
    S: Analyser,
    E: Emitter,
    P: Page,
{
    move || {
        let mut session = session.borrow_mut();
        let sample_rate = session.sample_rate();
        let magnitudes = session.sample();
        emitter.emit(ClientEvent::AudioFrequency(dominant_frequency(
            magnitudes,
            sample_rate,
        )));
        page.draw_spectrum(magnitudes);
    }
}
