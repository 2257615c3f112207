//! In-memory stand-ins for the browser, used by unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use lightdeck_protocol::{ClientEvent, ControlAction, ControlResponse, Light};

use crate::api::LightsApi;
use crate::audio::frame_loop::{FrameHandle, FrameScheduler};
use crate::audio::session::{Analyser, AudioSource};
use crate::channel::{Emitter, FrameSink};
use crate::error::UiError;
use crate::page::{ControlPair, LightsView, Page, StripSelection};

#[derive(Default)]
struct ManualQueue {
    next: Cell<FrameHandle>,
    ticks: RefCell<Vec<(FrameHandle, Box<dyn FnOnce()>)>>,
    ignore_cancel: Cell<bool>,
}

/// Frames advance only when the test calls `run_frame`
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<ManualQueue>,
}

impl ManualScheduler {
    /// A scheduler whose frames cannot be withdrawn once requested
    pub fn ignoring_cancel() -> Self {
        let scheduler = Self::default();
        scheduler.queue.ignore_cancel.set(true);
        scheduler
    }

    /// Run every tick requested before this call
    pub fn run_frame(&self) {
        let due = std::mem::take(&mut *self.queue.ticks.borrow_mut());
        for (_, tick) in due {
            tick();
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.ticks.borrow().len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&self, tick: Box<dyn FnOnce()>) -> Option<FrameHandle> {
        let handle = self.queue.next.get() + 1;
        self.queue.next.set(handle);
        self.queue.ticks.borrow_mut().push((handle, tick));
        Some(handle)
    }

    fn cancel(&self, handle: FrameHandle) {
        if !self.queue.ignore_cancel.get() {
            self.queue.ticks.borrow_mut().retain(|(h, _)| *h != handle);
        }
    }
}

#[derive(Default)]
pub struct RecordingEmitter {
    events: RefCell<Vec<ClientEvent>>,
}

impl RecordingEmitter {
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.borrow().clone()
    }
}

impl Emitter for RecordingEmitter {
    fn emit(&self, event: ClientEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// What the fake page last showed in the device list area
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Items(Vec<Light>),
    Empty,
    Failed,
}

#[derive(Default)]
pub struct FakePage {
    pub rendered: RefCell<Option<Rendered>>,
    pub strip_options: RefCell<(Vec<String>, Vec<String>)>,
    pub running: RefCell<Vec<(ControlPair, bool)>>,
    pub alerts: RefCell<Vec<String>>,
    pub selection: RefCell<StripSelection>,
    pub speed: RefCell<String>,
    pub speed_label: RefCell<Option<String>>,
    pub spectra: RefCell<Vec<Vec<u8>>>,
}

impl FakePage {
    pub fn select(&self, strip1: &str, strip2: &str) {
        *self.selection.borrow_mut() = StripSelection {
            strip1: strip1.into(),
            strip2: strip2.into(),
        };
    }

    pub fn set_speed(&self, value: &str) {
        *self.speed.borrow_mut() = value.into();
    }

    /// Last enablement set for `pair`, if any
    pub fn running(&self, pair: ControlPair) -> Option<bool> {
        self.running
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| *p == pair)
            .map(|(_, running)| *running)
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn spectrum_draws(&self) -> usize {
        self.spectra.borrow().len()
    }

    pub fn last_spectrum(&self) -> Vec<u8> {
        self.spectra.borrow().last().cloned().unwrap_or_default()
    }
}

impl Page for FakePage {
    fn render_lights(&self, view: LightsView<'_>) {
        let rendered = match view {
            LightsView::Loaded(lights) => {
                let ids: Vec<String> = lights.iter().map(|l| l.id.clone()).collect();
                *self.strip_options.borrow_mut() = (ids.clone(), ids);
                Rendered::Items(lights.to_vec())
            }
            LightsView::Empty => {
                *self.strip_options.borrow_mut() = (Vec::new(), Vec::new());
                Rendered::Empty
            }
            LightsView::Failed => Rendered::Failed,
        };
        *self.rendered.borrow_mut() = Some(rendered);
    }

    fn set_running(&self, pair: ControlPair, running: bool) {
        self.running.borrow_mut().push((pair, running));
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn strip_selection(&self) -> StripSelection {
        self.selection.borrow().clone()
    }

    fn speed_input(&self) -> String {
        self.speed.borrow().clone()
    }

    fn set_speed_label(&self, value: &str) {
        *self.speed_label.borrow_mut() = Some(value.to_string());
    }

    fn draw_spectrum(&self, magnitudes: &[u8]) {
        self.spectra.borrow_mut().push(magnitudes.to_vec());
    }
}

/// Scripted REST responses
#[derive(Default)]
pub struct FakeApi {
    pub lists: RefCell<VecDeque<Result<Vec<Light>, UiError>>>,
    pub controls: RefCell<VecDeque<Result<ControlResponse, UiError>>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeApi {
    pub fn with_list(self, result: Result<Vec<Light>, UiError>) -> Self {
        self.lists.borrow_mut().push_back(result);
        self
    }

    pub fn with_control(self, result: Result<ControlResponse, UiError>) -> Self {
        self.controls.borrow_mut().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl LightsApi for FakeApi {
    async fn list_lights(&self) -> Result<Vec<Light>, UiError> {
        self.calls.borrow_mut().push("GET /api/lights".into());
        self.lists
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(UiError::Network("no scripted response".into())))
    }

    async fn control(&self, id: &str, action: ControlAction) -> Result<ControlResponse, UiError> {
        self.calls
            .borrow_mut()
            .push(format!("POST /api/lights/{id}/control {action}"));
        self.controls
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(UiError::Network("no scripted response".into())))
    }
}

pub struct FakeSession {
    magnitudes: Vec<u8>,
    sample_rate: f64,
    closed: Rc<Cell<bool>>,
}

impl Analyser for FakeSession {
    fn sample(&mut self) -> &[u8] {
        &self.magnitudes
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn close(self) {
        self.closed.set(true);
    }
}

/// Microphone stand-in: grants, denies, or waits for a release signal
pub struct FakeSource {
    grant: Option<(Vec<u8>, f64)>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    closed: Rc<Cell<bool>>,
}

impl FakeSource {
    pub fn granting(magnitudes: Vec<u8>, sample_rate: f64) -> Self {
        Self {
            grant: Some((magnitudes, sample_rate)),
            gate: RefCell::new(None),
            closed: Rc::new(Cell::new(false)),
        }
    }

    pub fn denying() -> Self {
        Self {
            grant: None,
            gate: RefCell::new(None),
            closed: Rc::new(Cell::new(false)),
        }
    }

    /// Grants only after the returned sender fires
    pub fn gated(magnitudes: Vec<u8>, sample_rate: f64) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let source = Self::granting(magnitudes, sample_rate);
        *source.gate.borrow_mut() = Some(rx);
        (source, tx)
    }

    pub fn closed_flag(&self) -> Rc<Cell<bool>> {
        self.closed.clone()
    }
}

impl AudioSource for FakeSource {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession, UiError> {
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let (magnitudes, sample_rate) = self
            .grant
            .clone()
            .ok_or_else(|| UiError::Media("Permission denied".into()))?;
        Ok(FakeSession {
            magnitudes,
            sample_rate,
            closed: self.closed.clone(),
        })
    }
}

/// Event-channel socket that records what it was asked to send
#[derive(Default)]
pub struct FakeSocket {
    open: Cell<bool>,
    fail: Cell<bool>,
    sent: RefCell<Vec<String>>,
}

impl FakeSocket {
    pub fn open() -> Self {
        let socket = Self::default();
        socket.set_open(true);
        socket
    }

    pub fn set_open(&self, open: bool) {
        self.open.set(open);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl FrameSink for FakeSocket {
    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn send(&self, frame: &str) -> Result<(), UiError> {
        if self.fail.get() {
            return Err(UiError::Js("send failed".into()));
        }
        self.sent.borrow_mut().push(frame.to_string());
        Ok(())
    }
}
