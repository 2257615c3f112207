//! Event channel client
//!
//! One WebSocket carrying JSON event frames. Outgoing events are queued
//! while the socket is not open and flushed in order once it is; an
//! abnormal close schedules a reconnect with exponential backoff.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use lightdeck_protocol::{decode_server, encode_client, ClientEvent, ServerEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use crate::error::{describe_js, UiError};

/// Frames kept while disconnected; older ones are dropped first
pub const OUTBOX_CAPACITY: usize = 256;

const BACKOFF_BASE_MS: u32 = 100;
const BACKOFF_MAX_MS: u32 = 5000;

/// Close codes that mean "we are done", not "try again"
const NORMAL_CLOSE: u16 = 1000;
const GOING_AWAY: u16 = 1001;

/// Anything events can be sent through
pub trait Emitter {
    fn emit(&self, event: ClientEvent);
}

impl<E: Emitter + ?Sized> Emitter for Rc<E> {
    fn emit(&self, event: ClientEvent) {
        (**self).emit(event);
    }
}

/// Delay before reconnect attempt `attempt` (0-based)
pub const fn reconnect_delay_ms(attempt: u32) -> u32 {
    let shift = if attempt < 6 { attempt } else { 6 };
    let delay = BACKOFF_BASE_MS << shift;
    if delay > BACKOFF_MAX_MS {
        BACKOFF_MAX_MS
    } else {
        delay
    }
}

/// Reconnect attempt counter
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    max_attempts: u32,
}

impl Backoff {
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
        }
    }

    /// Delay for the next attempt, `None` once attempts are exhausted
    pub fn next_delay(&mut self) -> Option<u32> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        let delay = reconnect_delay_ms(self.attempts);
        self.attempts += 1;
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Bounded FIFO of encoded frames
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<String>,
    dropped: u64,
}

impl Outbox {
    /// Queue a frame. Returns `true` if the oldest frame had to be dropped.
    pub fn push(&mut self, frame: String) -> bool {
        let overflow = self.queue.len() >= OUTBOX_CAPACITY;
        if overflow {
            self.queue.pop_front();
            self.dropped += 1;
        }
        self.queue.push_back(frame);
        overflow
    }

    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Put back a frame that failed to send
    pub fn unpop(&mut self, frame: String) {
        self.queue.push_front(frame);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Where encoded frames go; the browser implementation is `WebSocket`
pub trait FrameSink {
    fn is_open(&self) -> bool;
    fn send(&self, frame: &str) -> Result<(), UiError>;
}

impl FrameSink for WebSocket {
    fn is_open(&self) -> bool {
        self.ready_state() == Self::OPEN
    }

    fn send(&self, frame: &str) -> Result<(), UiError> {
        self.send_with_str(frame).map_err(UiError::from)
    }
}

/// What to do after the socket closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// Closed on purpose, stay closed
    Done,
    Retry { delay_ms: u32 },
    GiveUp,
}

pub const fn is_final_close(code: u16) -> bool {
    code == NORMAL_CLOSE || code == GOING_AWAY
}

/// Socket-independent half of the channel: the outbox and the reconnect
/// counter
#[derive(Debug)]
pub struct ChannelState {
    outbox: Outbox,
    backoff: Backoff,
}

impl ChannelState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            outbox: Outbox::default(),
            backoff: Backoff::new(max_attempts),
        }
    }

    pub fn queued(&self) -> usize {
        self.outbox.len()
    }

    /// Queue `event` and send whatever the sink accepts. Frequency samples
    /// are live data and are dropped rather than queued while closed.
    pub fn emit<S: FrameSink>(&mut self, sink: Option<&S>, event: &ClientEvent) {
        let open = sink.is_some_and(|s| s.is_open());
        if !open && matches!(event, ClientEvent::AudioFrequency(_)) {
            return;
        }
        if self.outbox.push(encode_client(event)) {
            tracing::debug!(
                dropped = self.outbox.dropped(),
                "Event outbox full, dropped oldest frame"
            );
        }
        if let Some(sink) = sink {
            self.flush(sink);
        }
    }

    /// Send everything queued, stopping at the first failure. Returns the
    /// number of frames sent.
    pub fn flush<S: FrameSink>(&mut self, sink: &S) -> usize {
        if !sink.is_open() {
            return 0;
        }
        let mut sent = 0;
        while let Some(frame) = self.outbox.pop() {
            if let Err(e) = sink.send(&frame) {
                tracing::warn!(error = %e, "Event send failed, keeping queued");
                self.outbox.unpop(frame);
                break;
            }
            sent += 1;
        }
        sent
    }

    /// The socket opened: reset the retry counter, flush the backlog and
    /// produce the `Connect` event for listeners
    pub fn opened<S: FrameSink>(&mut self, sink: &S) -> ServerEvent {
        self.backoff.reset();
        let sent = self.flush(sink);
        tracing::info!(sent, "Event channel open");
        ServerEvent::Connect
    }

    pub fn closed(&mut self, code: u16) -> CloseAction {
        if is_final_close(code) {
            return CloseAction::Done;
        }
        self.retry()
    }

    /// Next reconnect step after a failed attempt
    pub fn retry(&mut self) -> CloseAction {
        match self.backoff.next_delay() {
            Some(delay_ms) => CloseAction::Retry { delay_ms },
            None => CloseAction::GiveUp,
        }
    }

    pub const fn attempts(&self) -> u32 {
        self.backoff.attempts()
    }
}

type EventHandler = Box<dyn Fn(ServerEvent)>;

pub struct EventChannel {
    url: String,
    socket: RefCell<Option<WebSocket>>,
    state: RefCell<ChannelState>,
    on_event: EventHandler,
}

impl EventChannel {
    /// Open the channel. `on_event` receives every decoded server event,
    /// including a synthesized `Connect` on each successful open.
    pub fn connect(
        url: String,
        max_attempts: u32,
        on_event: impl Fn(ServerEvent) + 'static,
    ) -> Rc<Self> {
        let channel = Rc::new(Self {
            url,
            socket: RefCell::new(None),
            state: RefCell::new(ChannelState::new(max_attempts)),
            on_event: Box::new(on_event),
        });
        if let Err(e) = channel.open() {
            tracing::error!(url = %channel.url, error = %e, "Event channel open failed");
            let action = channel.state.borrow_mut().retry();
            channel.follow(action);
        }
        channel
    }

    fn open(self: &Rc<Self>) -> Result<(), UiError> {
        let ws = WebSocket::new(&self.url)?;
        tracing::debug!(url = %self.url, "Event channel connecting");

        // ON OPEN
        let weak = Rc::downgrade(self);
        let onopen = Closure::wrap(Box::new(move || {
            if let Some(channel) = weak.upgrade() {
                channel.handle_open();
            }
        }) as Box<dyn FnMut()>);
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        // ON MESSAGE
        let weak = Rc::downgrade(self);
        let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
            let Some(channel) = weak.upgrade() else {
                return;
            };
            match e.data().as_string() {
                Some(text) => channel.handle_frame(&text),
                None => tracing::warn!("Event channel: ignoring non-text frame"),
            }
        }) as Box<dyn FnMut(_)>);
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        // ON ERROR
        let onerror = Closure::wrap(Box::new(move |e: ErrorEvent| {
            tracing::warn!(message = %e.message(), "Event channel error");
        }) as Box<dyn FnMut(_)>);
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        // ON CLOSE
        let weak: Weak<Self> = Rc::downgrade(self);
        let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
            if let Some(channel) = weak.upgrade() {
                channel.handle_close(e.code(), &e.reason());
            }
        }) as Box<dyn FnMut(_)>);
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        *self.socket.borrow_mut() = Some(ws);
        Ok(())
    }

    fn handle_open(&self) {
        let connect = {
            let socket = self.socket.borrow();
            let Some(ws) = socket.as_ref() else {
                return;
            };
            self.state.borrow_mut().opened(ws)
        };
        tracing::debug!(url = %self.url, "Event channel connected");
        (self.on_event)(connect);
    }

    fn handle_frame(&self, text: &str) {
        match decode_server(text) {
            Ok(event) => (self.on_event)(event),
            Err(e) => tracing::warn!(error = %e, frame = %text, "Dropping malformed event frame"),
        }
    }

    fn handle_close(self: &Rc<Self>, code: u16, reason: &str) {
        self.socket.borrow_mut().take();
        let action = self.state.borrow_mut().closed(code);
        if action == CloseAction::Done {
            tracing::info!(code, reason, "Event channel closed");
        } else {
            tracing::warn!(code, reason, "Event channel lost");
        }
        self.follow(action);
    }

    fn follow(self: &Rc<Self>, action: CloseAction) {
        match action {
            CloseAction::Done => {}
            CloseAction::GiveUp => {
                tracing::error!(url = %self.url, "Event channel: giving up after repeated failures");
            }
            CloseAction::Retry { delay_ms } => self.reconnect_in(delay_ms),
        }
    }

    fn reconnect_in(self: &Rc<Self>, delay_ms: u32) {
        let Some(win) = web_sys::window() else {
            return;
        };
        tracing::info!(
            delay_ms,
            attempt = self.state.borrow().attempts(),
            "Event channel reconnecting"
        );

        let weak = Rc::downgrade(self);
        let retry = Closure::once_into_js(move || {
            let Some(channel) = weak.upgrade() else {
                return;
            };
            if let Err(e) = channel.open() {
                tracing::warn!(error = %e, "Event channel reconnect failed");
                let action = channel.state.borrow_mut().retry();
                channel.follow(action);
            }
        });
        #[allow(clippy::cast_possible_wrap)]
        let result = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            retry.unchecked_ref(),
            delay_ms as i32,
        );
        if let Err(e) = result {
            tracing::error!(error = %describe_js(&e), "Could not schedule reconnect");
        }
    }
}

impl Emitter for EventChannel {
    fn emit(&self, event: ClientEvent) {
        let socket = self.socket.borrow();
        self.state.borrow_mut().emit(socket.as_ref(), &event);
    }
}
