//! Rolling effect start/stop controls

use std::rc::Rc;

use lightdeck_protocol::{ClientEvent, RollingRequest};

use crate::channel::Emitter;
use crate::page::{ControlPair, Page, StripSelection};

pub const STRIP_ALERT: &str = "Please select both light strips";

/// Speed used when the slider value does not parse
pub const DEFAULT_SPEED: f64 = 1.0;

pub fn parse_speed(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|speed| speed.is_finite())
        .unwrap_or(DEFAULT_SPEED)
}

/// `None` unless both strips are chosen
pub fn rolling_request(selection: StripSelection, speed: f64) -> Option<RollingRequest> {
    if !selection.is_complete() {
        return None;
    }
    Some(RollingRequest {
        strip1: selection.strip1,
        strip2: selection.strip2,
        speed,
    })
}

pub struct RollingControls<E, P> {
    emitter: Rc<E>,
    page: Rc<P>,
}

impl<E: Emitter, P: Page> RollingControls<E, P> {
    pub const fn new(emitter: Rc<E>, page: Rc<P>) -> Self {
        Self { emitter, page }
    }

    /// Returns `false` when the selection was incomplete and nothing was sent
    pub fn start(&self) -> bool {
        let speed = parse_speed(&self.page.speed_input());
        let Some(request) = rolling_request(self.page.strip_selection(), speed) else {
            self.page.alert(STRIP_ALERT);
            return false;
        };
        tracing::info!(
            strip1 = %request.strip1,
            strip2 = %request.strip2,
            speed = request.speed,
            "Starting rolling effect"
        );
        self.emitter.emit(ClientEvent::StartRolling(request));
        self.page.set_running(ControlPair::Rolling, true);
        true
    }

    pub fn stop(&self) {
        tracing::info!("Stopping rolling effect");
        self.emitter.emit(ClientEvent::StopRolling);
        self.page.set_running(ControlPair::Rolling, false);
    }

    /// Mirror the slider value into its label
    pub fn on_speed_input(&self, value: &str) {
        self.page.set_speed_label(value);
    }
}
