//! Page wiring: builds the controllers and binds them to DOM events

use std::rc::Rc;

use lightdeck_protocol::ControlAction;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, EventTarget};

use crate::api::FetchApi;
use crate::audio::{AudioCapture, Microphone, RafScheduler, StartOutcome};
use crate::channel::EventChannel;
use crate::config::UiConfig;
use crate::dom::{get_document, DomPage, START_AUDIO, START_ROLLING, STOP_AUDIO, STOP_ROLLING};
use crate::error::UiError;
use crate::lights::LightsPanel;
use crate::listener::handle_server_event;
use crate::page::{ControlPair, Page};
use crate::rolling::RollingControls;

type Capture = AudioCapture<Microphone, EventChannel, DomPage, RafScheduler>;

pub struct App {
    page: Rc<DomPage>,
    panel: Rc<LightsPanel<FetchApi, DomPage>>,
    capture: Rc<Capture>,
    rolling: Rc<RollingControls<EventChannel, DomPage>>,
}

/// Toggle target from a clicked control's data attributes
pub fn control_target(
    light_id: Option<String>,
    action: Option<String>,
) -> Option<(String, ControlAction)> {
    let light_id = light_id.filter(|id| !id.is_empty())?;
    let action = action?.parse().ok()?;
    Some((light_id, action))
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), UiError> {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

impl App {
    pub fn mount(config: &UiConfig) -> Result<Rc<Self>, UiError> {
        let doc = get_document()?;
        let page = Rc::new(DomPage::from_document(&doc)?);

        let url = config.current_channel_url()?;
        let channel = EventChannel::connect(url, config.reconnect_max_attempts, |event| {
            handle_server_event(&event);
        });

        let panel = Rc::new(LightsPanel::new(FetchApi::new(config.clone()), page.clone()));
        let capture = Rc::new(AudioCapture::new(
            Microphone {
                fft_size: config.effective_fft_size(),
            },
            channel.clone(),
            page.clone(),
            RafScheduler,
        ));
        let rolling = Rc::new(RollingControls::new(channel.clone(), page.clone()));

        let app = Rc::new(Self {
            page,
            panel,
            capture,
            rolling,
        });
        app.bind()?;
        app.reset_controls();
        app.reload();
        tracing::info!("Lightdeck UI mounted");
        Ok(app)
    }

    /// Fetch the device list in the background
    pub fn reload(&self) {
        let panel = self.panel.clone();
        spawn_local(async move {
            panel.load().await;
        });
    }

    fn reset_controls(&self) {
        self.page.set_running(ControlPair::Audio, false);
        self.page.set_running(ControlPair::Rolling, false);
        self.page.set_speed_label(&self.page.speed_input());
    }

    fn button(&self, id: &str) -> Result<&EventTarget, UiError> {
        self.page
            .button(id)
            .map(|button| -> &EventTarget { button })
            .ok_or_else(|| UiError::MissingElement(id.to_string()))
    }

    fn bind(&self) -> Result<(), UiError> {
        // Toggle buttons are re-rendered on every load, so listen on the container
        let panel = self.panel.clone();
        listen(self.page.lights_container(), "click", move |e: Event| {
            let Some(control) = e
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[data-action]").ok().flatten())
            else {
                return;
            };
            let Some((id, action)) = control_target(
                control.get_attribute("data-light-id"),
                control.get_attribute("data-action"),
            ) else {
                tracing::warn!("Ignoring click on control without light id or action");
                return;
            };
            let panel = panel.clone();
            spawn_local(async move {
                panel.control(&id, action).await;
            });
        })?;

        let capture = self.capture.clone();
        listen(self.button(START_AUDIO)?, "click", move |_| {
            let capture = capture.clone();
            spawn_local(async move {
                if capture.start().await == StartOutcome::AlreadyActive {
                    tracing::debug!("Start ignored, capture already active");
                }
            });
        })?;

        let capture = self.capture.clone();
        listen(self.button(STOP_AUDIO)?, "click", move |_| capture.stop())?;

        let rolling = self.rolling.clone();
        listen(self.button(START_ROLLING)?, "click", move |_| {
            rolling.start();
        })?;

        let rolling = self.rolling.clone();
        listen(self.button(STOP_ROLLING)?, "click", move |_| rolling.stop())?;

        let rolling = self.rolling.clone();
        let page = self.page.clone();
        listen(self.page.speed_slider(), "input", move |_| {
            rolling.on_speed_input(&page.speed_input());
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_control_target() {
        assert_eq!(
            control_target(some("strip-1"), some("toggle")),
            Some(("strip-1".to_string(), ControlAction::Toggle))
        );
    }

    #[test]
    fn test_control_target_rejects_incomplete() {
        assert_eq!(control_target(None, some("toggle")), None);
        assert_eq!(control_target(some(""), some("toggle")), None);
        assert_eq!(control_target(some("strip-1"), None), None);
        assert_eq!(control_target(some("strip-1"), some("explode")), None);
    }
}
