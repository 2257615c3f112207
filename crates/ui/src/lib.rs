//! Lightdeck browser front-end
//!
//! Lists and toggles lights over the REST API, streams the microphone's
//! dominant frequency over the event channel, and drives the rolling
//! effect controls.

pub mod api;
pub mod app;
pub mod audio;
pub mod channel;
pub mod config;
pub mod dom;
pub mod error;
pub mod lights;
pub mod listener;
pub mod logging;
pub mod page;
pub mod rolling;
pub mod visualizer;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use crate::app::App;
pub use crate::config::UiConfig;
pub use crate::error::UiError;

/// `document.readyState` before `DOMContentLoaded` has fired
fn still_loading(ready_state: &str) -> bool {
    ready_state == "loading"
}

fn start() -> Result<(), UiError> {
    let config = UiConfig::from_window();
    tracing::debug!(?config, "UI config");
    App::mount(&config)?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);

    let document = dom::get_document()?;
    if still_loading(&document.ready_state()) {
        let on_ready = Closure::once_into_js(move || {
            if let Err(e) = start() {
                tracing::error!(error = %e, "Lightdeck UI failed to start");
            }
        });
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    } else {
        start()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_loading() {
        assert!(still_loading("loading"));
        assert!(!still_loading("interactive"));
        assert!(!still_loading("complete"));
    }
}
