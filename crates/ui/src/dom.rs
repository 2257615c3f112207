use wasm_bindgen::JsCast;
use web_sys::{
    window, Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlOptionElement, HtmlSelectElement,
};

use lightdeck_protocol::Light;

use crate::error::{describe_js, UiError};
use crate::page::{
    light_item_html, rebuild_options, ControlPair, LightsView, Page, StripSelection,
    EMPTY_MESSAGE, ERROR_MESSAGE,
};
use crate::visualizer::SpectrumCanvas;

pub const LIGHTS_CONTAINER: &str = "lights-container";
pub const STRIP1: &str = "strip1";
pub const STRIP2: &str = "strip2";
pub const START_AUDIO: &str = "start-audio";
pub const STOP_AUDIO: &str = "stop-audio";
pub const FREQUENCY_CANVAS: &str = "frequency-canvas";
pub const SPEED: &str = "speed";
pub const SPEED_VALUE: &str = "speed-value";
pub const START_ROLLING: &str = "start-rolling";
pub const STOP_ROLLING: &str = "stop-rolling";

/// Get document helper
pub fn get_document() -> Result<Document, UiError> {
    window().and_then(|w| w.document()).ok_or(UiError::NoWindow)
}

/// Look up `#id` as a concrete element type
pub fn element<T: JsCast>(doc: &Document, id: &str) -> Result<T, UiError> {
    doc.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| UiError::MissingElement(id.to_string()))
}

/// The page as served by the host
pub struct DomPage {
    lights: HtmlElement,
    strip1: HtmlSelectElement,
    strip2: HtmlSelectElement,
    start_audio: HtmlButtonElement,
    stop_audio: HtmlButtonElement,
    start_rolling: HtmlButtonElement,
    stop_rolling: HtmlButtonElement,
    speed: HtmlInputElement,
    speed_value: HtmlElement,
    spectrum: SpectrumCanvas,
}

impl DomPage {
    /// Resolve every element the controllers touch
    pub fn from_document(doc: &Document) -> Result<Self, UiError> {
        let canvas: HtmlCanvasElement = element(doc, FREQUENCY_CANVAS)?;
        Ok(Self {
            lights: element(doc, LIGHTS_CONTAINER)?,
            strip1: element(doc, STRIP1)?,
            strip2: element(doc, STRIP2)?,
            start_audio: element(doc, START_AUDIO)?,
            stop_audio: element(doc, STOP_AUDIO)?,
            start_rolling: element(doc, START_ROLLING)?,
            stop_rolling: element(doc, STOP_ROLLING)?,
            speed: element(doc, SPEED)?,
            speed_value: element(doc, SPEED_VALUE)?,
            spectrum: SpectrumCanvas::new(canvas)?,
        })
    }

    pub const fn lights_container(&self) -> &HtmlElement {
        &self.lights
    }

    pub const fn speed_slider(&self) -> &HtmlInputElement {
        &self.speed
    }

    fn fill_strips(&self, lights: &[Light]) {
        for select in [&self.strip1, &self.strip2] {
            if let Err(e) = fill_device_options(select, lights) {
                tracing::warn!(select = %select.id(), error = %e, "Could not fill strip options");
            }
        }
    }

    pub fn button(&self, id: &str) -> Option<&HtmlButtonElement> {
        match id {
            START_AUDIO => Some(&self.start_audio),
            STOP_AUDIO => Some(&self.stop_audio),
            START_ROLLING => Some(&self.start_rolling),
            STOP_ROLLING => Some(&self.stop_rolling),
            _ => None,
        }
    }
}

fn option_values(select: &HtmlSelectElement) -> Vec<String> {
    (0..select.length())
        .map(|index| {
            select
                .item(index)
                .and_then(|el| el.dyn_into::<HtmlOptionElement>().ok())
                .map(|opt| opt.value())
                .unwrap_or_default()
        })
        .collect()
}

/// Replace the device options with `lights`, keeping the placeholder
fn fill_device_options(select: &HtmlSelectElement, lights: &[Light]) -> Result<(), UiError> {
    let plan = rebuild_options(&option_values(select), &select.value(), lights);
    for index in plan.remove {
        #[allow(clippy::cast_possible_wrap)]
        select.remove_with_index(index as i32);
    }
    for (text, value) in plan.append {
        let option = HtmlOptionElement::new_with_text_and_value(text, value)?;
        select.append_child(&option)?;
    }
    select.set_value(&plan.select);
    Ok(())
}

impl Page for DomPage {
    fn render_lights(&self, view: LightsView<'_>) {
        match view {
            LightsView::Loaded(lights) => {
                let items: String = lights.iter().map(light_item_html).collect();
                self.lights.set_inner_html(&items);
                self.fill_strips(lights);
            }
            LightsView::Empty => {
                self.lights
                    .set_inner_html(&format!(r#"<p class="placeholder">{EMPTY_MESSAGE}</p>"#));
                self.fill_strips(&[]);
            }
            LightsView::Failed => {
                self.lights.set_inner_html(&format!(
                    r#"<p class="placeholder error">{ERROR_MESSAGE}</p>"#
                ));
            }
        }
    }

    fn set_running(&self, pair: ControlPair, running: bool) {
        let (start, stop) = pair.button_ids();
        if let Some(button) = self.button(start) {
            button.set_disabled(running);
        }
        if let Some(button) = self.button(stop) {
            button.set_disabled(!running);
        }
    }

    fn alert(&self, message: &str) {
        if let Some(win) = window() {
            if let Err(e) = win.alert_with_message(message) {
                tracing::warn!(error = %describe_js(&e), "alert failed");
            }
        }
    }

    fn strip_selection(&self) -> StripSelection {
        StripSelection {
            strip1: self.strip1.value(),
            strip2: self.strip2.value(),
        }
    }

    fn speed_input(&self) -> String {
        self.speed.value()
    }

    fn set_speed_label(&self, value: &str) {
        self.speed_value.set_text_content(Some(value));
    }

    fn draw_spectrum(&self, magnitudes: &[u8]) {
        self.spectrum.draw(magnitudes);
    }
}
