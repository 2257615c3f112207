use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::audio::spectrum::{bars, Rgb};
use crate::error::UiError;

/// Bar chart of the analyser output on `#frequency-canvas`
pub struct SpectrumCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    // Neighbouring bins usually share a color
    cached_color: RefCell<Option<(Rgb, String)>>,
}

impl SpectrumCanvas {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, UiError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| UiError::Js("2d canvas context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| UiError::Js("2d canvas context unavailable".into()))?;
        Ok(Self {
            canvas,
            ctx,
            cached_color: RefCell::new(None),
        })
    }

    #[allow(deprecated)] // web-sys set_fill_style deprecation is overzealous
    pub fn draw(&self, magnitudes: &[u8]) {
        let width = f64::from(self.canvas.width());
        let height = f64::from(self.canvas.height());
        self.ctx.clear_rect(0.0, 0.0, width, height);

        for bar in bars(magnitudes, width, height) {
            let css = self.css_for(bar.color);
            self.ctx.set_fill_style(&css.into());
            self.ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);
        }
    }

    fn css_for(&self, color: Rgb) -> String {
        let mut cache = self.cached_color.borrow_mut();
        match &*cache {
            Some((cached, css)) if *cached == color => css.clone(),
            _ => {
                let css = color.css();
                *cache = Some((color, css.clone()));
                css
            }
        }
    }
}
