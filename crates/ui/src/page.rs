//! What the controllers need from the page
//!
//! `DomPage` in `dom.rs` is the browser implementation; tests use an
//! in-memory page.

use lightdeck_protocol::Light;

pub const EMPTY_MESSAGE: &str = "No lights found. Make sure your devices are connected.";
pub const ERROR_MESSAGE: &str = "Error loading lights. Check console for details.";

/// A start/stop button pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPair {
    Audio,
    Rolling,
}

impl ControlPair {
    /// (start id, stop id)
    pub const fn button_ids(self) -> (&'static str, &'static str) {
        match self {
            Self::Audio => (crate::dom::START_AUDIO, crate::dom::STOP_AUDIO),
            Self::Rolling => (crate::dom::START_ROLLING, crate::dom::STOP_ROLLING),
        }
    }
}

/// Current values of the two strip dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripSelection {
    pub strip1: String,
    pub strip2: String,
}

impl StripSelection {
    pub fn is_complete(&self) -> bool {
        !self.strip1.is_empty() && !self.strip2.is_empty()
    }
}

/// What the device list area should show
#[derive(Debug, Clone, Copy)]
pub enum LightsView<'a> {
    Loaded(&'a [Light]),
    Empty,
    Failed,
}

pub trait Page {
    /// Replace the list contents; `Loaded` also refills both strip dropdowns
    fn render_lights(&self, view: LightsView<'_>);
    /// `running` disables start and enables stop
    fn set_running(&self, pair: ControlPair, running: bool);
    /// Blocking user notice
    fn alert(&self, message: &str);
    fn strip_selection(&self) -> StripSelection;
    fn speed_input(&self) -> String;
    fn set_speed_label(&self, value: &str);
    fn draw_spectrum(&self, magnitudes: &[u8]);
}

/// How to turn a strip dropdown's current options into the device list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRebuild<'a> {
    /// Indices to remove, highest first so earlier indices stay valid
    pub remove: Vec<u32>,
    /// `(text, value)` to append, in list order
    pub append: Vec<(&'a str, &'a str)>,
    /// Value to select afterwards; empty selects the placeholder
    pub select: String,
}

/// Plan a dropdown rebuild. Options with an empty value are placeholders
/// and stay; the previous choice survives only if that device is still
/// listed.
pub fn rebuild_options<'a>(
    existing: &[String],
    previous: &str,
    lights: &'a [Light],
) -> OptionRebuild<'a> {
    let remove = (0..existing.len())
        .rev()
        .filter(|&i| !existing[i].is_empty())
        .filter_map(|i| u32::try_from(i).ok())
        .collect();
    let append = lights
        .iter()
        .map(|l| (l.name.as_str(), l.id.as_str()))
        .collect();
    let select = if lights.iter().any(|l| l.id == previous) {
        previous.to_string()
    } else {
        String::new()
    };
    OptionRebuild {
        remove,
        append,
        select,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Markup for one device row. The toggle button is picked up by the
/// delegated click handler through its data attributes.
pub fn light_item_html(light: &Light) -> String {
    let id = escape_html(&light.id);
    let status = escape_html(light.status.as_str());
    format!(
        concat!(
            r#"<div class="light-item">"#,
            r#"<div class="light-info">"#,
            r#"<span class="light-name">{name}</span>"#,
            r#"<span class="light-status status-{status}">{badge}</span>"#,
            r#"<div class="light-type">{kind}</div>"#,
            "</div>",
            r#"<div class="light-controls">"#,
            r#"<button class="btn" data-light-id="{id}" data-action="toggle">Toggle</button>"#,
            "</div>",
            "</div>",
        ),
        name = escape_html(&light.name),
        status = status,
        badge = escape_html(&light.status.badge_label()),
        kind = escape_html(light.kind_label()),
        id = id,
    )
}
