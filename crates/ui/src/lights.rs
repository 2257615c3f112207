//! Device list loading and light control

use std::rc::Rc;

use lightdeck_protocol::ControlAction;

use crate::api::LightsApi;
use crate::page::{LightsView, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Empty,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Accepted by the host; the list was reloaded
    Applied(LoadOutcome),
    Rejected,
    Failed,
}

pub struct LightsPanel<A, P> {
    api: A,
    page: Rc<P>,
}

impl<A: LightsApi, P: Page> LightsPanel<A, P> {
    pub const fn new(api: A, page: Rc<P>) -> Self {
        Self { api, page }
    }

    /// Fetch the device list once and render it. Errors end up on the page
    /// and in the log, never with the caller.
    pub async fn load(&self) -> LoadOutcome {
        match self.api.list_lights().await {
            Ok(lights) if lights.is_empty() => {
                self.page.render_lights(LightsView::Empty);
                LoadOutcome::Empty
            }
            Ok(lights) => {
                tracing::debug!(count = lights.len(), "Lights loaded");
                self.page.render_lights(LightsView::Loaded(&lights));
                LoadOutcome::Loaded(lights.len())
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading lights");
                self.page.render_lights(LightsView::Failed);
                LoadOutcome::Failed
            }
        }
    }

    /// Send `action` for `id`; reload only if the host reports success
    pub async fn control(&self, id: &str, action: ControlAction) -> ControlOutcome {
        match self.api.control(id, action).await {
            Ok(resp) if resp.is_success() => ControlOutcome::Applied(self.load().await),
            Ok(resp) => {
                tracing::warn!(
                    light = id,
                    %action,
                    status = %resp.status,
                    message = resp.message.as_deref().unwrap_or(""),
                    "Light control rejected"
                );
                ControlOutcome::Rejected
            }
            Err(e) => {
                tracing::error!(light = id, %action, error = %e, "Error controlling light");
                ControlOutcome::Failed
            }
        }
    }
}
