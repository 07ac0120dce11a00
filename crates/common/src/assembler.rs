//! Wraps a content fragment into the positioned, dismissible overlay.

use error_stack::Report;
use serde_json::json;

use crate::ad_settings::EdgeRule;
use crate::constants::{CLOSE_BUTTON_ID, CONTAINER_ID, CONTENT_ID, LOTTIE_CONTAINER_CLASS};
use crate::content::ContentFragment;
use crate::dismissal::DismissalContract;
use crate::error::FloatAdError;
use crate::settings::Overlay;
use crate::templates::{render_template, CLIENT_SCRIPT_TEMPLATE, CONTAINER_TEMPLATE};

/// Everything the page needs to show the overlay for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPayload {
    /// The fixed-position container with close button and content.
    pub markup: String,
    /// Close handling and, for Lottie ads, animation start-up.
    pub script: String,
    /// Whether the content needs the Lottie player to animate.
    pub requires_lottie: bool,
    pub dismissal: DismissalContract,
}

impl RenderPayload {
    /// Markup followed by its script, ready to be placed before `</body>`.
    pub fn to_html(&self) -> String {
        format!("{}\n{}", self.markup, self.script)
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn render_payload(
    fragment: &ContentFragment,
    position_x: EdgeRule,
    position_y: EdgeRule,
    overlay: &Overlay,
    dismissal: DismissalContract,
) -> Result<RenderPayload, Report<FloatAdError>> {
    let markup = render_template(
        CONTAINER_TEMPLATE,
        &json!({
            "container_id": CONTAINER_ID,
            "close_id": CLOSE_BUTTON_ID,
            "content_id": CONTENT_ID,
            "z_index": overlay.z_index,
            "position_x": position_x.to_string(),
            "position_y": position_y.to_string(),
            "close_label": overlay.close_label,
            "content": fragment.html,
        }),
    )?;

    let script = render_template(
        CLIENT_SCRIPT_TEMPLATE,
        &json!({
            "container_id": js_string(CONTAINER_ID),
            "close_id": js_string(CLOSE_BUTTON_ID),
            "lottie_class": js_string(LOTTIE_CONTAINER_CLASS),
            "cookie_name": js_string(dismissal.cookie_name),
            "cookie_value": js_string(dismissal.cookie_value),
            "cookie_path": js_string(dismissal.path),
            "ttl_ms": dismissal.ttl_millis(),
            "lottie": fragment.requires_lottie(),
        }),
    )?;

    Ok(RenderPayload {
        markup,
        script,
        requires_lottie: fragment.requires_lottie(),
        dismissal,
    })
}

/// Assembles the overlay around `fragment`, pinned by the two edge rules.
///
/// Returns `None` if the templates fail to render; the overlay is then simply
/// not shown.
pub fn assemble(
    fragment: &ContentFragment,
    position_x: EdgeRule,
    position_y: EdgeRule,
    overlay: &Overlay,
) -> Option<RenderPayload> {
    match render_payload(
        fragment,
        position_x,
        position_y,
        overlay,
        DismissalContract::default(),
    ) {
        Ok(payload) => Some(payload),
        Err(e) => {
            log::error!("Failed to assemble floating ad overlay: {:?}", e);
            None
        }
    }
}
