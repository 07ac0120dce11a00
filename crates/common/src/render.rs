//! Per-request rendering: gate the request, build the overlay, inject it.

use std::cell::Cell;
use std::rc::Rc;

use error_stack::{Report, ResultExt};
use http::Method;
use lol_html::html_content::{ContentType, EndTag};
use lol_html::{element, EndTagHandler, HtmlRewriter, Settings as RewriterSettings};

use crate::ad_settings::AdSettings;
use crate::assembler::{assemble, RenderPayload};
use crate::assets::lottie_player_tags;
use crate::content::generate;
use crate::device::{classify_request, DeviceClass};
use crate::dismissal::is_dismissed;
use crate::error::FloatAdError;
use crate::gate::evaluate;
use crate::http_wrapper::RequestWrapper;
use crate::settings::Settings;

/// The overlay rendered for one page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOverlay {
    pub device: DeviceClass,
    pub payload: RenderPayload,
    /// Lottie player tags, present only when the player is to be loaded.
    pub player_tags: Option<String>,
}

impl PageOverlay {
    /// Markup, then the player (if any), then the client script.
    pub fn to_html(&self) -> String {
        match &self.player_tags {
            Some(tags) => format!(
                "{}\n{}\n{}",
                self.payload.markup, tags, self.payload.script
            ),
            None => self.payload.to_html(),
        }
    }
}

/// Runs the display pipeline for `req` and returns the overlay to inject,
/// or `None` when nothing is shown.
pub fn render_for_request<T: RequestWrapper>(
    settings: &Settings,
    ad: &AdSettings,
    req: &T,
) -> Option<PageOverlay> {
    let method = req.get_method();
    if method != Method::GET && method != Method::HEAD {
        log::debug!("Skipping floating ad for {} {}", method, req.get_path());
        return None;
    }

    let device = classify_request(req);
    let decision = evaluate(ad, device, is_dismissed(req));
    if !decision.is_display() {
        log::debug!(
            "Floating ad suppressed for {} ({:?})",
            req.get_path(),
            decision
        );
        return None;
    }

    let fragment = generate(ad, &settings.overlay)?;
    let payload = assemble(&fragment, ad.position_x, ad.position_y, &settings.overlay)?;
    let player_tags = lottie_player_tags(&settings.lottie, payload.requires_lottie, device);

    log::info!(
        "Rendering {} floating ad for {} on {}",
        fragment.ad_type,
        device,
        req.get_path()
    );

    Some(PageOverlay {
        device,
        payload,
        player_tags,
    })
}

/// Inserts the overlay at the end of the page body.
///
/// Pages without a `</body>` end tag get the overlay appended to the
/// document.
///
/// # Errors
///
/// Returns an error if the page cannot be rewritten.
pub fn inject_overlay(
    page_html: &str,
    overlay: &PageOverlay,
) -> Result<String, Report<FloatAdError>> {
    let html = overlay.to_html();
    let injected = Rc::new(Cell::new(false));
    let injected_in_body = injected.clone();
    let mut out = Vec::with_capacity(page_html.len() + html.len());

    {
        let mut rewriter = HtmlRewriter::new(
            RewriterSettings {
                element_content_handlers: vec![element!("body", move |el| {
                    // Only an explicit </body> marks the injection point; the
                    // end tag is optional and the fallback below covers its absence.
                    let html = html.clone();
                    let injected = injected_in_body.clone();
                    if let Some(handlers) = el.end_tag_handlers() {
                        let handler: EndTagHandler<'static> =
                            Box::new(move |end: &mut EndTag<'_>| {
                                if !injected.get() {
                                    end.before(&html, ContentType::Html);
                                    injected.set(true);
                                }
                                Ok(())
                            });
                        handlers.push(handler);
                    }
                    Ok(())
                })],
                ..RewriterSettings::default()
            },
            |c: &[u8]| out.extend_from_slice(c),
        );

        rewriter
            .write(page_html.as_bytes())
            .change_context(FloatAdError::Html {
                message: "Failed to rewrite page".to_string(),
            })?;
        rewriter.end().change_context(FloatAdError::Html {
            message: "Failed to finish rewriting page".to_string(),
        })?;
    }

    if !injected.get() {
        log::debug!("Page has no </body>, appending floating ad to the document");
        out.extend_from_slice(overlay.to_html().as_bytes());
    }

    String::from_utf8(out).change_context(FloatAdError::InvalidUtf8 {
        message: "Rewritten page".to_string(),
    })
}
