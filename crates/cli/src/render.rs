//! Device classification and overlay rendering for a simulated request.

use std::fs;
use std::path::Path;

use floatad_common::ad_settings::AdSettings;
use floatad_common::device::classify_user_agent;
use floatad_common::render::{inject_overlay, render_for_request};
use floatad_common::settings::Settings;
use http::{header, Method, Request};

use crate::error::CliError;

/// A page request as seen by the overlay pipeline.
pub struct SimulatedRequest<'a> {
    pub user_agent: &'a str,
    pub cookie: Option<&'a str>,
    pub path: &'a str,
    pub method: Method,
}

impl SimulatedRequest<'_> {
    fn build(&self) -> Result<Request<()>, CliError> {
        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(self.path)
            .header(header::USER_AGENT, self.user_agent);
        if let Some(cookie) = self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
            .body(())
            .map_err(|e| CliError::Input(format!("Invalid request: {e}")))
    }
}

pub fn classify(user_agent: &str) -> String {
    classify_user_agent(user_agent).to_string()
}

/// Renders the overlay for `request`, optionally injected into a page file.
///
/// Without a page, returns `None` when the overlay is not shown. With a
/// page, the page is returned unchanged in that case.
pub fn render(
    settings: &Settings,
    ad: &AdSettings,
    request: &SimulatedRequest<'_>,
    page: Option<&Path>,
) -> Result<Option<String>, CliError> {
    let req = request.build()?;
    let overlay = render_for_request(settings, ad, &req);
    if overlay.is_none() {
        log::info!("Floating ad not shown for this request");
    }

    match (page, overlay) {
        (Some(page), Some(overlay)) => {
            let page_html = fs::read_to_string(page)?;
            let html = inject_overlay(&page_html, &overlay)
                .map_err(|e| CliError::Render(format!("{e:?}")))?;
            Ok(Some(html))
        }
        (Some(page), None) => Ok(Some(fs::read_to_string(page)?)),
        (None, overlay) => Ok(overlay.map(|overlay| overlay.to_html())),
    }
}
