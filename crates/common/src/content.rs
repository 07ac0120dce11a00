//! Content generation: turns ad settings into an embeddable HTML fragment.
//!
//! Every fragment is a sized link carrying the `ugc nofollow sponsored`
//! relationship. Lottie fragments only declare the animation URL in a
//! `data-path` attribute; playback is started later by the client script.

use error_stack::Report;
use serde_json::json;

use crate::ad_settings::{AdSettings, AdType};
use crate::constants::{AD_LINK_REL, LOTTIE_CONTAINER_CLASS};
use crate::error::FloatAdError;
use crate::settings::Overlay;
use crate::templates::{
    render_template, HTML_FRAGMENT_TEMPLATE, IMAGE_FRAGMENT_TEMPLATE, LOTTIE_FRAGMENT_TEMPLATE,
};

/// The content source selected by the ad type, with its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdContent<'a> {
    Image { src: &'a str },
    DynamicSvg { src: &'a str },
    Lottie { animation_path: &'a str },
    Html { markup: &'a str },
}

impl<'a> AdContent<'a> {
    /// Picks the content for the configured ad type.
    ///
    /// Returns `None` when the selected type has no usable source: an empty
    /// content URL for image, SVG and Lottie ads, or empty HTML for HTML ads.
    pub fn from_settings(settings: &'a AdSettings) -> Option<Self> {
        let url = settings.image_url.as_str();
        let content = match settings.ad_type {
            AdType::Image => AdContent::Image { src: url },
            AdType::DynamicSvg => AdContent::DynamicSvg { src: url },
            AdType::Lottie => AdContent::Lottie {
                animation_path: url,
            },
            AdType::Html => AdContent::Html {
                markup: settings.html_content.as_str(),
            },
        };
        content.has_source().then_some(content)
    }

    fn has_source(&self) -> bool {
        match self {
            AdContent::Image { src } | AdContent::DynamicSvg { src } => !src.is_empty(),
            AdContent::Lottie { animation_path } => !animation_path.is_empty(),
            AdContent::Html { markup } => !markup.trim().is_empty(),
        }
    }

    pub fn ad_type(&self) -> AdType {
        match self {
            AdContent::Image { .. } => AdType::Image,
            AdContent::DynamicSvg { .. } => AdType::DynamicSvg,
            AdContent::Lottie { .. } => AdType::Lottie,
            AdContent::Html { .. } => AdType::Html,
        }
    }
}

/// A rendered content fragment, ready to be placed inside the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFragment {
    pub ad_type: AdType,
    pub html: String,
}

impl ContentFragment {
    /// Whether the fragment needs the Lottie player to animate.
    pub fn requires_lottie(&self) -> bool {
        self.ad_type == AdType::Lottie
    }
}

fn link_href(settings: &AdSettings) -> &str {
    if settings.link_url.is_empty() {
        "#"
    } else {
        &settings.link_url
    }
}

fn render_content(
    content: AdContent<'_>,
    settings: &AdSettings,
    overlay: &Overlay,
) -> Result<String, Report<FloatAdError>> {
    let href = link_href(settings);
    let (width, height) = (settings.ad_width, settings.ad_height);

    match content {
        AdContent::Image { src } | AdContent::DynamicSvg { src } => render_template(
            IMAGE_FRAGMENT_TEMPLATE,
            &json!({
                "href": href,
                "rel": AD_LINK_REL,
                "src": src,
                "alt": overlay.alt_text,
                "width": width,
                "height": height,
            }),
        ),
        AdContent::Lottie { animation_path } => render_template(
            LOTTIE_FRAGMENT_TEMPLATE,
            &json!({
                "href": href,
                "rel": AD_LINK_REL,
                "lottie_class": LOTTIE_CONTAINER_CLASS,
                "path": animation_path,
                "width": width,
                "height": height,
            }),
        ),
        // Markup went through the HTML filter when the settings were sanitized.
        AdContent::Html { markup } => render_template(
            HTML_FRAGMENT_TEMPLATE,
            &json!({
                "href": href,
                "rel": AD_LINK_REL,
                "html": markup,
                "width": width,
                "height": height,
            }),
        ),
    }
}

/// Builds the content fragment for `settings`, or `None` when there is
/// nothing to show.
pub fn generate(settings: &AdSettings, overlay: &Overlay) -> Option<ContentFragment> {
    let Some(content) = AdContent::from_settings(settings) else {
        log::debug!("No content source for {} ad, nothing to render", settings.ad_type);
        return None;
    };

    match render_content(content, settings, overlay) {
        Ok(html) => Some(ContentFragment {
            ad_type: content.ad_type(),
            html,
        }),
        Err(e) => {
            log::error!("Failed to render {} ad content: {:?}", settings.ad_type, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tests::{image_ad_settings, lottie_ad_settings};

    #[test]
    fn test_image_fragment() {
        let settings = image_ad_settings();
        let fragment = generate(&settings, &Overlay::default()).expect("image fragment");

        assert_eq!(fragment.ad_type, AdType::Image);
        assert_eq!(
            fragment.html,
            r#"<a href="https://x" rel="ugc nofollow sponsored"><img src="https://x/a.png" alt="Floating advertisement" style="width: 150px; height: 150px;" /></a>"#
        );
        assert!(!fragment.requires_lottie());
    }

    #[test]
    fn test_dynamic_svg_uses_image_markup() {
        let settings = AdSettings {
            ad_type: AdType::DynamicSvg,
            image_url: "https://x/banner.svg".to_string(),
            ad_width: 300,
            ad_height: 100,
            ..image_ad_settings()
        };
        let fragment = generate(&settings, &Overlay::default()).expect("svg fragment");
        assert_eq!(fragment.ad_type, AdType::DynamicSvg);
        assert!(fragment.html.contains(r#"<img src="https://x/banner.svg""#));
        assert!(fragment.html.contains("width: 300px; height: 100px;"));
        assert!(fragment.html.contains(r#"rel="ugc nofollow sponsored""#));
    }

    #[test]
    fn test_lottie_fragment_declares_path_without_script() {
        let settings = lottie_ad_settings();
        let fragment = generate(&settings, &Overlay::default()).expect("lottie fragment");

        assert!(fragment.requires_lottie());
        assert!(fragment
            .html
            .contains(r#"<div class="lottie-animation" data-path="https://x/anim.json""#));
        assert!(fragment
            .html
            .contains(r#"style="display: block; width: 150px; height: 150px;""#));
        assert!(!fragment.html.contains("<script"));
    }

    #[test]
    fn test_html_fragment_wraps_markup() {
        let settings = AdSettings {
            ad_type: AdType::Html,
            image_url: String::new(),
            html_content: "<p>Big <strong>sale</strong></p>".to_string(),
            ..image_ad_settings()
        };
        let fragment = generate(&settings, &Overlay::default()).expect("html fragment");
        assert_eq!(
            fragment.html,
            r#"<a href="https://x" rel="ugc nofollow sponsored" style="display: block; width: 150px; height: 150px;"><p>Big <strong>sale</strong></p></a>"#
        );
    }

    #[test]
    fn test_html_ad_ignores_image_url() {
        let settings = AdSettings {
            ad_type: AdType::Html,
            html_content: "<p>x</p>".to_string(),
            ..image_ad_settings()
        };
        let fragment = generate(&settings, &Overlay::default()).expect("html fragment");
        assert_eq!(fragment.ad_type, AdType::Html);
        assert!(!fragment.html.contains("<img"));
    }

    #[test]
    fn test_empty_sources_generate_nothing() {
        let empty_html = AdSettings {
            ad_type: AdType::Html,
            html_content: String::new(),
            ..image_ad_settings()
        };
        assert_eq!(generate(&empty_html, &Overlay::default()), None);

        let empty_image = AdSettings {
            image_url: String::new(),
            ..image_ad_settings()
        };
        assert_eq!(generate(&empty_image, &Overlay::default()), None);

        let empty_lottie = AdSettings {
            image_url: String::new(),
            ..lottie_ad_settings()
        };
        assert_eq!(generate(&empty_lottie, &Overlay::default()), None);
    }

    #[test]
    fn test_missing_link_renders_hash() {
        let settings = AdSettings {
            link_url: String::new(),
            ..image_ad_settings()
        };
        let fragment = generate(&settings, &Overlay::default()).expect("fragment");
        assert!(fragment.html.starts_with(r##"<a href="#""##));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let settings = AdSettings {
            link_url: "https://x/?a=1&b=2".to_string(),
            ..image_ad_settings()
        };
        let overlay = Overlay {
            alt_text: "Tom \"&\" Jerry".to_string(),
            ..Overlay::default()
        };
        let fragment = generate(&settings, &overlay).expect("fragment");
        assert!(fragment.html.contains("&amp;b"));
        assert!(fragment.html.contains("Tom &quot;&amp;&quot; Jerry"));
    }

    #[test]
    fn test_ad_content_from_settings() {
        let settings = lottie_ad_settings();
        assert_eq!(
            AdContent::from_settings(&settings),
            Some(AdContent::Lottie {
                animation_path: "https://x/anim.json"
            })
        );
    }
}
