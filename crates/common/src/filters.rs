//! URL and HTML filters applied to untrusted settings values.
//!
//! Both filters are idempotent: running a filtered value through the same
//! filter again returns it unchanged.
//!
//! - [`sanitize_url`] keeps http(s)/ftp/mailto/tel and relative URLs, strips
//!   characters outside the URL-safe set and rejects every other scheme.
//! - [`sanitize_html`] keeps a rich-text whitelist, removes script vectors
//!   together with their content, drops event handlers and comments, and
//!   unwraps anchors so that ad content never carries its own links.

use error_stack::{Report, ResultExt};
use lol_html::{doc_comments, element, HtmlRewriter, Settings as HtmlSettings};
use url::Url;

use crate::error::FloatAdError;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto", "tel"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Elements dropped together with everything inside them.
///
/// `xmp`, `noembed`, `noframes` and `plaintext` are parsed as raw text, so
/// tags inside them never reach the element handler and must not be unwrapped.
const REMOVED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "form",
    "input", "button", "select", "option", "textarea", "template", "noscript", "link", "meta",
    "base", "svg", "math", "title", "head", "xmp", "noembed", "noframes", "plaintext", "listing",
];

/// Elements kept as-is. Anything not listed here or in [`REMOVED_ELEMENTS`]
/// is unwrapped: the tag goes, its content stays.
const ALLOWED_ELEMENTS: &[&str] = &[
    "p", "br", "span", "div", "strong", "b", "em", "i", "u", "s", "small", "mark", "sub", "sup",
    "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd", "blockquote",
    "code", "pre", "hr", "img", "figure", "figcaption", "table", "thead", "tbody", "tfoot", "tr",
    "th", "td", "caption", "abbr", "cite", "q", "del", "ins", "center", "font", "address",
    "section", "article", "header", "footer",
];

const ALLOWED_ATTRIBUTES: &[&str] = &[
    "class", "id", "style", "title", "lang", "dir", "role", "alt", "width", "height", "align",
    "colspan", "rowspan", "color", "size", "face", "loading",
];

const URL_ATTRIBUTES: &[&str] = &["src", "cite"];

const UNSAFE_STYLE_MARKERS: &[&str] = &["expression", "javascript:", "behavior", "url("];

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c) || !c.is_ascii()
}

/// Returns the scheme of `url` if it has one (`scheme:` before any `/?#`).
fn scheme_of(url: &str) -> Option<&str> {
    let end = url.find([':', '/', '?', '#'])?;
    if !url[end..].starts_with(':') {
        return None;
    }
    let scheme = &url[..end];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(scheme)
    } else {
        None
    }
}

/// Filters a URL for use in an `href`/`src` attribute.
///
/// Returns an empty string when nothing usable remains.
pub fn sanitize_url(input: &str) -> String {
    let filtered: String = input.trim().chars().filter(|c| is_url_char(*c)).collect();
    if filtered.is_empty() {
        return String::new();
    }

    match scheme_of(&filtered) {
        Some(scheme) => {
            let scheme = scheme.to_ascii_lowercase();
            if ALLOWED_SCHEMES.contains(&scheme.as_str()) && Url::parse(&filtered).is_ok() {
                filtered
            } else {
                log::debug!("Rejected URL with scheme '{}': {:?}", scheme, input);
                String::new()
            }
        }
        None if filtered.starts_with(['/', '#', '?']) => filtered,
        None => {
            let candidate = format!("http://{filtered}");
            if Url::parse(&candidate).is_ok() {
                candidate
            } else {
                log::debug!("Rejected unparsable URL: {:?}", input);
                String::new()
            }
        }
    }
}

/// Lower-cased extension of the last path segment, ignoring query and fragment.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let segment = path.rsplit('/').next().unwrap_or("");
    let (_, ext) = segment.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Whether `url` points at an image format the overlay can display.
pub fn is_valid_image_url(url: &str) -> bool {
    url_extension(url).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `url` points at a Lottie JSON document.
pub fn is_valid_lottie_url(url: &str) -> bool {
    url_extension(url).is_some_and(|ext| ext == "json")
}

enum AttributeAction {
    Keep,
    Remove,
    Replace(String),
}

fn filter_attribute(name: &str, value: &str) -> AttributeAction {
    if name.starts_with("aria-") {
        return AttributeAction::Keep;
    }

    if URL_ATTRIBUTES.contains(&name) {
        let filtered = sanitize_url(value);
        return if filtered.is_empty() {
            AttributeAction::Remove
        } else if filtered == value {
            AttributeAction::Keep
        } else {
            AttributeAction::Replace(filtered)
        };
    }

    if name == "style" {
        let compact: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if UNSAFE_STYLE_MARKERS.iter().any(|m| compact.contains(m)) {
            return AttributeAction::Remove;
        }
        return AttributeAction::Keep;
    }

    if ALLOWED_ATTRIBUTES.contains(&name) {
        AttributeAction::Keep
    } else {
        AttributeAction::Remove
    }
}

fn rewrite_html(input: &str) -> Result<String, Report<FloatAdError>> {
    let mut out = Vec::with_capacity(input.len());
    let mut rewriter = HtmlRewriter::new(
        HtmlSettings {
            element_content_handlers: vec![element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();
                if REMOVED_ELEMENTS.contains(&tag.as_str()) {
                    el.remove();
                    return Ok(());
                }
                if !ALLOWED_ELEMENTS.contains(&tag.as_str()) {
                    el.remove_and_keep_content();
                    return Ok(());
                }

                let names: Vec<String> = el.attributes().iter().map(|a| a.name()).collect();
                for name in names {
                    let value = el.get_attribute(&name).unwrap_or_default();
                    match filter_attribute(&name, &value) {
                        AttributeAction::Keep => {}
                        AttributeAction::Remove => el.remove_attribute(&name),
                        AttributeAction::Replace(filtered) => el.set_attribute(&name, &filtered)?,
                    }
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_comments!(|comment| {
                comment.remove();
                Ok(())
            })],
            ..HtmlSettings::default()
        },
        |c: &[u8]| out.extend_from_slice(c),
    );

    rewriter
        .write(input.as_bytes())
        .change_context(FloatAdError::Html {
            message: "Failed to filter HTML content".to_string(),
        })?;
    rewriter.end().change_context(FloatAdError::Html {
        message: "Failed to finish filtering HTML content".to_string(),
    })?;

    String::from_utf8(out).change_context(FloatAdError::InvalidUtf8 {
        message: "Filtered HTML content".to_string(),
    })
}

/// Filters an HTML snippet down to safe rich text.
///
/// Content that cannot be parsed is discarded rather than passed through.
pub fn sanitize_html(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    match rewrite_html(input) {
        Ok(filtered) => filtered,
        Err(e) => {
            log::warn!("Discarding HTML content that could not be filtered: {:?}", e);
            String::new()
        }
    }
}
