//! Canonical floating ad settings and the sanitizer that produces them.
//!
//! The settings store hands back an untyped key-value map. [`sanitize`] turns
//! any such map into an [`AdSettings`] value that upholds every invariant the
//! rest of the pipeline relies on. It never fails: invalid or missing fields
//! fall back to their defaults, and each fallback is logged at debug level.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_AD_HEIGHT, DEFAULT_AD_WIDTH, MAX_AD_DIMENSION, MIN_AD_DIMENSION};
use crate::device::DeviceClass;
use crate::filters::{is_valid_image_url, is_valid_lottie_url, sanitize_html, sanitize_url};

/// Untyped settings record as read from a store.
pub type RawSettings = Map<String, Value>;

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_DISPLAY_DEVICES: &str = "display_devices";
pub const KEY_AD_TYPE: &str = "ad_type";
pub const KEY_IMAGE_URL: &str = "image_url";
pub const KEY_HTML_CONTENT: &str = "html_content";
pub const KEY_LINK_URL: &str = "link_url";
pub const KEY_AD_WIDTH: &str = "ad_width";
pub const KEY_AD_HEIGHT: &str = "ad_height";
pub const KEY_POSITION_X: &str = "position_x";
pub const KEY_POSITION_Y: &str = "position_y";

static EDGE_RULE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(left|right|top|bottom):\s*(\d+)px;?$").expect("edge rule pattern is valid")
});

/// Kind of content the overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    #[default]
    Image,
    DynamicSvg,
    Lottie,
    Html,
}

impl AdType {
    pub const ALL: [AdType; 4] = [AdType::Image, AdType::DynamicSvg, AdType::Lottie, AdType::Html];

    pub fn as_str(self) -> &'static str {
        match self {
            AdType::Image => "image",
            AdType::DynamicSvg => "dynamic_svg",
            AdType::Lottie => "lottie",
            AdType::Html => "html",
        }
    }

    /// Parses an exact type name.
    pub fn from_name(name: &str) -> Option<Self> {
        AdType::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Viewport edge a position rule is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Edge::Left),
            "right" => Some(Edge::Right),
            "top" => Some(Edge::Top),
            "bottom" => Some(Edge::Bottom),
            _ => None,
        }
    }
}

/// Positioning axis; each axis only accepts its own two edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn allows(self, edge: Edge) -> bool {
        match self {
            Axis::Horizontal => matches!(edge, Edge::Left | Edge::Right),
            Axis::Vertical => matches!(edge, Edge::Top | Edge::Bottom),
        }
    }

    /// `right: 15px;` horizontally, `bottom: 15px;` vertically.
    pub fn default_rule(self) -> EdgeRule {
        match self {
            Axis::Horizontal => EdgeRule {
                edge: Edge::Right,
                offset_px: 15,
            },
            Axis::Vertical => EdgeRule {
                edge: Edge::Bottom,
                offset_px: 15,
            },
        }
    }
}

/// A single CSS declaration pinning the overlay to a viewport edge.
///
/// Always rendered in canonical form, e.g. `right: 15px;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRule {
    pub edge: Edge,
    pub offset_px: u32,
}

impl EdgeRule {
    /// Parses a rule such as `left:20px` for the given axis.
    ///
    /// Surrounding whitespace is ignored. Returns `None` when the value does
    /// not match `^(left|right|top|bottom):\s*\d+px;?$`, when the edge belongs
    /// to the other axis, or when the offset does not fit in a `u32`.
    pub fn parse(value: &str, axis: Axis) -> Option<Self> {
        let caps = EDGE_RULE_PATTERN.captures(value.trim())?;
        let edge = Edge::from_name(caps.get(1)?.as_str())?;
        if !axis.allows(edge) {
            return None;
        }
        let offset_px = caps.get(2)?.as_str().parse().ok()?;
        Some(EdgeRule { edge, offset_px })
    }
}

impl fmt::Display for EdgeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}px;", self.edge.as_str(), self.offset_px)
    }
}

/// The canonical settings record consumed by the display pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdSettings {
    pub enabled: bool,
    pub display_devices: BTreeSet<DeviceClass>,
    pub ad_type: AdType,
    pub image_url: String,
    pub html_content: String,
    pub link_url: String,
    pub ad_width: u32,
    pub ad_height: u32,
    pub position_x: EdgeRule,
    pub position_y: EdgeRule,
}

impl Default for AdSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            display_devices: BTreeSet::from([DeviceClass::Mobile]),
            ad_type: AdType::Image,
            image_url: String::new(),
            html_content: String::new(),
            link_url: String::new(),
            ad_width: DEFAULT_AD_WIDTH,
            ad_height: DEFAULT_AD_HEIGHT,
            position_x: Axis::Horizontal.default_rule(),
            position_y: Axis::Vertical.default_rule(),
        }
    }
}

impl AdSettings {
    /// Serializes the record back into the store's key-value shape.
    ///
    /// `sanitize(&settings.to_raw())` returns `settings` unchanged.
    pub fn to_raw(&self) -> RawSettings {
        let mut raw = RawSettings::new();
        raw.insert(KEY_ENABLED.to_string(), Value::Bool(self.enabled));
        raw.insert(
            KEY_DISPLAY_DEVICES.to_string(),
            Value::Array(
                self.display_devices
                    .iter()
                    .map(|d| Value::String(d.as_str().to_string()))
                    .collect(),
            ),
        );
        raw.insert(
            KEY_AD_TYPE.to_string(),
            Value::String(self.ad_type.as_str().to_string()),
        );
        raw.insert(KEY_IMAGE_URL.to_string(), Value::String(self.image_url.clone()));
        raw.insert(
            KEY_HTML_CONTENT.to_string(),
            Value::String(self.html_content.clone()),
        );
        raw.insert(KEY_LINK_URL.to_string(), Value::String(self.link_url.clone()));
        raw.insert(KEY_AD_WIDTH.to_string(), Value::from(self.ad_width));
        raw.insert(KEY_AD_HEIGHT.to_string(), Value::from(self.ad_height));
        raw.insert(
            KEY_POSITION_X.to_string(),
            Value::String(self.position_x.to_string()),
        );
        raw.insert(
            KEY_POSITION_Y.to_string(),
            Value::String(self.position_y.to_string()),
        );
        raw
    }

    /// Whether the overlay targets `device`.
    pub fn targets(&self, device: DeviceClass) -> bool {
        self.display_devices.contains(&device)
    }
}

fn fallback<T: fmt::Debug>(key: &str, value: &Value, default: T) -> T {
    log::debug!(
        "Invalid value for '{}': {}, falling back to {:?}",
        key,
        value,
        default
    );
    default
}

fn present<'a>(raw: &'a RawSettings, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| !v.is_null())
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "off" | "no"
        ),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

/// Leading integer of a string the way form input is usually read:
/// optional whitespace, optional sign, digits. Anything else reads as 0.
fn leading_integer(s: &str) -> u64 {
    let s = s.trim_start();
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u64::MAX })
}

/// Absolute integer value of `value`, clamped into the allowed pixel range.
fn coerce_dimension(value: &Value) -> u32 {
    let magnitude = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(i64::unsigned_abs))
            .or_else(|| n.as_f64().map(|f| f.abs().trunc() as u64))
            .unwrap_or(0),
        Value::String(s) => leading_integer(s),
        Value::Bool(b) => u64::from(*b),
        _ => 0,
    };
    let clamped = magnitude.clamp(u64::from(MIN_AD_DIMENSION), u64::from(MAX_AD_DIMENSION));
    u32::try_from(clamped).unwrap_or(MAX_AD_DIMENSION)
}

fn sanitize_devices(value: Option<&Value>) -> BTreeSet<DeviceClass> {
    let names: Vec<&str> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => vec![s.as_str()],
        _ => Vec::new(),
    };
    let devices: BTreeSet<DeviceClass> = names
        .into_iter()
        .filter_map(|name| name.trim().parse().ok())
        .collect();

    if devices.is_empty() {
        if let Some(value) = value {
            return fallback(
                KEY_DISPLAY_DEVICES,
                value,
                BTreeSet::from([DeviceClass::Mobile]),
            );
        }
        return BTreeSet::from([DeviceClass::Mobile]);
    }
    devices
}

fn sanitize_string_field(raw: &RawSettings, key: &str, filter: fn(&str) -> String) -> String {
    match present(raw, key) {
        Some(Value::String(s)) => filter(s),
        Some(other) => fallback(key, other, String::new()),
        None => String::new(),
    }
}

fn sanitize_position(raw: &RawSettings, key: &str, axis: Axis) -> EdgeRule {
    match present(raw, key) {
        Some(value) => value
            .as_str()
            .and_then(|s| EdgeRule::parse(s, axis))
            .unwrap_or_else(|| fallback(key, value, axis.default_rule())),
        None => axis.default_rule(),
    }
}

fn sanitize_dimension(raw: &RawSettings, key: &str, default: u32) -> u32 {
    match present(raw, key) {
        Some(value) => {
            let dimension = coerce_dimension(value);
            if value.as_u64() != Some(u64::from(dimension)) {
                log::debug!("Normalized '{}' from {} to {}", key, value, dimension);
            }
            dimension
        }
        None => default,
    }
}

/// Validates and normalizes a raw settings map into [`AdSettings`].
pub fn sanitize(raw: &RawSettings) -> AdSettings {
    let enabled = present(raw, KEY_ENABLED).map_or(true, coerce_bool);

    let display_devices = sanitize_devices(present(raw, KEY_DISPLAY_DEVICES));

    let ad_type = match present(raw, KEY_AD_TYPE) {
        Some(value) => value
            .as_str()
            .and_then(|s| AdType::from_name(s.trim()))
            .unwrap_or_else(|| fallback(KEY_AD_TYPE, value, AdType::Image)),
        None => AdType::Image,
    };

    let image_url = sanitize_string_field(raw, KEY_IMAGE_URL, sanitize_url);
    let html_content = sanitize_string_field(raw, KEY_HTML_CONTENT, sanitize_html);
    let link_url = sanitize_string_field(raw, KEY_LINK_URL, sanitize_url);

    let ad_width = sanitize_dimension(raw, KEY_AD_WIDTH, DEFAULT_AD_WIDTH);
    let ad_height = sanitize_dimension(raw, KEY_AD_HEIGHT, DEFAULT_AD_HEIGHT);

    let position_x = sanitize_position(raw, KEY_POSITION_X, Axis::Horizontal);
    let position_y = sanitize_position(raw, KEY_POSITION_Y, Axis::Vertical);

    if !image_url.is_empty() {
        match ad_type {
            AdType::Image | AdType::DynamicSvg if !is_valid_image_url(&image_url) => {
                log::warn!(
                    "Content URL for {} ad does not look like an image: {}",
                    ad_type,
                    image_url
                );
            }
            AdType::Lottie if !is_valid_lottie_url(&image_url) => {
                log::warn!(
                    "Content URL for lottie ad does not look like a JSON animation: {}",
                    image_url
                );
            }
            _ => {}
        }
    }

    AdSettings {
        enabled,
        display_devices,
        ad_type,
        image_url,
        html_content,
        link_url,
        ad_width,
        ad_height,
        position_x,
        position_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSettings {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn assert_invariants(settings: &AdSettings) {
        assert!(!settings.display_devices.is_empty());
        assert!((MIN_AD_DIMENSION..=MAX_AD_DIMENSION).contains(&settings.ad_width));
        assert!((MIN_AD_DIMENSION..=MAX_AD_DIMENSION).contains(&settings.ad_height));
        assert!(AdType::ALL.contains(&settings.ad_type));
        assert!(EDGE_RULE_PATTERN.is_match(&settings.position_x.to_string()));
        assert!(EDGE_RULE_PATTERN.is_match(&settings.position_y.to_string()));
        assert!(Axis::Horizontal.allows(settings.position_x.edge));
        assert!(Axis::Vertical.allows(settings.position_y.edge));
    }

    #[test]
    fn test_sanitize_empty_gives_defaults() {
        let settings = sanitize(&RawSettings::new());
        assert_eq!(settings, AdSettings::default());
        assert!(settings.enabled);
        assert_eq!(settings.display_devices, BTreeSet::from([DeviceClass::Mobile]));
        assert_eq!(settings.ad_width, 150);
        assert_eq!(settings.ad_height, 150);
        assert_eq!(settings.position_x.to_string(), "right: 15px;");
        assert_eq!(settings.position_y.to_string(), "bottom: 15px;");
        assert_eq!(settings.link_url, "");
    }

    #[test]
    fn test_sanitize_full_valid_record() {
        let settings = sanitize(&raw(json!({
            "enabled": true,
            "display_devices": ["mobile", "desktop"],
            "ad_type": "lottie",
            "image_url": "https://x/anim.json",
            "html_content": "",
            "link_url": "https://x",
            "ad_width": 200,
            "ad_height": 120,
            "position_x": "left: 10px;",
            "position_y": "top:5px",
        })));

        assert!(settings.enabled);
        assert_eq!(
            settings.display_devices,
            BTreeSet::from([DeviceClass::Mobile, DeviceClass::Desktop])
        );
        assert_eq!(settings.ad_type, AdType::Lottie);
        assert_eq!(settings.image_url, "https://x/anim.json");
        assert_eq!(settings.link_url, "https://x");
        assert_eq!(settings.ad_width, 200);
        assert_eq!(settings.ad_height, 120);
        assert_eq!(settings.position_x.to_string(), "left: 10px;");
        assert_eq!(settings.position_y.to_string(), "top: 5px;");
    }

    #[test]
    fn test_sanitize_enabled_coercion() {
        for (value, expected) in [
            (json!(false), false),
            (json!(0), false),
            (json!("0"), false),
            (json!(""), false),
            (json!("false"), false),
            (json!("1"), true),
            (json!("on"), true),
            (json!(1), true),
            (json!(null), true),
        ] {
            let settings = sanitize(&raw(json!({ "enabled": value })));
            assert_eq!(settings.enabled, expected, "enabled = {value}");
        }
    }

    #[test]
    fn test_sanitize_devices_filters_unknown() {
        let settings = sanitize(&raw(json!({
            "display_devices": ["tablet", "watch", "tablet", "tv"]
        })));
        assert_eq!(settings.display_devices, BTreeSet::from([DeviceClass::Tablet]));
    }

    #[test]
    fn test_sanitize_devices_never_empty() {
        for value in [json!([]), json!(["watch"]), json!(42), json!({"a": 1})] {
            let settings = sanitize(&raw(json!({ "display_devices": value })));
            assert_eq!(
                settings.display_devices,
                BTreeSet::from([DeviceClass::Mobile]),
                "display_devices = {value}"
            );
        }
    }

    #[test]
    fn test_sanitize_ad_type_fallback() {
        for value in [json!("video"), json!("IMAGE"), json!(3), json!("")] {
            let settings = sanitize(&raw(json!({ "ad_type": value })));
            assert_eq!(settings.ad_type, AdType::Image, "ad_type = {value}");
        }
        let settings = sanitize(&raw(json!({ "ad_type": "dynamic_svg" })));
        assert_eq!(settings.ad_type, AdType::DynamicSvg);
    }

    #[test]
    fn test_sanitize_dimensions_are_clamped() {
        for (value, expected) in [
            (json!(0), 1),
            (json!(-20), 20),
            (json!(5000), 1000),
            (json!("300px"), 300),
            (json!("abc"), 1),
            (json!(99.9), 99),
            (json!("99999999999999999999999"), 1000),
            (json!(null), 150),
        ] {
            let settings = sanitize(&raw(json!({ "ad_width": value.clone(), "ad_height": value.clone() })));
            assert_eq!(settings.ad_width, expected, "ad_width = {value}");
            assert_eq!(settings.ad_height, expected, "ad_height = {value}");
        }
    }

    #[test]
    fn test_sanitize_positions_fall_back_per_axis() {
        let settings = sanitize(&raw(json!({
            "position_x": "top: 10px;",
            "position_y": "right: 10px;",
        })));
        assert_eq!(settings.position_x.to_string(), "right: 15px;");
        assert_eq!(settings.position_y.to_string(), "bottom: 15px;");

        let settings = sanitize(&raw(json!({
            "position_x": "left: 0px; background: url(evil)",
            "position_y": "bottom: 10em;",
        })));
        assert_eq!(settings.position_x.to_string(), "right: 15px;");
        assert_eq!(settings.position_y.to_string(), "bottom: 15px;");
    }

    #[test]
    fn test_edge_rule_parse() {
        assert_eq!(
            EdgeRule::parse("  left:   40px  ", Axis::Horizontal),
            Some(EdgeRule {
                edge: Edge::Left,
                offset_px: 40
            })
        );
        assert_eq!(EdgeRule::parse("LEFT: 40px;", Axis::Horizontal), None);
        assert_eq!(EdgeRule::parse("left: -4px;", Axis::Horizontal), None);
        assert_eq!(EdgeRule::parse("bottom: 99999999999px;", Axis::Vertical), None);
        assert_eq!(EdgeRule::parse("bottom: 0px;", Axis::Horizontal), None);
    }

    #[test]
    fn test_sanitize_filters_urls_and_html() {
        let settings = sanitize(&raw(json!({
            "ad_type": "html",
            "image_url": "javascript:alert(1)",
            "link_url": "example.com/promo",
            "html_content": "<p onclick=\"x()\">Hi <a href=\"/x\">there</a></p><script>bad()</script>",
        })));
        assert_eq!(settings.image_url, "");
        assert_eq!(settings.link_url, "http://example.com/promo");
        assert_eq!(settings.html_content, "<p>Hi there</p>");
    }

    #[test]
    fn test_sanitize_non_string_fields_fall_back() {
        let settings = sanitize(&raw(json!({
            "image_url": 12,
            "link_url": ["https://x"],
            "html_content": {"p": "x"},
            "position_x": 15,
        })));
        assert_eq!(settings.image_url, "");
        assert_eq!(settings.link_url, "");
        assert_eq!(settings.html_content, "");
        assert_eq!(settings.position_x, Axis::Horizontal.default_rule());
    }

    #[test]
    fn test_sanitize_invariants_for_hostile_inputs() {
        let inputs = [
            json!({}),
            json!({"enabled": "yes", "display_devices": null, "ad_type": null}),
            json!({"ad_width": -1000000, "ad_height": 1e300, "position_x": "", "position_y": "   "}),
            json!({"display_devices": "desktop", "position_x": "right:1px", "position_y": "top: 0px"}),
            json!({"ad_width": true, "ad_height": false, "ad_type": ["lottie"]}),
        ];
        for input in inputs {
            let settings = sanitize(&raw(input));
            assert_invariants(&settings);
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            json!({}),
            json!({
                "enabled": "0",
                "display_devices": ["desktop", "mobile", "bogus"],
                "ad_type": "html",
                "html_content": "<div><a href='#'>x</a><!-- c --><img src='example.com/a.png' onload='x()'></div>",
                "link_url": "  https://x/landing?a=1&b=2 ",
                "ad_width": "-5",
                "ad_height": 4000,
                "position_x": " left:3px ",
                "position_y": "nonsense",
            }),
            json!({
                "ad_type": "image",
                "image_url": "cdn.example.com/banner.png",
                "display_devices": "tablet",
            }),
        ];
        for input in inputs {
            let once = sanitize(&raw(input));
            let twice = sanitize(&once.to_raw());
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_to_raw_shape() {
        let raw = AdSettings::default().to_raw();
        assert_eq!(raw.get(KEY_AD_TYPE), Some(&json!("image")));
        assert_eq!(raw.get(KEY_DISPLAY_DEVICES), Some(&json!(["mobile"])));
        assert_eq!(raw.get(KEY_POSITION_X), Some(&json!("right: 15px;")));
        assert_eq!(raw.get(KEY_AD_WIDTH), Some(&json!(150)));
        assert_eq!(raw.len(), 10);
    }

    #[test]
    fn test_ad_type_names() {
        for ad_type in AdType::ALL {
            assert_eq!(AdType::from_name(ad_type.as_str()), Some(ad_type));
        }
        assert_eq!(
            serde_json::to_string(&AdType::DynamicSvg).unwrap(),
            "\"dynamic_svg\""
        );
    }
}
