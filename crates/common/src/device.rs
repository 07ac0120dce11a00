//! Coarse device classification from the client's user-agent string.
//!
//! Classification is intentionally shallow: a fixed list of tablet markers is
//! checked first, then a generic "is this a mobile browser" signal. Anything
//! else is a desktop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http_wrapper::RequestWrapper;

/// Device classes an ad can be targeted at.
///
/// The declaration order is the canonical serialization order of a device set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 3] = [DeviceClass::Mobile, DeviceClass::Tablet, DeviceClass::Desktop];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known device class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDeviceClass(pub String);

impl fmt::Display for UnknownDeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown device class: {}", self.0)
    }
}

impl std::error::Error for UnknownDeviceClass {}

impl FromStr for DeviceClass {
    type Err = UnknownDeviceClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(DeviceClass::Mobile),
            "tablet" => Ok(DeviceClass::Tablet),
            "desktop" => Ok(DeviceClass::Desktop),
            other => Err(UnknownDeviceClass(other.to_string())),
        }
    }
}

/// Lower-case substrings identifying tablets.
const TABLET_MARKERS: &[&str] = &[
    "ipad",
    "tablet",
    "kindle",
    "silk",
    "playbook",
    "nexus 7",
    "nexus 9",
    "nexus 10",
    "sm-t",
    "gt-p",
    "kfapwi",
    "xoom",
];

/// Case-sensitive markers of a generic mobile browser.
const MOBILE_MARKERS: &[&str] = &[
    "Mobile",
    "Android",
    "Silk/",
    "Kindle",
    "BlackBerry",
    "Opera Mini",
    "Opera Mobi",
];

/// Returns true when the user agent carries a tablet marker.
///
/// Android devices that do not advertise `mobile` are tablets by convention.
pub fn is_tablet_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    if TABLET_MARKERS.iter().any(|marker| ua.contains(marker)) {
        return true;
    }
    ua.contains("android") && !ua.contains("mobile")
}

/// Generic mobile-browser signal, covering phones and tablets alike.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    MOBILE_MARKERS
        .iter()
        .any(|marker| user_agent.contains(marker))
}

/// Classifies a client from its user agent and a mobile-detection signal.
///
/// Tablet markers take precedence: an iPad that the generic detector also
/// reports as mobile is a tablet.
pub fn classify(user_agent: &str, is_mobile: bool) -> DeviceClass {
    if is_tablet_user_agent(user_agent) {
        DeviceClass::Tablet
    } else if is_mobile {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

/// Classifies a user agent using the built-in mobile detector.
pub fn classify_user_agent(user_agent: &str) -> DeviceClass {
    classify(user_agent, is_mobile_user_agent(user_agent))
}

/// Classifies the client that sent `req`. A missing user agent is a desktop.
pub fn classify_request<T: RequestWrapper>(req: &T) -> DeviceClass {
    let user_agent = req
        .get_header(http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let device = classify_user_agent(user_agent);
    log::debug!("Classified user agent {:?} as {}", user_agent, device);
    device
}
