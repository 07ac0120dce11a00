//! Decides whether the overlay is rendered for a request at all.

use crate::ad_settings::AdSettings;
use crate::device::DeviceClass;

/// Outcome of the display gate, naming why the overlay is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Display,
    Disabled,
    Dismissed,
    NoTargetDevices,
    DeviceNotTargeted(DeviceClass),
}

impl GateDecision {
    pub fn is_display(self) -> bool {
        matches!(self, GateDecision::Display)
    }
}

/// Evaluates the gate. Checks run in order: enabled, dismissal, targeting.
pub fn evaluate(settings: &AdSettings, device: DeviceClass, dismissed: bool) -> GateDecision {
    if !settings.enabled {
        GateDecision::Disabled
    } else if dismissed {
        GateDecision::Dismissed
    } else if settings.display_devices.is_empty() {
        GateDecision::NoTargetDevices
    } else if !settings.targets(device) {
        GateDecision::DeviceNotTargeted(device)
    } else {
        GateDecision::Display
    }
}

/// Whether the overlay should be rendered for this device and dismissal state.
pub fn should_display(settings: &AdSettings, device: DeviceClass, dismissed: bool) -> bool {
    evaluate(settings, device, dismissed).is_display()
}
