//! Lottie player loading.
//!
//! The player script is only emitted for Lottie ads, and only for the devices
//! allowed by [`LottieLoadPolicy`]. With the default `mobile_only` policy a
//! tablet or desktop that is targeted gets the animation container without
//! the player, so the animation never starts; this is logged as a warning.

use serde_json::json;

use crate::device::DeviceClass;
use crate::settings::{Lottie, LottieLoadPolicy};
use crate::templates::{render_template, LOTTIE_PLAYER_TEMPLATE};

/// Whether the Lottie player should be loaded for a displayed Lottie ad.
pub fn should_load_lottie_player(policy: LottieLoadPolicy, device: DeviceClass) -> bool {
    match policy {
        LottieLoadPolicy::MobileOnly => device == DeviceClass::Mobile,
        LottieLoadPolicy::DisplayedDevices => true,
    }
}

/// Player `<script>` tags for a payload, or `None` when no player is needed.
pub fn lottie_player_tags(
    lottie: &Lottie,
    requires_lottie: bool,
    device: DeviceClass,
) -> Option<String> {
    if !requires_lottie {
        return None;
    }

    if !should_load_lottie_player(lottie.load_policy, device) {
        log::warn!(
            "Lottie ad displayed on {} but load policy {:?} skips the player; the animation will not play",
            device,
            lottie.load_policy
        );
        return None;
    }

    match render_template(
        LOTTIE_PLAYER_TEMPLATE,
        &json!({ "player_url": lottie.player_url }),
    ) {
        Ok(tags) => Some(tags),
        Err(e) => {
            log::error!("Failed to render Lottie player tags: {:?}", e);
            None
        }
    }
}
