/// Cookie written by the close button; its presence suppresses the overlay.
pub const DISMISSAL_COOKIE_NAME: &str = "d7news_floating_ad_closed";
pub const DISMISSAL_COOKIE_VALUE: &str = "true";
pub const DISMISSAL_TTL_HOURS: i64 = 24;

pub const CONTAINER_ID: &str = "d7news-floating-ad-container";
pub const CLOSE_BUTTON_ID: &str = "d7news-floating-ad-close-btn";
pub const CONTENT_ID: &str = "d7news-floating-ad-content";
pub const LOTTIE_CONTAINER_CLASS: &str = "lottie-animation";

/// Link relationship marker attached to every ad link.
pub const AD_LINK_REL: &str = "ugc nofollow sponsored";

pub const DEFAULT_AD_WIDTH: u32 = 150;
pub const DEFAULT_AD_HEIGHT: u32 = 150;
pub const MIN_AD_DIMENSION: u32 = 1;
pub const MAX_AD_DIMENSION: u32 = 1000;
