//! The dismissal flag: a client-side cookie that hides the overlay for a day.
//!
//! The server never writes this cookie. The close button's script sets it and
//! later requests carry it back, where [`is_dismissed`] turns it into the
//! boolean the display gate consumes.

use cookie::time::Duration;
use cookie::{Cookie, CookieJar, SameSite};
use http::header;

use crate::constants::{DISMISSAL_COOKIE_NAME, DISMISSAL_COOKIE_VALUE, DISMISSAL_TTL_HOURS};
use crate::http_wrapper::RequestWrapper;

pub const DISMISSAL_COOKIE_PATH: &str = "/";

/// What the client persists when the close button is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissalContract {
    pub cookie_name: &'static str,
    pub cookie_value: &'static str,
    pub path: &'static str,
    pub ttl: Duration,
}

impl DismissalContract {
    pub fn ttl_millis(&self) -> i64 {
        self.ttl.whole_milliseconds() as i64
    }

    /// The cookie a client holds after dismissing the overlay.
    pub fn client_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name, self.cookie_value))
            .path(self.path)
            .same_site(SameSite::Lax)
            .max_age(self.ttl)
            .build()
    }
}

impl Default for DismissalContract {
    fn default() -> Self {
        Self {
            cookie_name: DISMISSAL_COOKIE_NAME,
            cookie_value: DISMISSAL_COOKIE_VALUE,
            path: DISMISSAL_COOKIE_PATH,
            ttl: Duration::hours(DISMISSAL_TTL_HOURS),
        }
    }
}

// return empty cookie jar for unparsable cookies
pub fn parse_cookies_to_jar(s: &str) -> CookieJar {
    let cookie_str = s.trim().to_owned();
    let mut jar = CookieJar::new();
    let cookies = Cookie::split_parse(cookie_str).filter_map(Result::ok);

    for cookie in cookies {
        jar.add_original(cookie);
    }

    jar
}

pub fn handle_request_cookies<T: RequestWrapper>(req: &T) -> Option<CookieJar> {
    req.get_header(header::COOKIE).map(|header_value| {
        let header_value_str: &str = header_value.to_str().unwrap_or("");
        parse_cookies_to_jar(header_value_str)
    })
}

/// Whether the jar carries the dismissal flag. Any value counts.
pub fn jar_has_dismissal(jar: &CookieJar) -> bool {
    jar.get(DISMISSAL_COOKIE_NAME).is_some()
}

/// Whether the client that sent `req` has dismissed the overlay.
pub fn is_dismissed<T: RequestWrapper>(req: &T) -> bool {
    handle_request_cookies(req).is_some_and(|jar| jar_has_dismissal(&jar))
}
