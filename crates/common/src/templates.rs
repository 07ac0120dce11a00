//! Handlebars templates for the overlay markup and its client script.
//!
//! Double-stash placeholders are HTML-escaped; triple-stash is only used for
//! values that are already safe (filtered HTML, rendered fragments, JSON
//! string literals inside the script).

use error_stack::{Report, ResultExt};
use handlebars::Handlebars;
use serde_json::Value;

use crate::error::FloatAdError;

pub const IMAGE_FRAGMENT_TEMPLATE: &str = r#"<a href="{{href}}" rel="{{rel}}"><img src="{{src}}" alt="{{alt}}" style="width: {{width}}px; height: {{height}}px;" /></a>"#;

pub const LOTTIE_FRAGMENT_TEMPLATE: &str = r#"<a href="{{href}}" rel="{{rel}}" style="display: block; width: {{width}}px; height: {{height}}px;"><div class="{{lottie_class}}" data-path="{{path}}" style="width: 100%; height: 100%;"></div></a>"#;

pub const HTML_FRAGMENT_TEMPLATE: &str = r#"<a href="{{href}}" rel="{{rel}}" style="display: block; width: {{width}}px; height: {{height}}px;">{{{html}}}</a>"#;

pub const CONTAINER_TEMPLATE: &str = r#"<div id="{{container_id}}" style="position: fixed; z-index: {{z_index}}; {{position_x}} {{position_y}}"><button id="{{close_id}}" type="button" aria-label="Close advertisement" style="position: absolute; top: -10px; right: -10px; background: #000; color: #fff; border: none; border-radius: 50%; width: 25px; height: 25px; cursor: pointer; font-size: 16px; line-height: 1; text-align: center; box-shadow: 0 0 5px rgba(0,0,0,0.5);">{{close_label}}</button><div id="{{content_id}}">{{{content}}}</div></div>"#;

pub const CLIENT_SCRIPT_TEMPLATE: &str = r#"<script>
(function () {
  function initLottieAnimations() {
    var containers = document.querySelectorAll('.' + {{{lottie_class}}});
    if (typeof lottie === 'undefined' || containers.length === 0) {
      return;
    }
    containers.forEach(function (container) {
      var animationPath = container.getAttribute('data-path');
      if (!animationPath) {
        return;
      }
      try {
        lottie.loadAnimation({
          container: container,
          renderer: 'svg',
          loop: true,
          autoplay: true,
          path: animationPath
        });
      } catch (error) {
        console.warn('Lottie animation failed to load:', error);
      }
    });
  }

  function init() {
    var closeBtn = document.getElementById({{{close_id}}});
    var adContainer = document.getElementById({{{container_id}}});
    if (closeBtn && adContainer) {
      closeBtn.addEventListener('click', function (e) {
        e.preventDefault();
        adContainer.style.display = 'none';
        var expires = new Date(Date.now() + {{ttl_ms}}).toUTCString();
        document.cookie = {{{cookie_name}}} + '=' + {{{cookie_value}}} + '; expires=' + expires + '; path=' + {{{cookie_path}}} + '; SameSite=Lax';
      });
    }
{{#if lottie}}
    initLottieAnimations();
{{/if}}
  }

  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', init);
  } else {
    init();
  }
})();
</script>"#;

pub const LOTTIE_PLAYER_TEMPLATE: &str = r#"<script src="{{player_url}}"></script>
<script>
window.addEventListener('error', function (e) {
  if (e.target && e.target.src && e.target.src.indexOf('lottie') !== -1) {
    console.warn('Lottie player failed to load, check the network or the player URL');
  }
}, true);
</script>"#;

/// Renders `template` against `data` in strict mode.
///
/// # Errors
///
/// Returns [`FloatAdError::Template`] if the template is malformed or
/// references a missing value.
pub fn render_template(template: &str, data: &Value) -> Result<String, Report<FloatAdError>> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars
        .render_template(template, data)
        .change_context(FloatAdError::Template {
            message: "Failed to render overlay template".to_string(),
        })
}
