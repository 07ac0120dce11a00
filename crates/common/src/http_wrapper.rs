use http::header::{HeaderName, HeaderValue};
use http::Method;

/// Read-only view of an inbound page request.
///
/// The pipeline only needs headers and the request line, so any HTTP stack
/// can feed it by implementing this trait.
pub trait RequestWrapper {
    fn get_header(&self, name: HeaderName) -> Option<&HeaderValue>;

    fn get_method(&self) -> &Method;

    fn get_path(&self) -> &str;
}

impl<B> RequestWrapper for http::Request<B> {
    #[inline(always)]
    fn get_header(&self, name: HeaderName) -> Option<&HeaderValue> {
        self.headers().get(name)
    }

    #[inline(always)]
    fn get_method(&self) -> &Method {
        self.method()
    }

    #[inline(always)]
    fn get_path(&self) -> &str {
        self.uri().path()
    }
}
