//! HTTP method types.

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[default]
    #[display("GET")]
    Get,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// HEAD method - retrieve headers only.
    #[display("HEAD")]
    Head,
    /// OPTIONS method - retrieve allowed methods.
    #[display("OPTIONS")]
    Options,
}

/// Where a model attached with `set_body` ends up for a given method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPlacement {
    /// Serialized into the request body.
    Body,
    /// Folded into the URL query string.
    Query,
}

impl Method {
    /// Placement of an attached model, `None` when the method ignores models.
    #[must_use]
    pub const fn body_placement(&self) -> Option<BodyPlacement> {
        match self {
            Self::Post | Self::Put => Some(BodyPlacement::Body),
            Self::Get | Self::Delete => Some(BodyPlacement::Query),
            Self::Patch | Self::Head | Self::Options => None,
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }

    #[test]
    fn default_method_is_get() {
        assert_eq!(Method::default(), Method::Get);
    }

    #[test]
    fn body_placement_by_method() {
        assert_eq!(Method::Post.body_placement(), Some(BodyPlacement::Body));
        assert_eq!(Method::Put.body_placement(), Some(BodyPlacement::Body));
        assert_eq!(Method::Get.body_placement(), Some(BodyPlacement::Query));
        assert_eq!(Method::Delete.body_placement(), Some(BodyPlacement::Query));
        assert_eq!(Method::Patch.body_placement(), None);
        assert_eq!(Method::Head.body_placement(), None);
        assert_eq!(Method::Options.body_placement(), None);
    }

    #[test]
    fn method_into_http() {
        assert_eq!(http::Method::from(Method::Get), http::Method::GET);
        assert_eq!(http::Method::from(Method::Delete), http::Method::DELETE);
    }
}
