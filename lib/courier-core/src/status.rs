//! Status code classification.

use derive_more::Display;

/// Bucket an HTTP status code falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StatusClass {
    /// 2xx.
    #[display("ok")]
    Ok,
    /// 400.
    #[display("bad request")]
    BadRequest,
    /// 401.
    #[display("unauthorized")]
    Unauthorized,
    /// 403.
    #[display("forbidden")]
    Forbidden,
    /// 404.
    #[display("not found")]
    NotFound,
    /// Any other 4xx.
    #[display("client error")]
    ClientError,
    /// 5xx.
    #[display("server error")]
    ServerError,
    /// Zero, informational, redirection or out of range codes.
    #[display("unknown")]
    Unknown,
}

impl StatusClass {
    /// Classify a raw status code.
    #[must_use]
    pub const fn of(status: u16) -> Self {
        match status {
            200..=299 => Self::Ok,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            402 | 405..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Returns `true` for 2xx.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns `true` for the statuses that may be fixed by fresh credentials.
    #[must_use]
    pub const fn is_auth_failure(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

impl From<u16> for StatusClass {
    fn from(status: u16) -> Self {
        Self::of(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_codes() {
        assert_eq!(StatusClass::of(200), StatusClass::Ok);
        assert_eq!(StatusClass::of(204), StatusClass::Ok);
        assert_eq!(StatusClass::of(400), StatusClass::BadRequest);
        assert_eq!(StatusClass::of(401), StatusClass::Unauthorized);
        assert_eq!(StatusClass::of(403), StatusClass::Forbidden);
        assert_eq!(StatusClass::of(404), StatusClass::NotFound);
        assert_eq!(StatusClass::of(402), StatusClass::ClientError);
        assert_eq!(StatusClass::of(429), StatusClass::ClientError);
        assert_eq!(StatusClass::of(503), StatusClass::ServerError);
        assert_eq!(StatusClass::of(0), StatusClass::Unknown);
        assert_eq!(StatusClass::of(302), StatusClass::Unknown);
        assert_eq!(StatusClass::of(999), StatusClass::Unknown);
    }

    #[test]
    fn auth_failures() {
        assert!(StatusClass::Unauthorized.is_auth_failure());
        assert!(StatusClass::Forbidden.is_auth_failure());
        assert!(!StatusClass::BadRequest.is_auth_failure());
        assert!(!StatusClass::Ok.is_auth_failure());
    }

    #[test]
    fn display() {
        assert_eq!(StatusClass::Unauthorized.to_string(), "unauthorized");
        assert_eq!(StatusClass::BadRequest.to_string(), "bad request");
    }
}
