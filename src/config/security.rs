use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use super::Config;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const XSS_BLOCK: &str = "1; mode=block";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=()";

/// Response headers stamped on every API response.
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeaders {
    include_hsts: bool,
}

impl SecurityHeaders {
    pub fn new(include_hsts: bool) -> Self {
        Self { include_hsts }
    }

    pub fn from_config(config: &Config) -> Self {
        if config.production {
            tracing::info!("Security: HSTS header enabled (production mode)");
        } else {
            tracing::info!("Security: HSTS header disabled (development mode)");
        }

        Self::new(config.production)
    }

    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static(NOSNIFF)),
            (header::X_FRAME_OPTIONS, HeaderValue::from_static(DENY)),
            (header::X_XSS_PROTECTION, HeaderValue::from_static(XSS_BLOCK)),
            (
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(CSP_API_VALUE),
            ),
            (
                header::REFERRER_POLICY,
                HeaderValue::from_static(REFERRER_POLICY_VALUE),
            ),
            (
                PERMISSIONS_POLICY,
                HeaderValue::from_static(PERMISSIONS_POLICY_VALUE),
            ),
        ];

        // HSTS only makes sense behind HTTPS
        if self.include_hsts {
            headers.push((
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(HSTS_VALUE),
            ));
        }

        headers
    }

    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.headers()
            .into_iter()
            .fold(router, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_only_when_requested() {
        let dev = SecurityHeaders::new(false).headers();
        assert!(!dev
            .iter()
            .any(|(name, _)| name == header::STRICT_TRANSPORT_SECURITY));

        let prod = SecurityHeaders::new(true).headers();
        assert!(prod
            .iter()
            .any(|(name, _)| name == header::STRICT_TRANSPORT_SECURITY));
        assert_eq!(prod.len(), dev.len() + 1);
    }

    #[test]
    fn test_camera_is_not_granted_to_api_responses() {
        let headers = SecurityHeaders::new(false).headers();
        let (_, value) = headers
            .iter()
            .find(|(name, _)| name == PERMISSIONS_POLICY)
            .unwrap();
        assert!(value.to_str().unwrap().contains("camera=()"));
    }
}
