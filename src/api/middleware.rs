// Origin gate middleware
// Answers CORS headers for every request against a fixed allow-list

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS, PUT, PATCH, DELETE";
pub const ALLOWED_HEADERS: &str = "X-Requested-With,content-type";

/// Development origins accepted out of the box
pub fn default_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:4000",
        "http://localhost:5000",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:4000",
        "http://127.0.0.1:5000",
        "http://127.0.0.1:8081",
        "http://192.168.2.227:8081",
    ]
    .iter()
    .map(|origin| origin.to_string())
    .collect()
}

/// What the gate answers in `Access-Control-Allow-Origin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// Listed origin, echoed back
    Echo(String),
    /// No origin declared, so any origin
    Wildcard,
    /// Unknown origin; no allow header is set and the browser blocks it
    Withhold,
}

/// Fixed allow-list of browser origins
#[derive(Debug, Clone)]
pub struct OriginGate {
    allowed: Vec<String>,
}

impl OriginGate {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// The configured list plus the service's own `localhost`/`127.0.0.1` origins
    pub fn for_port(mut allowed: Vec<String>, port: u16) -> Self {
        for own in [
            format!("http://localhost:{}", port),
            format!("http://127.0.0.1:{}", port),
        ] {
            if !allowed.contains(&own) {
                allowed.push(own);
            }
        }
        Self::new(allowed)
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Decide on a declared origin; `None` and the literal `null` mean undeclared
    pub fn decide(&self, origin: Option<&str>) -> OriginDecision {
        match origin {
            None | Some("null") => OriginDecision::Wildcard,
            Some(origin) if self.allowed.iter().any(|allowed| allowed == origin) => {
                OriginDecision::Echo(origin.to_string())
            }
            Some(_) => OriginDecision::Withhold,
        }
    }

    /// Decide on the raw `Origin` header
    ///
    /// A declared origin that is not valid text can never be listed, so it is
    /// withheld rather than treated as undeclared.
    pub fn decide_header(&self, origin: Option<&HeaderValue>) -> OriginDecision {
        match origin.map(HeaderValue::to_str) {
            None => self.decide(None),
            Some(Ok(origin)) => self.decide(Some(origin)),
            Some(Err(_)) => OriginDecision::Withhold,
        }
    }

    /// Write the CORS headers for `decision`
    pub fn apply(&self, decision: &OriginDecision, headers: &mut HeaderMap) {
        let allow_origin = match decision {
            OriginDecision::Echo(origin) => HeaderValue::from_str(origin).ok(),
            OriginDecision::Wildcard => Some(HeaderValue::from_static("*")),
            OriginDecision::Withhold => None,
        };
        if let Some(value) = allow_origin {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

impl Default for OriginGate {
    fn default() -> Self {
        Self::new(default_origins())
    }
}

/// Origin gate middleware for Axum
///
/// Unknown origins are logged, never rejected. Preflight `OPTIONS` requests
/// are answered here with `200` and never reach a handler.
pub async fn origin_gate(
    State(gate): State<Arc<OriginGate>>,
    request: Request<Body>,
    next: Next<Body>,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();

    let decision = gate.decide_header(origin.as_ref());
    if decision == OriginDecision::Withhold {
        warn!("Client Origin {:?} is not allowed", origin);
    }

    let mut response = if request.method() == Method::OPTIONS {
        debug!("Answering preflight for {}", request.uri().path());
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    gate.apply(&decision, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_origin_is_echoed() {
        let gate = OriginGate::default();
        assert_eq!(
            gate.decide(Some("http://localhost:3000")),
            OriginDecision::Echo("http://localhost:3000".to_string())
        );
    }

    #[test]
    fn test_missing_or_null_origin_gets_wildcard() {
        let gate = OriginGate::default();
        assert_eq!(gate.decide(None), OriginDecision::Wildcard);
        assert_eq!(gate.decide(Some("null")), OriginDecision::Wildcard);
    }

    #[test]
    fn test_unknown_origin_is_withheld() {
        let gate = OriginGate::default();
        assert_eq!(gate.decide(Some("http://evil.example")), OriginDecision::Withhold);

        let mut headers = HeaderMap::new();
        gate.apply(&OriginDecision::Withhold, &mut headers);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_undecodable_origin_is_withheld() {
        let gate = OriginGate::default();
        let origin = HeaderValue::from_bytes(b"http://\xfflocalhost:3000").unwrap();
        assert_eq!(gate.decide_header(Some(&origin)), OriginDecision::Withhold);

        assert_eq!(gate.decide_header(None), OriginDecision::Wildcard);
        let listed = HeaderValue::from_static("http://localhost:3000");
        assert_eq!(
            gate.decide_header(Some(&listed)),
            OriginDecision::Echo("http://localhost:3000".to_string())
        );
    }

    #[test]
    fn test_own_port_is_allowed() {
        let gate = OriginGate::for_port(default_origins(), 8080);
        assert_eq!(gate.allowed().len(), 10);
        assert_eq!(
            gate.decide(Some("http://127.0.0.1:8080")),
            OriginDecision::Echo("http://127.0.0.1:8080".to_string())
        );

        // Already listed, not duplicated
        let gate = OriginGate::for_port(default_origins(), 3000);
        assert_eq!(gate.allowed().len(), 8);
    }
}
