//! Session cookie → verified caller identity → request extensions.
//!
//! Resolution never rejects a request on its own: a missing, malformed,
//! expired or orphaned token simply leaves the request anonymous, and the
//! endpoint's policy decides downstream whether that is acceptable.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use crate::services::auth::SESSION_COOKIE;
use crate::state::AppState;

pub async fn resolve_caller(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = session_token(req.headers()) {
        if let Some(ctx) = state.auth.resolve_token(&token).await {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(ctx);
        }
    }

    next.run(req).await
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    parse_cookie(headers, SESSION_COOKIE)
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let part = part.trim();
        if let Some((k, v)) = part.split_once('=')
            && k == name
        {
            return Some(v.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        h
    }

    #[test]
    fn finds_the_session_cookie_among_others() {
        let h = headers("theme=dark; jwt=abc.def.ghi; lang=en");
        assert_eq!(session_token(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_cookie_header_is_anonymous() {
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn other_cookies_do_not_match() {
        let h = headers("jwt2=nope; xjwt=nope");
        assert_eq!(session_token(&h), None);
    }
}
