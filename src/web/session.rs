use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signed sessions live as long as the stored plan does.
pub const SESSION_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub plan_id: Uuid,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("expired")]
    Expired,
}

pub fn sign_session(plan_id: Uuid, key: &[u8]) -> Result<String, SessionError> {
    let exp = (Utc::now() + Duration::hours(SESSION_HOURS)).timestamp();
    sign_with_exp(plan_id, exp, key)
}

fn sign_with_exp(plan_id: Uuid, exp: i64, key: &[u8]) -> Result<String, SessionError> {
    let payload = format!("{plan_id}|{exp}");
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    let token = format!(
        "{}.{}",
        general_purpose::STANDARD.encode(payload.as_bytes()),
        general_purpose::STANDARD.encode(sig)
    );
    Ok(token)
}

pub fn verify_session(token: &str, key: &[u8]) -> Result<SessionClaims, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(SessionError::Invalid);
    }
    let payload_bytes = general_purpose::STANDARD
        .decode(parts[0])
        .map_err(|_| SessionError::Invalid)?;
    let sig_bytes = general_purpose::STANDARD
        .decode(parts[1])
        .map_err(|_| SessionError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(&payload_bytes);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SessionError::Signature)?;

    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Invalid)?;
    let pieces: Vec<&str> = payload.split('|').collect();
    if pieces.len() != 2 {
        return Err(SessionError::Invalid);
    }
    let plan_id = Uuid::parse_str(pieces[0]).map_err(|_| SessionError::Invalid)?;
    let exp: i64 = pieces[1].parse().map_err(|_| SessionError::Invalid)?;
    if Utc::now().timestamp() > exp {
        return Err(SessionError::Expired);
    }
    Ok(SessionClaims { plan_id, exp })
}

pub fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(val) = auth.to_str() {
            if let Some(bearer) = val.strip_prefix("Bearer ") {
                return Some(bearer.trim().to_string());
            }
        }
    }
    if let Some(cookie) = headers.get(axum::http::header::COOKIE) {
        if let Ok(val) = cookie.to_str() {
            for pair in val.split(';') {
                let trimmed = pair.trim();
                if let Some(rest) = trimmed.strip_prefix("session=") {
                    return Some(rest.to_string());
                }
            }
        }
    }
    None
}

/// Axum extractor that validates the session token and yields the plan id
/// it was issued for.
pub struct PlanSession(pub Uuid);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for PlanSession
where
    S: Send + Sync,
    crate::state::SharedState: axum::extract::FromRef<S>,
{
    type Rejection = axum::http::StatusCode;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        use axum::extract::FromRef;

        let shared = crate::state::SharedState::from_ref(state);
        let token =
            extract_token(&parts.headers).ok_or(axum::http::StatusCode::UNAUTHORIZED)?;
        let claims = verify_session(&token, &shared.session_key).map_err(|e| {
            tracing::warn!("Session verification failed: {}", e);
            axum::http::StatusCode::UNAUTHORIZED
        })?;
        Ok(PlanSession(claims.plan_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"unit-test-session-key-0123456789";

    #[test]
    fn test_sign_verify_round_trip() {
        let plan_id = Uuid::new_v4();
        let token = sign_session(plan_id, KEY).unwrap();
        let claims = verify_session(&token, KEY).unwrap();
        assert_eq!(claims.plan_id, plan_id);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let token = sign_session(Uuid::new_v4(), KEY).unwrap();
        let (payload, _) = token.split_once('.').unwrap();
        let forged = format!(
            "{payload}.{}",
            general_purpose::STANDARD.encode(b"not a real signature")
        );
        assert!(matches!(
            verify_session(&forged, KEY),
            Err(SessionError::Signature)
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = sign_session(Uuid::new_v4(), KEY).unwrap();
        assert!(matches!(
            verify_session(&token, b"a completely different key!!!!!!"),
            Err(SessionError::Signature)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            verify_session("definitely-not-a-token", KEY),
            Err(SessionError::Invalid)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let exp = Utc::now().timestamp() - 60;
        let token = sign_with_exp(Uuid::new_v4(), exp, KEY).unwrap();
        assert!(matches!(
            verify_session(&token, KEY),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer abc123".parse().unwrap(),
        );
        headers.insert(
            axum::http::header::COOKIE,
            "session=from-cookie".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "theme=dark; session=tok.sig".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("tok.sig"));
    }
}
