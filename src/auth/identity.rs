//! Identity sources. Both map request headers to a stable user identifier;
//! neither issues credentials.

use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const PARSE_SESSION_HEADER: &str = "X-Parse-Session-Token";
const PARSE_APP_ID_HEADER: &str = "X-Parse-Application-Id";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing {0} header")]
    MissingCredential(&'static str),

    #[error("malformed credential: {0}")]
    Malformed(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    SecretMissing,

    #[error("identity source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("identity source rejected the session")]
    Rejected,
}

/// Resolves the caller's user id from request headers.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn user_id(&self, headers: &HeaderMap) -> Result<String, IdentityError>;
}

fn header_value<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, IdentityError> {
    let value = headers.get(name).ok_or(IdentityError::MissingCredential(name))?;
    let value = value
        .to_str()
        .map_err(|_| IdentityError::Malformed(format!("{} is not valid ASCII", name)))?;
    if value.trim().is_empty() {
        return Err(IdentityError::MissingCredential(name));
    }
    Ok(value)
}

/// Asks a Parse server who owns the caller's session token.
pub struct ParseAuthenticator {
    client: reqwest::Client,
    users_me: Url,
    app_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParseUser {
    #[serde(default)]
    object_id: String,
}

impl ParseAuthenticator {
    pub fn new(client: reqwest::Client, parse_url: &str, app_id: impl Into<String>) -> Result<Self, url::ParseError> {
        let users_me = Url::parse(parse_url)?.join("users/me")?;
        Ok(Self {
            client,
            users_me,
            app_id: app_id.into(),
        })
    }

    pub fn users_me_url(&self) -> &Url {
        &self.users_me
    }
}

#[async_trait]
impl Authenticator for ParseAuthenticator {
    async fn user_id(&self, headers: &HeaderMap) -> Result<String, IdentityError> {
        let token = header_value(headers, PARSE_SESSION_HEADER)?;

        let response = self
            .client
            .get(self.users_me.clone())
            .header(PARSE_APP_ID_HEADER, &self.app_id)
            .header(PARSE_SESSION_HEADER, token)
            .send()
            .await
            .map_err(|e| IdentityError::SourceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!("Parse rejected session with status {}", response.status());
            return Err(IdentityError::Rejected);
        }

        let user: ParseUser = response
            .json()
            .await
            .map_err(|e| IdentityError::SourceUnavailable(format!("failed to decode user: {}", e)))?;

        if user.object_id.is_empty() {
            return Err(IdentityError::Rejected);
        }
        Ok(user.object_id)
    }
}

/// Claims accepted from bearer tokens; the subject is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Validates HS256 bearer tokens signed with a shared secret.
pub struct JwtAuthenticator {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        let decoding_key = (!secret.is_empty()).then(|| DecodingKey::from_secret(secret.as_bytes()));
        Self {
            decoding_key,
            validation: Validation::default(),
        }
    }

    /// Extract JWT token from Authorization header
    fn bearer_token(headers: &HeaderMap) -> Result<&str, IdentityError> {
        let auth_str = header_value(headers, "authorization")?;
        match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            Some(_) => Err(IdentityError::Malformed("empty JWT token".to_string())),
            None => Err(IdentityError::Malformed(
                "Authorization header must use Bearer token format".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn user_id(&self, headers: &HeaderMap) -> Result<String, IdentityError> {
        let key = self.decoding_key.as_ref().ok_or(IdentityError::SecretMissing)?;
        let token = Self::bearer_token(headers)?;

        let data = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken("missing subject".to_string()));
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(sub: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims { sub: sub.to_string(), exp: now + exp_offset, iat: Some(now) };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn jwt_subject_is_the_user_id() {
        let auth = JwtAuthenticator::new(SECRET);
        let headers = bearer(&format!("Bearer {}", token("user-1", 3600)));
        assert_eq!(auth.user_id(&headers).await.unwrap(), "user-1");
    }

    #[tokio::test]
    async fn jwt_rejects_expired_and_foreign_tokens() {
        let auth = JwtAuthenticator::new(SECRET);
        let expired = bearer(&format!("Bearer {}", token("user-1", -3600)));
        assert!(matches!(auth.user_id(&expired).await, Err(IdentityError::InvalidToken(_))));

        let other = JwtAuthenticator::new("another-secret");
        let headers = bearer(&format!("Bearer {}", token("user-1", 3600)));
        assert!(matches!(other.user_id(&headers).await, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn jwt_requires_bearer_header_and_secret() {
        let auth = JwtAuthenticator::new(SECRET);
        assert!(matches!(
            auth.user_id(&HeaderMap::new()).await,
            Err(IdentityError::MissingCredential("authorization"))
        ));
        assert!(matches!(auth.user_id(&bearer("Basic abc")).await, Err(IdentityError::Malformed(_))));

        let unconfigured = JwtAuthenticator::new("");
        let headers = bearer(&format!("Bearer {}", token("user-1", 3600)));
        assert!(matches!(unconfigured.user_id(&headers).await, Err(IdentityError::SecretMissing)));
    }

    #[tokio::test]
    async fn parse_requires_session_header() {
        let auth = ParseAuthenticator::new(reqwest::Client::new(), "http://parse:1337/parse/", "appId").unwrap();
        assert_eq!(auth.users_me_url().as_str(), "http://parse:1337/parse/users/me");
        assert!(matches!(
            auth.user_id(&HeaderMap::new()).await,
            Err(IdentityError::MissingCredential(PARSE_SESSION_HEADER))
        ));
    }
}
