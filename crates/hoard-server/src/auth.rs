use async_trait::async_trait;
use axum::http::{header, HeaderMap};

/// Who is making a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Identity {
    /// The store owner; reads skip chain authorization.
    Owner,
    Anonymous,
}

impl Identity {
    pub fn is_owner(self) -> bool {
        matches!(self, Self::Owner)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Extract `Authorization: Bearer <token>`. Anything else is anonymous.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| Self::Bearer(token.trim().to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Identity;
}

/// Owner authentication by a single shared bearer token.
///
/// With no token configured nobody is the owner.
pub struct OwnerTokenAuth {
    token: Option<String>,
}

impl OwnerTokenAuth {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl AuthProvider for OwnerTokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> Identity {
        match (credentials, &self.token) {
            (Credentials::Bearer(offered), Some(expected))
                if constant_time_eq(offered.as_bytes(), expected.as_bytes()) =>
            {
                Identity::Owner
            }
            _ => Identity::Anonymous,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        h
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(
            Credentials::from_headers(&headers("Bearer abc")),
            Credentials::Bearer("abc".into())
        );
        assert_eq!(
            Credentials::from_headers(&headers("Basic abc")),
            Credentials::Anonymous
        );
        assert_eq!(
            Credentials::from_headers(&HeaderMap::new()),
            Credentials::Anonymous
        );
    }

    #[tokio::test]
    async fn owner_token_matches() {
        let auth = OwnerTokenAuth::new(Some("s3cret".into()));
        let owner = auth
            .authenticate(&Credentials::Bearer("s3cret".into()))
            .await;
        assert!(owner.is_owner());
        let wrong = auth
            .authenticate(&Credentials::Bearer("s3cre7".into()))
            .await;
        assert_eq!(wrong, Identity::Anonymous);
        assert_eq!(
            auth.authenticate(&Credentials::Anonymous).await,
            Identity::Anonymous
        );
    }

    #[tokio::test]
    async fn no_token_means_no_owner() {
        let auth = OwnerTokenAuth::new(Some(String::new()));
        assert_eq!(
            auth.authenticate(&Credentials::Bearer(String::new())).await,
            Identity::Anonymous
        );
    }
}
