use crate::error::{CmsError, CmsResult};
use crate::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::sync::Arc;

/// Who is calling. The only distinction the CMS makes is admin or not.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Principal {
    pub is_admin: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Principal { is_admin: false }
    }

    pub fn admin() -> Self {
        Principal { is_admin: true }
    }

    pub fn require_admin(&self) -> CmsResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(CmsError::Forbidden)
        }
    }
}

pub trait PrincipalProvider: Send + Sync {
    fn principal(&self, headers: &HeaderMap) -> Principal;
}

/// Treats `Authorization: Bearer <key>` with the configured secret as admin.
/// An empty secret never matches.
pub struct AdminKey {
    key: String,
}

impl AdminKey {
    pub fn new(key: impl Into<String>) -> Self {
        AdminKey { key: key.into() }
    }
}

impl PrincipalProvider for AdminKey {
    fn principal(&self, headers: &HeaderMap) -> Principal {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match token {
            Some(token) if !self.key.is_empty() && token == self.key => Principal::admin(),
            _ => Principal::anonymous(),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.principals.principal(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn bearer_secret_is_admin() {
        let provider = AdminKey::new("s3cret");
        assert!(provider.principal(&headers("Bearer s3cret")).is_admin);
        assert!(!provider.principal(&headers("Bearer nope")).is_admin);
        assert!(!provider.principal(&headers("s3cret")).is_admin);
        assert!(!provider.principal(&HeaderMap::new()).is_admin);
    }

    #[test]
    fn empty_secret_never_matches() {
        let provider = AdminKey::new("");
        assert!(!provider.principal(&headers("Bearer ")).is_admin);
    }

    #[test]
    fn require_admin() {
        assert!(Principal::admin().require_admin().is_ok());
        assert!(matches!(
            Principal::anonymous().require_admin(),
            Err(CmsError::Forbidden)
        ));
    }
}
