//! Request identity.
//!
//! Authentication itself happens upstream; by the time a request reaches
//! this service, the gateway has attached the acting account's id and role
//! as headers. The extractor only parses and validates them.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::AccountRole;
use crate::errors::ServiceError;

pub const ACCOUNT_ID_HEADER: &str = "X-Account-Id";
pub const ACCOUNT_ROLE_HEADER: &str = "X-Account-Role";

/// The authenticated account behind the current request.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub account_id: Uuid,
    pub role: AccountRole,
}

impl AuthContext {
    pub fn require_role(&self, role: AccountRole) -> Result<(), ServiceError> {
        if self.role != role {
            return Err(ServiceError::Forbidden(format!(
                "This endpoint requires a {} account",
                role
            )));
        }
        Ok(())
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ServiceError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ServiceError::Unauthorized(format!("Missing {} header", name)))?
        .to_str()
        .map_err(|_| ServiceError::Unauthorized(format!("Malformed {} header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account_id = Uuid::parse_str(header(parts, ACCOUNT_ID_HEADER)?)
            .map_err(|_| {
                ServiceError::Unauthorized(format!("Malformed {} header", ACCOUNT_ID_HEADER))
            })?;
        let role = AccountRole::from_str(header(parts, ACCOUNT_ROLE_HEADER)?).map_err(|_| {
            ServiceError::Unauthorized(format!("Malformed {} header", ACCOUNT_ROLE_HEADER))
        })?;
        Ok(AuthContext { account_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn extracts_id_and_role() {
        let id = Uuid::new_v4();
        let mut parts = parts_with(&[
            (ACCOUNT_ID_HEADER, &id.to_string()),
            (ACCOUNT_ROLE_HEADER, "seller"),
        ]);
        let ctx = AuthContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.account_id, id);
        assert_eq!(ctx.role, AccountRole::Seller);
    }

    #[tokio::test]
    async fn missing_headers_are_unauthorized() {
        let mut parts = parts_with(&[]);
        let err = AuthContext::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let id = Uuid::new_v4();
        let mut parts = parts_with(&[
            (ACCOUNT_ID_HEADER, &id.to_string()),
            (ACCOUNT_ROLE_HEADER, "wizard"),
        ]);
        assert!(AuthContext::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }

    #[test]
    fn require_role_rejects_mismatch() {
        let ctx = AuthContext {
            account_id: Uuid::new_v4(),
            role: AccountRole::Customer,
        };
        assert!(ctx.require_role(AccountRole::Customer).is_ok());
        assert!(matches!(
            ctx.require_role(AccountRole::Installer),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
