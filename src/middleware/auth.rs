use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Claims, TOKEN_KIND_ACCESS};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// JWT authentication middleware that validates bearer tokens and injects
/// the user context into the request extensions
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::validate_jwt(&token)?;

    // Refresh tokens cannot be used to call protected endpoints
    if claims.kind != TOKEN_KIND_ACCESS {
        return Err(ApiError::unauthorized("Access token required"));
    }

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Pull the bearer token out of the Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())
        .and_then(|v| {
            v.to_str()
                .map_err(|_| "Invalid Authorization header format".to_string())
        })?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header must use Bearer token format".to_string())?;

    if token.trim().is_empty() {
        return Err("Empty bearer token".to_string());
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        let headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }
}
