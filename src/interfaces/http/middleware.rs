//! Authentication middleware for Axum
//!
//! Resolves the bearer token to a [`Principal`] and stores it in request
//! extensions. Handlers behind this layer extract it with
//! `Extension<Principal>`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::application::authorization::{Authenticator, Principal};
use crate::interfaces::http::common::ApiError;

/// State for the authentication layer
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);

    match auth_state
        .authenticator
        .authenticate(header_value.as_deref())
        .await
    {
        Ok(principal) => {
            debug!(user_id = %principal.user_id, role = %principal.role, "Authenticated");
            request.extensions_mut().insert::<Principal>(principal);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
