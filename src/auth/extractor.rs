use crate::auth::verify_token;
use crate::config::Config;
use crate::error::ApiError;
use actix_web::{web, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Current caller, resolved from the bearer token. Handlers that allow
/// anonymous access take `Option<AuthenticatedUser>` instead.
pub struct AuthenticatedUser {
    pub user_id: i64,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(header_value) = auth_header {
            if let Ok(header_str) = header_value.to_str() {
                if let Some(token) = header_str.strip_prefix("Bearer ") {
                    let config = req.app_data::<web::Data<Config>>();
                    if let Some(config) = config {
                        match verify_token(token, &config.jwt.secret) {
                            Ok(claims) => {
                                if let Some(user_id) = claims.user_id() {
                                    return ready(Ok(AuthenticatedUser { user_id }));
                                }
                            }
                            Err(_) => {
                                return ready(Err(ApiError::Unauthorized.into()));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(ApiError::Unauthorized.into()))
    }
}
