use crate::actix_web::http::header::AUTHORIZATION;
use crate::actix_web::web::Data;
use crate::actix_web::{FromRequest, HttpRequest};
use crate::core::tokener::{SessionClaim, Tokener};
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use std::future::{ready, Ready};

pub static SESSION_COOKIE: &str = "cx_admin_session";

/// Session token from the cookie, falling back to an `Authorization: Bearer` header.
pub fn request_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

pub fn verify_session(tokener: &JWT, token: &str) -> Option<SessionClaim> {
    tokener.verify_token(token).ok()
}

/// An authenticated admin. Extracting it is the gate every admin handler passes through.
#[derive(Debug, Clone)]
pub struct AdminInfo {
    pub id: String,
    pub username: String,
}

fn authenticate(req: &HttpRequest) -> Result<AdminInfo, Error> {
    let tokener = match req.app_data::<Data<JWT>>() {
        Some(t) => t,
        None => {
            log::error!("no token verifier registered for {}", req.path());
            return Err(Error::Unauthorized);
        }
    };
    let token = request_token(req).ok_or(Error::Unauthorized)?;
    let claim = verify_session(tokener, &token).ok_or(Error::Unauthorized)?;
    Ok(AdminInfo {
        id: claim.admin_id,
        username: claim.username,
    })
}

impl FromRequest for AdminInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
