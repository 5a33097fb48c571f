use crate::error::Error;
use serde::{Deserialize, Serialize};

pub trait Payload: Serialize + for<'d> Deserialize<'d> {}

pub trait Tokener<P: Payload> {
    fn gen_token(&self, payload: &P) -> Result<String, Error>;
    fn verify_token(&self, token: &str) -> Result<P, Error>;
}

pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaim {
    pub admin_id: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaim {
    pub fn new(admin_id: String, username: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            admin_id,
            username,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        }
    }
}

impl Payload for SessionClaim {}
