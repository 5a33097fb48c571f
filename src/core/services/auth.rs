use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::core::models::admin::{Profile, Upsert, UpsertOutcome};
use crate::core::ports::repository::AdminCommon;
use crate::core::tokener::{SessionClaim, Tokener};
use crate::error::Error;
use crate::hex::ToHex;
use crate::sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 32;

pub fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

pub fn random_salt() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(SALT_LEN).map(char::from).collect()
}

pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub admin: Profile,
}

pub async fn login<D, T>(db: &D, tokener: &T, username: &str, password: &str) -> Result<Session, Error>
where
    D: AdminCommon,
    T: Tokener<SessionClaim>,
{
    let admin = db.get_active_by_username(username).await?.ok_or(Error::InvalidCredentials)?;
    if !constant_time_str_eq(&hash_password(password, &admin.salt), &admin.password) {
        return Err(Error::InvalidCredentials);
    }
    let token = tokener.gen_token(&SessionClaim::new(admin.id.to_string(), admin.username.clone()))?;
    Ok(Session {
        token,
        admin: Profile::from(&admin),
    })
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Creates the designated admin, or resets its username and password when the email exists.
pub async fn setup_admin<D>(db: &D, seed: AdminSeed) -> Result<UpsertOutcome, Error>
where
    D: AdminCommon,
{
    let salt = random_salt();
    let outcome = db
        .upsert_by_email(Upsert {
            username: seed.username,
            email: seed.email,
            password: hash_password(&seed.password, &salt),
            salt,
        })
        .await?;
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::impls::tokener::jwt::JWT;
    use crate::test_support::MemoryStore;

    fn seed() -> AdminSeed {
        AdminSeed {
            username: "root".into(),
            email: "root@example.com".into(),
            password: "s3cret".into(),
        }
    }

    #[test]
    fn test_hash_depends_on_salt() {
        assert_eq!(hash_password("pw", "a"), hash_password("pw", "a"));
        assert_ne!(hash_password("pw", "a"), hash_password("pw", "b"));
        assert_eq!(random_salt().len(), SALT_LEN);
    }

    #[test]
    fn test_constant_time_str_eq() {
        assert!(constant_time_str_eq("open-sesame", "open-sesame"));
        assert!(!constant_time_str_eq("open-sesame", "open-sesamf"));
        assert!(!constant_time_str_eq("open-sesame", "open"));
        assert!(constant_time_str_eq("", ""));
    }

    #[actix_web::test]
    async fn test_login_roundtrip() {
        let db = MemoryStore::default();
        let jwt = JWT::new(b"secret".to_vec());
        assert_eq!(setup_admin(&db, seed()).await.unwrap(), UpsertOutcome::Created);
        let session = login(&db, &jwt, "root", "s3cret").await.unwrap();
        assert_eq!(session.admin.username, "root");
        let claim: SessionClaim = jwt.verify_token(&session.token).unwrap();
        assert_eq!(claim.admin_id, session.admin.id.to_string());
    }

    #[actix_web::test]
    async fn test_login_failures() {
        let db = MemoryStore::default();
        let jwt = JWT::new(b"secret".to_vec());
        setup_admin(&db, seed()).await.unwrap();
        assert!(matches!(login(&db, &jwt, "root", "wrong").await, Err(Error::InvalidCredentials)));
        assert!(matches!(login(&db, &jwt, "nobody", "s3cret").await, Err(Error::InvalidCredentials)));
        db.deactivate_admin("root");
        assert!(matches!(login(&db, &jwt, "root", "s3cret").await, Err(Error::InvalidCredentials)));
    }

    #[actix_web::test]
    async fn test_setup_resets_password() {
        let db = MemoryStore::default();
        let jwt = JWT::new(b"secret".to_vec());
        setup_admin(&db, seed()).await.unwrap();
        let mut again = seed();
        again.password = "rotated".into();
        assert_eq!(setup_admin(&db, again).await.unwrap(), UpsertOutcome::Reset);
        assert!(login(&db, &jwt, "root", "s3cret").await.is_err());
        assert!(login(&db, &jwt, "root", "rotated").await.is_ok());
    }
}
