use crate::core::tokener::{Payload, Tokener};
use crate::error::Error;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

#[derive(Clone)]
pub struct JWT {
    secret: Vec<u8>,
}

impl JWT {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<P> Tokener<P> for JWT
where
    P: Payload,
{
    fn gen_token(&self, payload: &P) -> Result<String, Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(&self.secret);
        let token = encode(&header, payload, &key)?;
        Ok(token)
    }
    fn verify_token(&self, token: &str) -> Result<P, Error> {
        let key = DecodingKey::from_secret(&self.secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let payload = decode(token, &key, &validation)?;
        Ok(payload.claims)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::tokener::SessionClaim;

    #[test]
    fn test_gen_and_verify_token() {
        let jwt = JWT::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0]);
        let claim = SessionClaim::new("42".into(), "bear dad".into());
        let token = jwt.gen_token(&claim).unwrap();
        let c: SessionClaim = jwt.verify_token(&token).unwrap();
        assert_eq!(claim, c);
        assert_eq!(c.exp - c.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_different_tokens() {
        let jwt = JWT::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0]);
        let claim_a = SessionClaim::new("1".into(), "a".into());
        let token_a = jwt.gen_token(&claim_a).unwrap();
        let claim_b = SessionClaim::new("2".into(), "b".into());
        let token_b = jwt.gen_token(&claim_b).unwrap();
        let c_a: SessionClaim = jwt.verify_token(&token_a).unwrap();
        let c_b: SessionClaim = jwt.verify_token(&token_b).unwrap();
        assert_eq!(c_a.username, claim_a.username);
        assert_eq!(c_b.username, claim_b.username);
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let issuer = JWT::new(b"issuer-secret".to_vec());
        let other = JWT::new(b"other-secret".to_vec());
        let token = issuer.gen_token(&SessionClaim::new("1".into(), "a".into())).unwrap();
        assert!(<JWT as Tokener<SessionClaim>>::verify_token(&other, &token).is_err());
    }

    #[test]
    fn test_rejects_expired() {
        let jwt = JWT::new(b"secret".to_vec());
        let mut claim = SessionClaim::new("1".into(), "a".into());
        claim.iat -= 2 * 24 * 60 * 60;
        claim.exp = claim.iat + 60;
        let token = jwt.gen_token(&claim).unwrap();
        assert!(<JWT as Tokener<SessionClaim>>::verify_token(&jwt, &token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        let jwt = JWT::new(b"secret".to_vec());
        assert!(<JWT as Tokener<SessionClaim>>::verify_token(&jwt, "not.a.token").is_err());
    }
}
