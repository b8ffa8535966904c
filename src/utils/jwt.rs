use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode,
    encode,
    Algorithm,
    DecodingKey,
    EncodingKey,
    Header,
    Validation,
    errors::{Error as JwtError, ErrorKind as JwtErrorKind},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::{ErrorMessage, HttpError};

#[derive(Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub nbf: usize,
}

pub fn create_token(
    user_id: &Uuid,
    secret: &[u8],
    expires_in_minutes: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(expires_in_minutes)).timestamp() as usize,
        nbf: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret)
    ).map_err(|_| JwtErrorKind::InvalidToken.into())
}

pub fn parse_token(
    token: impl Into<String>,
    secret: &[u8]
) -> Result<Uuid, HttpError<()>> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    );
    match decoded {
        Ok(token) => Uuid::parse_str(&token.claims.sub)
            .map_err(|_| HttpError::unauthorized(ErrorMessage::TokenInvalid.to_string(), None)),
        Err(_) => Err(HttpError::unauthorized(ErrorMessage::TokenInvalid.to_string(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_token(&user_id, b"secret", 60).unwrap();
        assert_eq!(parse_token(token, b"secret").unwrap(), user_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(&Uuid::new_v4(), b"secret", 60).unwrap();
        assert!(parse_token(token, b"other").is_err());
    }
}
