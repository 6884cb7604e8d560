use crate::config::JwtConfig;
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issues an HS256 token valid for `expiry_hours`.
pub fn generate_token(user_id: i64, role: &str, config: &JwtConfig) -> Result<String, Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: now + config.expiry_hours * 60 * 60,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiry_hours: 168,
        }
    }

    #[test]
    fn test_generate_and_validate() {
        let config = config("test-secret");
        let token = generate_token(42, "user", &config).unwrap();
        let claims = validate_token(&token, &config).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp - claims.iat, 168 * 60 * 60);
    }

    #[test]
    fn test_expired_token() {
        let config = config("test-secret");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: String::from("user"),
            exp: now - 600,
            iat: now - 1200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_token(1, "admin", &config("alpha")).unwrap();
        assert!(validate_token(&token, &config("bravo")).is_err());
        assert!(validate_token("not.a.token", &config("alpha")).is_err());
    }
}
