//! HS256 JWT verifier and issuer.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Timestamp, TokenVerifier, UserId, VerifiedToken};

/// Claims carried by LearnLink session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Display name, if the issuer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Verifies (and, for tooling, issues) tokens signed with a shared secret.
pub struct JwtTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for `ttl`.
    pub fn issue(
        &self,
        user_id: &UserId,
        name: Option<&str>,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            name: name.map(str::to_string),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed(err.to_string()),
            }
        })?;

        let claims = data.claims;
        Ok(VerifiedToken {
            user_id: UserId::new(claims.sub)?,
            expires_at: Timestamp::new(claims.exp.saturating_mul(1000)),
            name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-which-is-long-enough";

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        // テスト項目: 発行したトークンを検証するとユーザー ID が取り出せる
        // given (前提条件):
        let verifier = JwtTokenVerifier::new(SECRET);
        let token = verifier
            .issue(&user("1"), Some("A"), Duration::minutes(15))
            .unwrap();

        // when (操作):
        let verified = verifier.verify(&token).unwrap();

        // then (期待する結果):
        assert_eq!(verified.user_id, user("1"));
        assert_eq!(verified.name.as_deref(), Some("A"));
        assert!(verified.expires_at > Timestamp::now());
    }

    #[test]
    fn test_expired_token_rejected() {
        // テスト項目: 期限切れのトークンは Expired で拒否される
        // given (前提条件):
        let verifier = JwtTokenVerifier::new(SECRET);
        let token = verifier
            .issue(&user("1"), None, Duration::minutes(-5))
            .unwrap();

        // when (操作):
        let result = verifier.verify(&token);

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        // テスト項目: 別の鍵で署名されたトークンは InvalidSignature で拒否される
        // given (前提条件):
        let issuer = JwtTokenVerifier::new(b"another-secret-entirely");
        let verifier = JwtTokenVerifier::new(SECRET);
        let token = issuer
            .issue(&user("1"), None, Duration::minutes(15))
            .unwrap();

        // when (操作):
        let result = verifier.verify(&token);

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_rejected() {
        // テスト項目: JWT 形式でない文字列は Malformed で拒否される
        let verifier = JwtTokenVerifier::new(SECRET);
        assert!(matches!(
            verifier.verify("not-a-jwt"),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn test_empty_subject_rejected() {
        // テスト項目: sub が空のトークンは InvalidSubject で拒否される
        // given (前提条件):
        let verifier = JwtTokenVerifier::new(SECRET);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: String::new(),
            iat: now,
            exp: now + 60,
            name: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        // when (操作):
        let result = verifier.verify(&token);

        // then (期待する結果):
        assert!(matches!(result, Err(AuthError::InvalidSubject(_))));
    }
}
