//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and email. Older clients put
//! the id under `userId`; both spellings are accepted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "userId")]
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, expires_in: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.expires_in)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

/// Parses a lifetime such as `7d`, `12h`, `30m`, `45s`, or plain seconds.
/// Lifetimes too large to represent are rejected.
pub fn parse_expiry(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (number, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], Some(c.to_ascii_lowercase())),
        _ => (s, None),
    };
    let n: i64 = number.trim().parse().ok().filter(|n| *n > 0)?;

    match unit {
        None | Some('s') => Duration::try_seconds(n),
        Some('m') => Duration::try_minutes(n),
        Some('h') => Duration::try_hours(n),
        Some('d') => Duration::try_days(n),
        Some('w') => Duration::try_weeks(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("secret", Duration::days(7));

        let token = issuer.issue(42, "a@example.com").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new("one", Duration::days(1))
            .issue(1, "a@example.com")
            .unwrap();
        assert!(TokenIssuer::new("two", Duration::days(1))
            .verify(&token)
            .is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("secret", Duration::seconds(-300));
        let token = issuer.issue(1, "a@example.com").unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new("secret", Duration::days(1));
        assert!(issuer.verify("not.a.token").is_err());
        assert!(issuer.verify("").is_err());
    }

    #[test]
    fn test_legacy_user_id_claim() {
        #[derive(Serialize)]
        struct Legacy {
            #[serde(rename = "userId")]
            user_id: i64,
            exp: i64,
        }

        let token = encode(
            &Header::default(),
            &Legacy {
                user_id: 9,
                exp: (Utc::now() + Duration::hours(1)).timestamp(),
            },
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let claims = TokenIssuer::new("secret", Duration::days(1))
            .verify(&token)
            .unwrap();
        assert_eq!(claims.id, 9);
        assert_eq!(claims.email, "");
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("7d"), Some(Duration::days(7)));
        assert_eq!(parse_expiry("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_expiry("30m"), Some(Duration::minutes(30)));
        assert_eq!(parse_expiry("45s"), Some(Duration::seconds(45)));
        assert_eq!(parse_expiry("3600"), Some(Duration::seconds(3600)));
        assert_eq!(parse_expiry("2W"), Some(Duration::weeks(2)));

        assert_eq!(parse_expiry(""), None);
        assert_eq!(parse_expiry("d"), None);
        assert_eq!(parse_expiry("-1d"), None);
        assert_eq!(parse_expiry("7y"), None);
    }

    #[test]
    fn test_parse_expiry_rejects_out_of_range() {
        assert_eq!(parse_expiry("99999999999999d"), None);
        assert_eq!(parse_expiry("9999999999999999w"), None);
        assert_eq!(parse_expiry("9223372036854775807"), None);
        assert!(parse_expiry("36500d").is_some());
    }

    #[test]
    fn test_issue_saturates_far_expiry() {
        let issuer = TokenIssuer::new("secret", Duration::MAX);
        let token = issuer.issue(1, "a@example.com").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp, DateTime::<Utc>::MAX_UTC.timestamp());
    }
}
