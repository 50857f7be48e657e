//! Signed, time-bounded identity tokens.
//!
//! Tokens are HS256 JWTs with claims `{"sub", "iat", "exp"}` in whole Unix
//! seconds.
//!
//! Subject extraction is strict (any structural or signature problem is a
//! `MalformedToken`), while the expiry check degrades to "expired" on failure.
//! Expiry is always compared against an injected `now`, never the wall clock.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Identity;

/// Minimum key length for HS256 (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Claims carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies tokens with a single immutable signing key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &"<redacted>")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from the process secret and the token lifetime.
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "signing secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                secret.len()
            )));
        }
        if lifetime <= Duration::zero() {
            return Err(Error::Config("token lifetime must be positive".to_string()));
        }

        // Expiry is checked separately against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject`, valid from `now` for the configured lifetime.
    pub fn issue(&self, subject: &Identity, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.lifetime.num_seconds())
            .ok_or_else(|| Error::Config("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: subject.as_str().to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("token signing failed: {}", e)))?;

        debug!(
            subsystem = "auth",
            component = "token",
            op = "issue",
            user = %subject,
            exp = claims.exp,
            "Issued token"
        );
        Ok(token)
    }

    /// Verify the token and return its subject. Expiry is not checked here.
    pub fn extract_subject(&self, token: &str) -> Result<Identity> {
        let claims = self.decode(token)?;
        Identity::from_subject(claims.sub)
    }

    /// True iff the subject equals `expected` and the token has not expired at `now`.
    ///
    /// Subject extraction errors propagate; a failure while reading the
    /// expiry counts as expired.
    pub fn is_valid(&self, token: &str, expected: &Identity, now: DateTime<Utc>) -> Result<bool> {
        let subject = self.extract_subject(token)?;
        Ok(&subject == expected && !self.is_expired(token, now))
    }

    /// True if the token is expired at `now` or cannot be decoded.
    pub fn is_expired(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.decode(token) {
            // `exp` is a whole second, so this keeps the window at [iat, exp).
            Ok(claims) => now.timestamp() >= claims.exp,
            Err(e) => {
                warn!(
                    subsystem = "auth",
                    component = "token",
                    error = %e,
                    "Token treated as expired"
                );
                true
            }
        }
    }

    /// Parse and signature-verify a token, returning its claims.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::MalformedToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn codec(lifetime_secs: i64) -> TokenCodec {
        TokenCodec::new(SECRET, Duration::seconds(lifetime_secs)).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn user(email: &str) -> Identity {
        Identity::parse_email(email).unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = TokenCodec::new(b"short", Duration::hours(1)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_non_positive_lifetime_rejected() {
        assert!(TokenCodec::new(SECRET, Duration::zero()).is_err());
    }

    #[test]
    fn test_extract_subject_round_trip() {
        let codec = codec(3600);
        for (email, t) in [("user1@example.com", 0), ("u2@mail.example.org", 1_700_000_000)] {
            let token = codec.issue(&user(email), at(t)).unwrap();
            assert_eq!(codec.extract_subject(&token).unwrap(), user(email));
        }
    }

    #[test]
    fn test_claims_carry_issue_and_expiry() {
        let codec = codec(60);
        let token = codec.issue(&user("a@b.io"), at(1_000)).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_060);
    }

    #[test]
    fn test_valid_within_lifetime_window() {
        let codec = codec(60);
        let subject = user("a@b.io");
        let token = codec.issue(&subject, at(1_000)).unwrap();

        assert!(codec.is_valid(&token, &subject, at(1_000)).unwrap());
        assert!(codec.is_valid(&token, &subject, at(1_059)).unwrap());
        let just_before = at(1_059) + Duration::milliseconds(999);
        assert!(codec.is_valid(&token, &subject, just_before).unwrap());

        assert!(!codec.is_valid(&token, &subject, at(1_060)).unwrap());
        assert!(!codec.is_valid(&token, &subject, at(5_000)).unwrap());
    }

    #[test]
    fn test_expired_token_still_yields_subject() {
        let codec = codec(1);
        let token = codec.issue(&user("a@b.io"), at(0)).unwrap();
        assert!(codec.is_expired(&token, at(10)));
        assert_eq!(codec.extract_subject(&token).unwrap(), user("a@b.io"));
    }

    #[test]
    fn test_is_valid_false_for_other_subject() {
        let codec = codec(60);
        let token = codec.issue(&user("a@b.io"), at(0)).unwrap();
        assert!(!codec.is_valid(&token, &user("c@d.io"), at(1)).unwrap());
    }

    #[test]
    fn test_is_valid_propagates_extraction_failure() {
        let codec = codec(60);
        let err = codec
            .is_valid("notatoken", &user("a@b.io"), at(0))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedToken(_)));
    }

    #[test]
    fn test_is_expired_degrades_on_garbage() {
        assert!(codec(60).is_expired("garbage", at(0)));
    }

    #[test]
    fn test_non_token_string_is_malformed() {
        let codec = codec(60);
        for input in ["", "notatoken", "a.b", "a.b.c", "a.b.c.d", "...."] {
            assert!(
                matches!(codec.extract_subject(input), Err(Error::MalformedToken(_))),
                "{:?} should be malformed",
                input
            );
        }
    }

    #[test]
    fn test_tampering_any_byte_is_detected() {
        let codec = codec(3600);
        let token = codec.issue(&user("user1@example.com"), at(1_700_000_000)).unwrap();
        let bytes = token.as_bytes();

        for i in 0..bytes.len() {
            let mut tampered = bytes.to_vec();
            tampered[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(tampered).unwrap();
            assert!(
                matches!(codec.extract_subject(&tampered), Err(Error::MalformedToken(_))),
                "tampering byte {} went unnoticed",
                i
            );
        }
    }

    #[test]
    fn test_token_from_other_key_is_rejected() {
        let other = TokenCodec::new(b"ffffffffffffffffffffffffffffffff", Duration::hours(1)).unwrap();
        let token = other.issue(&user("a@b.io"), at(0)).unwrap();
        assert!(matches!(
            codec(3600).extract_subject(&token),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn test_alg_none_is_rejected() {
        let codec = codec(60);
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"a@b.io","iat":0,"exp":99999999999}"#);
        let token = format!("{}.{}.", header, claims);
        assert!(matches!(
            codec.extract_subject(&token),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn test_empty_subject_is_malformed() {
        let claims = Claims {
            sub: String::new(),
            iat: 0,
            exp: 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(
            codec(60).extract_subject(&token),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn test_missing_subject_claim_is_malformed() {
        #[derive(Serialize)]
        struct NoSubject {
            iat: i64,
            exp: i64,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSubject { iat: 0, exp: 60 },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(
            codec(60).extract_subject(&token),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn test_very_long_lifetime_does_not_overflow() {
        let codec = TokenCodec::new(SECRET, Duration::seconds(i64::MAX / 1000)).unwrap();
        let subject = user("a@b.io");
        let token = codec.issue(&subject, at(1_700_000_000)).unwrap();

        assert!(codec.is_valid(&token, &subject, at(1_700_000_000)).unwrap());
        assert!(!codec.is_expired(&token, at(4_000_000_000)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", codec(60));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
