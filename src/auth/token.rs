//! The payload of the auth cookie.

use std::cmp::max;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::UserID};

/// Proof that `user_id` signed in, valid until `expires_at`.
///
/// The expiry is stored as a Unix timestamp, so sub-second precision is lost
/// when the token goes through a cookie.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

fn expiry_from_now(duration: Duration) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidDateFormat(format!("now + {duration} overflows")))
}

impl Token {
    /// A token for `user_id` that expires `duration` from now.
    pub fn new(user_id: UserID, duration: Duration) -> Result<Self, Error> {
        Ok(Self {
            user_id,
            expires_at: expiry_from_now(duration)?,
        })
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// The same token, valid for at least `duration` from now.
    pub fn extended(&self, duration: Duration) -> Result<Self, Error> {
        Ok(Self {
            user_id: self.user_id,
            expires_at: max(self.expires_at, expiry_from_now(duration)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{Error, auth::token::Token, user::UserID};

    #[test]
    fn expiry_is_stored_as_unix_seconds() {
        let token = Token {
            user_id: UserID::new(3),
            expires_at: datetime!(2025-01-01 00:00:00 UTC),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert_eq!(json, r#"{"user_id":3,"expires_at":1735689600}"#);
        assert_eq!(serde_json::from_str::<Token>(&json).unwrap(), token);
    }

    #[test]
    fn expires_exactly_at_expiry() {
        let expires_at = datetime!(2025-06-01 12:00:00 UTC);
        let token = Token {
            user_id: UserID::new(1),
            expires_at,
        };

        assert!(!token.is_expired(expires_at - Duration::seconds(1)));
        assert!(token.is_expired(expires_at));
    }

    #[test]
    fn extending_never_shortens_a_token() {
        let far_future = OffsetDateTime::now_utc() + Duration::days(30);
        let token = Token {
            user_id: UserID::new(1),
            expires_at: far_future,
        };

        let extended = token.extended(Duration::minutes(5)).unwrap();

        assert_eq!(extended.expires_at, far_future);
        assert_eq!(extended.user_id, token.user_id);
    }

    #[test]
    fn overflowing_expiry_is_an_error() {
        assert!(matches!(
            Token::new(UserID::new(1), Duration::MAX),
            Err(Error::InvalidDateFormat(_))
        ));
    }
}
