use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// A pending verification code. At most one exists per phone number.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OneTimeCode {
    pub phone_number: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whole minutes left before expiry, never negative.
    pub fn minutes_left(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_minutes().max(0)
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl OneTimeCode {
    /// Store `code` for `phone_number`, replacing any previous code atomically.
    pub async fn issue(
        phone_number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self> {
        let record = sqlx::query_as::<_, OneTimeCode>(
            r#"
            INSERT INTO otp_codes (phone_number, code, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (phone_number) DO UPDATE SET
                code = EXCLUDED.code,
                created_at = NOW(),
                expires_at = EXCLUDED.expires_at
            RETURNING *
            "#,
        )
        .bind(phone_number)
        .bind(code)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    /// Delete the record matching both phone and code, returning it.
    ///
    /// A matching record is removed whether or not it has expired; a
    /// mismatching code leaves the stored one untouched.
    pub async fn consume(phone_number: &str, code: &str, pool: &PgPool) -> Result<Option<Self>> {
        let record = sqlx::query_as::<_, OneTimeCode>(
            "DELETE FROM otp_codes WHERE phone_number = $1 AND code = $2 RETURNING *",
        )
        .bind(phone_number)
        .bind(code)
        .fetch_optional(pool)
        .await?;
        Ok(record)
    }

    /// Unexpired code for a number, without consuming it.
    pub async fn find_active(phone_number: &str, pool: &PgPool) -> Result<Option<Self>> {
        let record = sqlx::query_as::<_, OneTimeCode>(
            "SELECT * FROM otp_codes WHERE phone_number = $1 AND expires_at > NOW()",
        )
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_minutes_left() {
        let now = Utc::now();
        let record = OneTimeCode {
            phone_number: "+998901234567".to_string(),
            code: "123456".to_string(),
            created_at: now,
            expires_at: now + Duration::seconds(299),
        };
        assert_eq!(record.minutes_left(now), 4);
        assert!(!record.is_expired_at(now));
        assert_eq!(record.minutes_left(now + Duration::minutes(10)), 0);
        assert!(record.is_expired_at(now + Duration::minutes(10)));
    }
}
