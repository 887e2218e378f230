use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Utc};

/// A registered account that can own trades.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Model {
    /// The unique identifier for the user.
    pub id: i64,
    /// The username of the user.
    pub username: String,
    /// The email of the user.
    pub email: String,
    /// The hashed password of the user. (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The time the user was created.
    pub created_at: DateTime<Utc>,
    /// The time the user last logged in.
    pub last_login_at: DateTime<Utc>,
}

impl Model {
    /// Uses argon2 to verify the password hash against the provided password.
    pub fn verify_password(&self, password: &str) -> bool {
        let hash = match PasswordHash::new(&self.password_hash) {
            Ok(hash) => hash,
            Err(err) => {
                tracing::error!("failed to parse password hash: {}", err);
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok()
    }
}

/// Field set required to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Generates a new password hash using argon2.
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("failed to hash password");

    hash.to_string()
}

/// Validates a username.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters long");
    }

    if username.len() > 20 {
        return Err("Username must be at most 20 characters long");
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("Username must only contain alphanumeric characters and underscores");
    }

    Ok(())
}

/// Validates a password.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long");
    }

    if password.len() > 100 {
        return Err("Password must be at most 100 characters long");
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase character");
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase character");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit");
    }

    Ok(())
}

/// Validates an email.
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() < 5 {
        return Err("Email must be at least 5 characters long");
    }

    if email.len() > 100 {
        return Err("Email must be at most 100 characters long");
    }

    if !email_address::EmailAddress::is_valid(email) {
        return Err("Email is not a valid email address");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let user = Model {
            id: 1,
            username: "driller".to_string(),
            email: "driller@example.com".to_string(),
            password_hash: hash_password("Password1"),
            created_at: Utc::now(),
            last_login_at: Utc::now(),
        };

        assert!(user.verify_password("Password1"));
        assert!(!user.verify_password("Password2"));
    }

    #[test]
    fn test_verify_garbage_hash() {
        let user = Model {
            id: 1,
            username: "driller".to_string(),
            email: "driller@example.com".to_string(),
            password_hash: "not a phc string".to_string(),
            created_at: Utc::now(),
            last_login_at: Utc::now(),
        };

        assert!(!user.verify_password("Password1"));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("driller").is_ok());
        assert!(validate_username("dr").is_err());
        assert!(validate_username("driller with spaces").is_err());
        assert!(validate_username(&"d".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password1").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("driller@example.com").is_ok());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("not-an-email").is_err());
    }
}
