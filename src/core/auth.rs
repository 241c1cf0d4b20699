//! Admin login against an argon2 password hash taken from the environment.
//!
//! There is no session store: a successful login returns the sanitized admin user and
//! logout is a no-op on the server.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::AdminConfig,
    errors::{Error, FieldError, Result},
};

/// Role carried by a logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// The user object handed back after login. Never contains credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Hashes a password with argon2id and a random salt, producing a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a password against a PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Validates admin credentials.
///
/// Missing fields are field errors. A wrong email and a wrong password produce the same
/// `InvalidCredentials`, and the password is checked even when the email is wrong.
pub fn verify_login(admin: &AdminConfig, email: &str, password: &str) -> Result<SessionUser> {
    let email = email.trim();
    let mut missing = Vec::new();
    if email.is_empty() {
        missing.push(FieldError::new("email", "Email is required"));
    }
    if password.is_empty() {
        missing.push(FieldError::new("password", "Password is required"));
    }
    if !missing.is_empty() {
        return Err(Error::Validation(missing));
    }

    let (Some(admin_email), Some(hash)) = (&admin.email, &admin.password_hash) else {
        warn!("Login attempted while admin login is not configured");
        return Err(Error::LoginDisabled);
    };

    let email_matches = admin_email.eq_ignore_ascii_case(email);
    let password_matches = verify_password(password, hash)?;

    if email_matches && password_matches {
        info!("Admin logged in");
        Ok(SessionUser {
            id: "admin".to_string(),
            email: admin_email.clone(),
            name: admin.name.clone(),
            role: Role::Admin,
        })
    } else {
        warn!("Rejected admin login");
        Err(Error::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn admin_with(password: &str) -> AdminConfig {
        AdminConfig {
            email: Some("admin@autotechno.com".to_string()),
            name: "Admin User".to_string(),
            password_hash: Some(hash_password(password).unwrap()),
            ..AdminConfig::default()
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_login_success_is_sanitized() {
        let admin = admin_with("s3cret-pass");
        let user = verify_login(&admin, " Admin@AutoTechno.com ", "s3cret-pass").unwrap();
        assert_eq!(user.email, "admin@autotechno.com");
        assert_eq!(user.role, Role::Admin);

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_wrong_email_or_password_same_error() {
        let admin = admin_with("s3cret-pass");
        let wrong_password = verify_login(&admin, "admin@autotechno.com", "nope").unwrap_err();
        let wrong_email = verify_login(&admin, "root@autotechno.com", "s3cret-pass").unwrap_err();
        assert_eq!(wrong_password.to_string(), wrong_email.to_string());
        assert!(matches!(wrong_email, Error::InvalidCredentials));
    }

    #[test]
    fn test_missing_fields_and_disabled_login() {
        let admin = admin_with("s3cret-pass");
        assert!(matches!(
            verify_login(&admin, "", "").unwrap_err(),
            Error::Validation(errors) if errors.len() == 2
        ));
        assert!(matches!(
            verify_login(&AdminConfig::default(), "a@b.c", "pw").unwrap_err(),
            Error::LoginDisabled
        ));
    }
}
