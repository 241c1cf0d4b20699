//! Admin identity loaded from environment variables.
//!
//! Nothing about the admin account is compiled in. The login endpoint stays disabled
//! until `ADMIN_EMAIL` and `ADMIN_PASSWORD_HASH` are set, and Discord commands only
//! answer to user ids listed in `ADMIN_DISCORD_IDS`.

use std::collections::HashSet;

/// Admin account and Discord allowlist
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    /// Login e-mail of the admin account
    pub email: Option<String>,
    /// Display name returned after login
    pub name: String,
    /// Argon2 PHC string of the admin password
    pub password_hash: Option<String>,
    /// Discord user ids allowed to run back-office commands
    pub discord_ids: HashSet<String>,
}

impl AdminConfig {
    /// Reads `ADMIN_EMAIL`, `ADMIN_NAME`, `ADMIN_PASSWORD_HASH` and `ADMIN_DISCORD_IDS`.
    #[must_use]
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        Self {
            email: non_empty("ADMIN_EMAIL"),
            name: non_empty("ADMIN_NAME").unwrap_or_else(|| "Admin User".to_string()),
            password_hash: non_empty("ADMIN_PASSWORD_HASH"),
            discord_ids: non_empty("ADMIN_DISCORD_IDS")
                .map(|ids| parse_id_list(&ids))
                .unwrap_or_default(),
        }
    }

    /// Whether the HTTP login can succeed at all.
    #[must_use]
    pub const fn login_enabled(&self) -> bool {
        self.email.is_some() && self.password_hash.is_some()
    }

    /// Whether a Discord user may run admin commands.
    #[must_use]
    pub fn is_discord_admin(&self, user_id: &str) -> bool {
        self.discord_ids.contains(user_id)
    }
}

/// Splits a comma separated id list, ignoring blanks.
#[must_use]
pub fn parse_id_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list_skips_blanks() {
        let ids = parse_id_list(" 123, ,456,,");
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("123"));
        assert!(ids.contains("456"));
    }

    #[test]
    fn test_login_disabled_without_hash() {
        let config = AdminConfig {
            email: Some("admin@example.com".to_string()),
            ..AdminConfig::default()
        };
        assert!(!config.login_enabled());
    }

    #[test]
    fn test_discord_allowlist() {
        let config = AdminConfig {
            discord_ids: parse_id_list("42"),
            ..AdminConfig::default()
        };
        assert!(config.is_discord_admin("42"));
        assert!(!config.is_discord_admin("43"));
    }
}
