//! Store settings edited from the admin settings screen.
//!
//! Values live in the `settings` key/value table. Only known keys can be written, and each
//! value is checked against its key before it is stored.

use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use tracing::info;

use crate::{
    config::StorefrontConfig,
    entities::{Setting, setting},
    errors::{Error, Result},
};

/// Keys the settings screen knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    SiteName,
    CompanyName,
    SupportEmail,
    Currency,
    SessionTimeoutMinutes,
}

impl SettingKey {
    /// Every key, in screen order.
    pub const ALL: [Self; 5] = [
        Self::SiteName,
        Self::CompanyName,
        Self::SupportEmail,
        Self::Currency,
        Self::SessionTimeoutMinutes,
    ];

    /// Storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SiteName => "site_name",
            Self::CompanyName => "company_name",
            Self::SupportEmail => "support_email",
            Self::Currency => "currency",
            Self::SessionTimeoutMinutes => "session_timeout_minutes",
        }
    }

    /// Looks a key up by its storage name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let key = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Normalizes and checks a value for this key.
    fn normalize(self, raw: &str) -> Result<String> {
        let value = raw.trim();
        let field = "value";
        match self {
            Self::SiteName | Self::CompanyName => {
                if value.is_empty() {
                    return Err(Error::invalid(field, "Value cannot be empty"));
                }
                Ok(value.to_string())
            }
            Self::SupportEmail => {
                let valid = value
                    .split_once('@')
                    .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
                if !valid {
                    return Err(Error::invalid(field, "Support email is not valid"));
                }
                Ok(value.to_lowercase())
            }
            Self::Currency => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(Error::invalid(
                        field,
                        "Currency must be a three-letter code",
                    ));
                }
                Ok(value.to_uppercase())
            }
            Self::SessionTimeoutMinutes => match value.parse::<u32>() {
                Ok(minutes) if (5..=1440).contains(&minutes) => Ok(minutes.to_string()),
                _ => Err(Error::invalid(
                    field,
                    "Session timeout must be between 5 and 1440 minutes",
                )),
            },
        }
    }
}

/// Value of a setting, if it was ever stored.
pub async fn get_setting(db: &DatabaseConnection, key: SettingKey) -> Result<Option<String>> {
    Ok(Setting::find()
        .filter(setting::Column::Key.eq(key.as_str()))
        .one(db)
        .await?
        .map(|s| s.value))
}

async fn upsert<C: ConnectionTrait>(db: &C, key: SettingKey, value: String) -> Result<setting::Model> {
    let now = Utc::now();
    let existing = Setting::find()
        .filter(setting::Column::Key.eq(key.as_str()))
        .one(db)
        .await?;

    let saved = if let Some(current) = existing {
        let mut active: setting::ActiveModel = current.into();
        active.value = Set(value);
        active.updated_at = Set(now);
        active.update(db).await?
    } else {
        setting::ActiveModel {
            key: Set(key.as_str().to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };
    Ok(saved)
}

/// Validates and stores a setting.
pub async fn set_setting(
    db: &DatabaseConnection,
    key: SettingKey,
    value: &str,
) -> Result<setting::Model> {
    let value = key.normalize(value)?;
    let saved = upsert(db, key, value).await?;
    info!(key = %saved.key, value = %saved.value, "Updated setting");
    Ok(saved)
}

/// All stored settings, by key.
pub async fn list_settings(db: &DatabaseConnection) -> Result<Vec<setting::Model>> {
    Setting::find()
        .order_by_asc(setting::Column::Key)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Writes config defaults for every key that has no stored value yet.
pub async fn seed_settings(db: &DatabaseConnection, defaults: &StorefrontConfig) -> Result<usize> {
    let mut written = 0;
    for key in SettingKey::ALL {
        if get_setting(db, key).await?.is_some() {
            continue;
        }
        let value = match key {
            SettingKey::SiteName => defaults.site_name.clone(),
            SettingKey::CompanyName => defaults.company_name.clone(),
            SettingKey::SupportEmail => defaults.support_email.clone(),
            SettingKey::Currency => defaults.currency.clone(),
            SettingKey::SessionTimeoutMinutes => defaults.session_timeout_minutes.to_string(),
        };
        upsert(db, key, key.normalize(&value)?).await?;
        written += 1;
    }
    Ok(written)
}
