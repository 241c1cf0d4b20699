//! Storefront catalog: vehicle brands, token packages, service costs and payment methods.

use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::{
    entities::{
        Brand, ServiceCost, TokenPackage, brand, service_cost, token_package,
    },
    errors::{Error, FieldError, Result},
};

/// How a customer pays for a token package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    /// Every accepted method, in checkout order.
    pub const ALL: [Self; 3] = [Self::CreditCard, Self::Paypal, Self::BankTransfer];

    /// Wire and storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank_transfer",
        }
    }

    /// Checkout label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::Paypal => "PayPal",
            Self::BankTransfer => "Bank Transfer",
        }
    }

    /// Accepts keys (`credit_card`) and labels (`Credit Card`), any case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let key = value.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|m| m.as_str() == key)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// All brands, featured first, then by name.
pub async fn list_brands(db: &DatabaseConnection) -> Result<Vec<brand::Model>> {
    Brand::find()
        .order_by_desc(brand::Column::Featured)
        .order_by_asc(brand::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a brand by its slug.
pub async fn get_brand(db: &DatabaseConnection, brand_id: &str) -> Result<Option<brand::Model>> {
    Brand::find_by_id(brand_id.trim().to_lowercase())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Token packages, smallest first.
pub async fn list_packages(db: &DatabaseConnection) -> Result<Vec<token_package::Model>> {
    TokenPackage::find()
        .order_by_asc(token_package::Column::Tokens)
        .order_by_asc(token_package::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a package by id, failing with `PackageNotFound`.
pub async fn get_package(db: &DatabaseConnection, package_id: i64) -> Result<token_package::Model> {
    TokenPackage::find_by_id(package_id)
        .one(db)
        .await?
        .ok_or(Error::PackageNotFound { id: package_id })
}

/// Finds a package by name, case-insensitively.
pub async fn get_package_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<token_package::Model>> {
    let wanted = name.trim().to_lowercase();
    Ok(list_packages(db)
        .await?
        .into_iter()
        .find(|p| p.name.to_lowercase() == wanted))
}

/// Package form shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDraft {
    pub name: String,
    pub tokens: i64,
    pub price_cents: i64,
    #[serde(default)]
    pub discount_percentage: i32,
    #[serde(default)]
    pub popular: bool,
}

impl PackageDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Package name is required"));
        }
        if self.tokens <= 0 {
            errors.push(FieldError::new("tokens", "Tokens must be greater than zero"));
        }
        if self.price_cents < 0 {
            errors.push(FieldError::new("price", "Price cannot be negative"));
        }
        if !(0..=100).contains(&self.discount_percentage) {
            errors.push(FieldError::new(
                "discountPercentage",
                "Discount must be between 0 and 100",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Adds a token package.
pub async fn create_package(
    db: &DatabaseConnection,
    draft: PackageDraft,
) -> Result<token_package::Model> {
    draft.validate()?;
    if get_package_by_name(db, &draft.name).await?.is_some() {
        return Err(Error::invalid("name", "A package with this name already exists"));
    }

    let package = token_package::ActiveModel {
        name: Set(draft.name.trim().to_string()),
        tokens: Set(draft.tokens),
        price_cents: Set(draft.price_cents),
        discount_percentage: Set(draft.discount_percentage),
        popular: Set(draft.popular),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(package_id = package.id, name = %package.name, "Created token package");
    Ok(package)
}

/// Replaces a package's fields.
pub async fn update_package(
    db: &DatabaseConnection,
    package_id: i64,
    draft: PackageDraft,
) -> Result<token_package::Model> {
    draft.validate()?;
    let existing = get_package(db, package_id).await?;
    if let Some(clash) = get_package_by_name(db, &draft.name).await? {
        if clash.id != package_id {
            return Err(Error::invalid("name", "A package with this name already exists"));
        }
    }

    let mut package: token_package::ActiveModel = existing.into();
    package.name = Set(draft.name.trim().to_string());
    package.tokens = Set(draft.tokens);
    package.price_cents = Set(draft.price_cents);
    package.discount_percentage = Set(draft.discount_percentage);
    package.popular = Set(draft.popular);

    let updated = package.update(db).await?;
    info!(package_id, "Updated token package");
    Ok(updated)
}

/// Service price list, cheapest first.
pub async fn list_services(db: &DatabaseConnection) -> Result<Vec<service_cost::Model>> {
    ServiceCost::find()
        .order_by_asc(service_cost::Column::Cost)
        .order_by_asc(service_cost::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a service by key (`ecu_decrypt`, ...).
pub async fn get_service_by_key(
    db: &DatabaseConnection,
    key: &str,
) -> Result<Option<service_cost::Model>> {
    ServiceCost::find()
        .filter(service_cost::Column::Key.eq(key.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a service by key, failing with `ServiceNotFound`.
pub async fn require_service(db: &DatabaseConnection, key: &str) -> Result<service_cost::Model> {
    get_service_by_key(db, key)
        .await?
        .ok_or_else(|| Error::ServiceNotFound {
            key: key.to_string(),
        })
}

/// Changes the token cost of a service.
pub async fn update_service_cost(
    db: &DatabaseConnection,
    key: &str,
    cost: i64,
) -> Result<service_cost::Model> {
    if cost <= 0 {
        return Err(Error::invalid("cost", "Cost must be at least one token"));
    }
    let mut service: service_cost::ActiveModel = require_service(db, key).await?.into();
    service.cost = Set(cost);
    let updated = service.update(db).await?;
    info!(key = %updated.key, cost, "Updated service cost");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::test_utils::*;

    fn draft(name: &str, tokens: i64, price_cents: i64, discount: i32) -> PackageDraft {
        PackageDraft {
            name: name.to_string(),
            tokens,
            price_cents,
            discount_percentage: discount,
            popular: false,
        }
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("credit_card"), Some(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::parse("PayPal"), Some(PaymentMethod::Paypal));
        assert_eq!(PaymentMethod::parse("Bank Transfer"), Some(PaymentMethod::BankTransfer));
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
    }

    #[tokio::test]
    async fn test_package_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_package(&db, draft(" ", 0, -1, 101)).await;
        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "tokens", "price", "discountPercentage"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_seeded_catalog() -> Result<()> {
        let db = setup_seeded_db().await?;

        let packages = list_packages(&db).await?;
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Basic", "Standard", "Professional", "Enterprise"]);
        assert!(packages[1].popular);

        let standard = get_package_by_name(&db, "standard").await?.unwrap();
        assert_eq!(standard.tokens, 50);
        assert_eq!(standard.price_cents, 3999);

        let services = list_services(&db).await?;
        assert_eq!(services.len(), 5);
        assert_eq!(services[0].key, "ecu_decrypt");

        let bmw = get_brand(&db, "BMW").await?.unwrap();
        assert_eq!(bmw.name, "BMW");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_update_package() -> Result<()> {
        let db = setup_seeded_db().await?;

        let starter = create_package(&db, draft("Starter", 5, 499, 0)).await?;
        assert_eq!(starter.tokens, 5);

        assert!(matches!(
            create_package(&db, draft("BASIC", 5, 499, 0)).await.unwrap_err(),
            Error::Validation(_)
        ));

        let updated = update_package(&db, starter.id, draft("Starter", 6, 549, 5)).await?;
        assert_eq!(updated.tokens, 6);
        assert_eq!(updated.discount_percentage, 5);

        assert!(matches!(
            update_package(&db, 999, draft("Ghost", 1, 1, 0)).await.unwrap_err(),
            Error::PackageNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_service_cost() -> Result<()> {
        let db = setup_seeded_db().await?;

        let updated = update_service_cost(&db, "special_files", 12).await?;
        assert_eq!(updated.cost, 12);

        assert!(matches!(
            update_service_cost(&db, "special_files", 0).await.unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            update_service_cost(&db, "nope", 3).await.unwrap_err(),
            Error::ServiceNotFound { .. }
        ));
        Ok(())
    }
}
