//! Token purchase flow.
//!
//! Each customer walks a linear state machine:
//! `idle -> package_selected -> payment_method_selected -> processing -> complete`, and
//! `reset` returns to `idle`. While a purchase is `processing`, every other request for that
//! customer is refused with [`Error::PurchaseInProgress`].
//!
//! Completing a purchase writes one `purchase` row to the ledger. The balance shown to the
//! customer is read back from the ledger.

use std::{collections::HashMap, time::Duration};

use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    core::{
        catalog::{self, PaymentMethod},
        customer,
        ledger::{self, NewTransaction},
        today,
    },
    entities::{customer as customer_entity, token_package},
    errors::{Error, Result},
};

/// Where a customer is in the checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PurchaseState {
    #[default]
    Idle,
    PackageSelected {
        package: token_package::Model,
    },
    PaymentMethodSelected {
        package: token_package::Model,
        method: PaymentMethod,
    },
    Processing {
        package: token_package::Model,
        method: PaymentMethod,
    },
    Complete {
        package: token_package::Model,
        method: PaymentMethod,
        #[serde(rename = "transactionId")]
        transaction_id: i64,
        balance: i64,
    },
}

impl PurchaseState {
    /// Snake-case state name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PackageSelected { .. } => "package_selected",
            Self::PaymentMethodSelected { .. } => "payment_method_selected",
            Self::Processing { .. } => "processing",
            Self::Complete { .. } => "complete",
        }
    }

    fn refuse(&self, action: &'static str) -> Error {
        match self {
            Self::Processing { .. } => Error::PurchaseInProgress,
            _ => Error::PurchaseState {
                action,
                state: self.name(),
            },
        }
    }

    /// Picks (or changes) the package. Refused once processing has started.
    pub fn select_package(&self, package: token_package::Model) -> Result<Self> {
        match self {
            Self::Idle | Self::PackageSelected { .. } | Self::PaymentMethodSelected { .. } => {
                Ok(Self::PackageSelected { package })
            }
            _ => Err(self.refuse("select a package")),
        }
    }

    /// Picks (or changes) the payment method. Requires a package.
    pub fn select_payment_method(&self, method: PaymentMethod) -> Result<Self> {
        match self {
            Self::PackageSelected { package } | Self::PaymentMethodSelected { package, .. } => {
                Ok(Self::PaymentMethodSelected {
                    package: package.clone(),
                    method,
                })
            }
            _ => Err(self.refuse("select a payment method")),
        }
    }

    /// Enters `processing`. This is the in-flight guard.
    pub fn begin_processing(&self) -> Result<Self> {
        match self {
            Self::PaymentMethodSelected { package, method } => Ok(Self::Processing {
                package: package.clone(),
                method: *method,
            }),
            _ => Err(self.refuse("confirm the purchase")),
        }
    }

    /// Settles a processing purchase.
    pub fn complete(&self, transaction_id: i64, balance: i64) -> Result<Self> {
        match self {
            Self::Processing { package, method } => Ok(Self::Complete {
                package: package.clone(),
                method: *method,
                transaction_id,
                balance,
            }),
            _ => Err(Error::PurchaseState {
                action: "complete the purchase",
                state: self.name(),
            }),
        }
    }

    /// Returns a failed purchase to the confirmation step so it can be retried.
    #[must_use]
    pub fn abort(&self) -> Self {
        match self {
            Self::Processing { package, method } => Self::PaymentMethodSelected {
                package: package.clone(),
                method: *method,
            },
            other => other.clone(),
        }
    }

    /// Back to `idle` from anywhere except `processing`.
    pub fn reset(&self) -> Result<Self> {
        match self {
            Self::Processing { .. } => Err(Error::PurchaseInProgress),
            _ => Ok(Self::Idle),
        }
    }
}

/// Holds every customer's checkout and serializes changes to it.
#[derive(Debug)]
pub struct PurchaseDesk {
    flows: Mutex<HashMap<i64, PurchaseState>>,
    settle_delay: Duration,
}

impl PurchaseDesk {
    /// Creates a desk whose simulated payments take `settle_delay`.
    #[must_use]
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            flows: Mutex::new(HashMap::new()),
            settle_delay,
        }
    }

    /// Current state for a customer; `idle` if they never started.
    pub async fn state(&self, customer_id: i64) -> PurchaseState {
        self.flows
            .lock()
            .await
            .get(&customer_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn advance(
        &self,
        customer_id: i64,
        step: impl FnOnce(&PurchaseState) -> Result<PurchaseState>,
    ) -> Result<PurchaseState> {
        let mut flows = self.flows.lock().await;
        let current = flows.get(&customer_id).cloned().unwrap_or_default();
        let next = step(&current)?;
        flows.insert(customer_id, next.clone());
        Ok(next)
    }

    /// Selects a package by id.
    pub async fn select_package(
        &self,
        db: &DatabaseConnection,
        customer_id: i64,
        package_id: i64,
    ) -> Result<PurchaseState> {
        customer::require_customer(db, customer_id).await?;
        let package = catalog::get_package(db, package_id).await?;
        self.advance(customer_id, |state| state.select_package(package))
            .await
    }

    /// Selects the payment method.
    pub async fn select_payment_method(
        &self,
        customer_id: i64,
        method: PaymentMethod,
    ) -> Result<PurchaseState> {
        self.advance(customer_id, |state| state.select_payment_method(method))
            .await
    }

    /// Runs the simulated payment and credits the tokens.
    ///
    /// The lock is not held while the payment settles, so a concurrent confirm for the same
    /// customer sees `processing` and fails with `PurchaseInProgress`.
    #[instrument(skip(self, db))]
    pub async fn confirm(&self, db: &DatabaseConnection, customer_id: i64) -> Result<PurchaseState> {
        let processing = self
            .advance(customer_id, PurchaseState::begin_processing)
            .await?;
        let PurchaseState::Processing { package, method } = &processing else {
            return Err(Error::PurchaseState {
                action: "confirm the purchase",
                state: processing.name(),
            });
        };

        tokio::time::sleep(self.settle_delay).await;
        let settled = settle(db, customer_id, package, *method).await;

        let mut flows = self.flows.lock().await;
        match settled {
            Ok((transaction_id, balance)) => {
                let complete = processing.complete(transaction_id, balance)?;
                flows.insert(customer_id, complete.clone());
                info!(
                    customer_id,
                    package = %package.name,
                    tokens = package.tokens,
                    balance,
                    "Token purchase complete"
                );
                Ok(complete)
            }
            Err(e) => {
                warn!(customer_id, error = %e, "Token purchase failed");
                flows.insert(customer_id, processing.abort());
                Err(e)
            }
        }
    }

    /// Starts over.
    pub async fn reset(&self, customer_id: i64) -> Result<PurchaseState> {
        self.advance(customer_id, PurchaseState::reset).await
    }
}

async fn settle(
    db: &DatabaseConnection,
    customer_id: i64,
    package: &token_package::Model,
    method: PaymentMethod,
) -> Result<(i64, i64)> {
    let txn = db.begin().await?;

    let row = ledger::insert_checked(
        &txn,
        NewTransaction::purchase(customer_id, package.tokens)
            .method(method.as_str())
            .package(package.id),
    )
    .await?;

    let buyer = customer::require_customer(&txn, customer_id).await?;
    let spent = buyer.total_spent_cents + package.price_cents;
    let mut active: customer_entity::ActiveModel = buyer.into();
    active.total_spent_cents = Set(spent);
    active.last_active = Set(today());
    active.update(&txn).await?;

    let balance = ledger::balance(&txn, customer_id).await?;
    txn.commit().await?;
    Ok((row.id, balance))
}
