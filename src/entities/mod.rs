//! Entity module - Contains all SeaORM entity definitions for the store.
//! These entities replace the per-screen seed arrays with one normalized store keyed by id.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod brand;
pub mod customer;
pub mod ecu_file;
pub mod service_cost;
pub mod setting;
pub mod token_package;
pub mod token_transaction;

// Re-export specific types to avoid conflicts
pub use brand::{Column as BrandColumn, Entity as Brand, Model as BrandModel};
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use ecu_file::{Column as EcuFileColumn, Entity as EcuFile, Model as EcuFileModel};
pub use service_cost::{
    Column as ServiceCostColumn, Entity as ServiceCost, Model as ServiceCostModel,
};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
pub use token_package::{
    Column as TokenPackageColumn, Entity as TokenPackage, Model as TokenPackageModel,
};
pub use token_transaction::{
    Column as TokenTransactionColumn, Entity as TokenTransaction, Model as TokenTransactionModel,
};
