//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Customer management commands
pub mod customers;

/// Back-office feature catalog command
pub mod features;

/// ECU file moderation commands
pub mod files;

/// General utility commands
pub mod general;

/// Store settings commands
pub mod settings;

/// Token package, service and ledger commands
pub mod tokens;

// Export commands
pub use customers::*;
pub use features::*;
pub use files::*;
pub use general::*;
pub use settings::*;
pub use tokens::*;
