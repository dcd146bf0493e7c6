//! Data models for the extraction pipeline.

pub mod account;
pub mod collection;
pub mod config;
pub mod invoice;
pub mod transaction;

pub use account::{Account, OwnerAccount};
pub use collection::{SortField, TransactionCollection};
pub use config::{Checkpoint, ConfigFile, Configuration, DateWindow, InstituteConfig, OwnerConfig};
pub use invoice::Invoice;
pub use transaction::{Dictionary, Transaction, TransactionBuilder};
