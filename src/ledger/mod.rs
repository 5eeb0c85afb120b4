//! Ledger documents and the desk that submits them

pub mod account;
pub mod balance;
pub mod desk;
pub mod document;
pub mod entry;
pub mod expense;
pub mod invoice;

pub use account::AccountManager;
pub use balance::*;
pub use desk::*;
pub use document::*;
pub use expense::*;
pub use invoice::*;
