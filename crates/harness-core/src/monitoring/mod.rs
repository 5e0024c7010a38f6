//! Monitoring of submitted transactions and of an address's history.

pub mod confirmation;
pub mod scanner;

pub use confirmation::ConfirmationMonitor;
pub use scanner::TransactionScanner;
