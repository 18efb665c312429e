pub mod config;
pub mod logging;

pub mod checksum;
pub mod coordinator;
pub mod driver;
pub mod error;
pub mod fetch;
pub mod ledger;
pub mod locator;
pub mod probe;
pub mod progress;
pub mod resolver;
pub mod ticker;
pub mod url_model;

pub use driver::{BatchReport, Downloader, FetchReport};
pub use ledger::{AttemptRecord, AttemptStatus, Ledger, LedgerStats};
pub use locator::ResourceLocator;
