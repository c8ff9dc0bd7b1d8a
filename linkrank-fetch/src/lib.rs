pub mod client;
pub mod error;
pub mod response;

pub use client::{ClientConfig, WikiClient, MAX_BATCH_TITLES};
pub use error::FetchError;
pub use response::{PageLink, PageSummary};
