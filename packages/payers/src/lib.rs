// ABOUTME: Payer records for dues collection
// ABOUTME: Provides types and storage layer for payers

pub mod storage;
pub mod types;

pub use storage::PayerStorage;
pub use types::{Payer, PayerCreateInput, PayerFilter, PayerUpdateInput, PAYER_RULES};
