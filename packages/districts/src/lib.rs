// ABOUTME: District records for the member administration
// ABOUTME: Provides types and storage layer for region-scoped districts

pub mod storage;
pub mod types;

// Re-export main types
pub use storage::DistrictStorage;
pub use types::{
    District, DistrictCreateInput, DistrictFilter, DistrictUpdateInput, DropdownOption,
    DISTRICT_RULES,
};
