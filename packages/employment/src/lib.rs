// ABOUTME: Employment status records
// ABOUTME: Ordered status list plus usage distribution across members

pub mod storage;
pub mod types;

pub use storage::EmploymentStatusStorage;
pub use types::{
    EmploymentStatus, EmploymentStatusCreateInput, EmploymentStatusUpdateInput, StatusUsage,
    EMPLOYMENT_STATUS_RULES,
};
