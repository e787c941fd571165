//! Unified exit codes. These are part of the public contract.

pub const SUCCESS: i32 = 0;
pub const VALIDATION_FAILED: i32 = 1; // At least one submission was rejected
pub const INTERNAL_ERROR: i32 = 2; // Setup/config/I-O failure
