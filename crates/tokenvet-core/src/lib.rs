//! Input validation and injection defense for registry submissions.
//!
//! Every record reaching this crate comes from an anonymous third party and
//! is treated as adversarial. The crate provides five independently testable
//! validators:
//!
//! - [`safe_json`] — pollution-safe JSON parsing with byte-size ceilings
//! - [`address`] — EIP-55 address format/checksum/directory validation
//! - [`urls`] — SSRF-safe URL validation (format, blocked hosts, port pinning)
//! - [`paths`] — filename/identifier safety and contained path construction
//! - [`abi`] / [`solidity`] — structural validation of contract artifacts
//!
//! No validator ever dereferences a URL or writes to the file system, and no
//! validator panics on expected-invalid input: format and policy violations
//! are resolved into a [`Validation`] record, never thrown. Only resource
//! failures (missing file, oversize file, malformed JSON at the read
//! boundary) surface as [`ValidatorError`].
//!
//! # Quick Start
//!
//! ```
//! use tokenvet_core::address;
//!
//! let dir = "0x00c1E515EA9579856304198EFb15f525A0bb50f6";
//! let result = address::validate_checksum(dir, "token");
//! assert!(result.valid);
//! assert_eq!(result.value.as_deref(), Some(dir));
//! ```

pub mod abi;
pub mod address;
pub mod error;
pub mod limits;
pub mod paths;
pub mod result;
pub mod safe_json;
pub mod solidity;
pub mod urls;

pub use error::{ValidatorError, ValidatorResult};
pub use result::Validation;
