//! Checks that need no injection surface: response headers and
//! response-body signatures.

pub mod clickjacking;
pub mod signature;
