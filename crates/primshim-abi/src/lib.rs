// Classifier exports take plain character values and the sequence exports
// validate through the ledger before any dereference; safety docs live on the
// pointer-taking entry points only.
#![allow(clippy::missing_safety_doc)]
//! # primshim-abi
//!
//! `extern "C"` boundary exposing the character and sequence primitives a
//! host language runtime binds as native functions.
//!
//! This crate produces a `cdylib` with the symbols `char_ord`, `is_digit`,
//! `is_lower`, `is_upper`, `is_alphanum`, `string_cons`, and `string_free`.
//! Each entry point validates its arguments against the sequence custody
//! ledger before delegating to the safe implementations in `primshim-core`.
//!
//! # Architecture
//!
//! ```text
//! host runtime -> ABI entry (this crate) -> ledger verdict -> core impl -> return
//! ```
//!
//! In **strict** mode, invalid sequence arguments produce an explicit null
//! return, never a silent rewrite.
//!
//! In **hardened** mode, the boundary additionally applies deterministic
//! repairs (substitute empty, truncate scan) and counts every one.

pub mod chars_abi;
pub mod driver;
pub mod seq_abi;
pub mod util;
