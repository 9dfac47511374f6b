//! # primshim-core
//!
//! Safe Rust implementations of the character and sequence primitives the
//! host runtime binds as native functions.
//!
//! Everything here is a pure function over bytes and slices. No `unsafe`
//! code is permitted at the crate level; raw-pointer handling lives in
//! `primshim-abi`.

#![deny(unsafe_code)]

pub mod chars;
pub mod seq;
