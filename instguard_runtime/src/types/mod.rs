//! Function objects and the qualified-name paths they carry.

pub mod function;
pub mod qualname;
