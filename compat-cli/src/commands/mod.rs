//! Command implementations for the compat CLI

pub mod check;
