//! Route modules

pub mod execution;
