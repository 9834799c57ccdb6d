//! Configuration and the data carried through one invocation

pub mod config;
pub mod models;
