//! Recommends which small business to open in a vacant house (akiya) by
//! scoring market potential and projecting monthly financials.

pub mod app;
pub mod config;
pub mod domain;
pub mod infra;
pub mod output;
pub mod util;
