//! Core domain types and logic.

pub mod accessor;
pub mod error;
pub mod indicator;
pub mod indicator_helpers;
pub mod indicator_parser;
pub mod ohlcv;
