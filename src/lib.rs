//! techind: technical analysis indicators over time-indexed bar series.
//!
//! Hexagonal architecture: indicators and expression parsing in [`domain`],
//! port traits in [`ports`], CSV and INI implementations in [`adapters`],
//! and the command line front end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
