//! Core domain types and logic.

pub mod command;
pub mod command_parser;
pub mod error;
pub mod evaluator;
pub mod market;
pub mod ohlcv;
pub mod settings;
