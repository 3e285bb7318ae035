//! Academic results analysis for a school counseling office: results-sheet
//! import, class statistics, intervention lists and printable reports.

pub mod analysis;
pub mod attendance;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod import;
pub mod insight;
pub mod models;
pub mod print;
pub mod report;
pub mod roster;
pub mod statistics;
pub mod transcript;
