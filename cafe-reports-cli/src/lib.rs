//! Daily report workbooks for a chain of coffee shops: parsing and storage

pub mod cli;
pub mod config;
pub mod import;
pub mod store;
pub mod workbook;
