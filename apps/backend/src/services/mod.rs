//! Backend services

pub mod import;
pub mod lexical;
pub mod refresh;
pub mod spreadsheet;
