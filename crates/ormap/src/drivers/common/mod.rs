//! Functionality shared across dialect implementations.
//!
//! - [`base`]: default DDL and existence-check builders
//! - [`filter`]: SQL text filters (placeholders, quoting, primary key)
//! - [`dsn`]: percent-decoding for URL-form connection strings

pub mod base;
pub mod dsn;
pub mod filter;

pub use filter::{apply_filters, convert_question_marks, IdFilter, QuoteFilter, SeqFilter};
