//! Predicate builder for catalog searches.
//!
//! # Responsibility
//! - Compose typed, parameter-bound filters from all-optional criteria.
//! - Keep user input out of query text.

pub mod criteria;
pub mod filter;
