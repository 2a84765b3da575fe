//! Use-case services built on top of repository contracts.

pub mod catalog_service;
