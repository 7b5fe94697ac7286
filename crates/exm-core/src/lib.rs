//! # exm-core
//!
//! Core types for Examind.
//!
//! This crate provides the foundational types shared across all Examind crates:
//! - Entity structs for the learning domain (goals, exams, questions, users)
//! - Status and kind enums with their wire names
//! - Pagination, list filters, and list page shapes

pub mod entities;
pub mod enums;
pub mod paging;
