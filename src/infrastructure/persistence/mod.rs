//! Mapping store implementations.
//!
//! - [`PgMappingRepository`] - PostgreSQL via SQLx
//! - [`MemoryMappingRepository`] - In-process map for development and tests

pub mod memory_mapping_repository;
pub mod pg_mapping_repository;

pub use memory_mapping_repository::MemoryMappingRepository;
pub use pg_mapping_repository::PgMappingRepository;
