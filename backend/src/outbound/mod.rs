//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM, plus
//!   embedded migrations and the readiness probe.
//! - **memory**: in-process repositories used when no database is
//!   configured and by tests.
//!
//! Adapters translate between domain types and storage representations and
//! contain no business logic.

pub mod memory;
pub mod persistence;
