//! Repositorios de acceso a datos
//!
//! Slot Registry y Assignment Ledger sobre PostgreSQL.

pub mod assignment_repository;
pub mod slot_repository;
