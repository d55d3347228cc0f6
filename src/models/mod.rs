//! Modelos del dominio
//!
//! Entidades del scheduler de slots y el contexto de usuario autenticado.

pub mod route_slot;
pub mod slot_assignment;
pub mod user;
