//! Servicios del sistema
//!
//! Este módulo contiene la política de autorización del scheduler.

pub mod policy;
