//! Domain layer: entities, value objects and the ports the application talks to.

pub mod account;
pub mod catalog;
pub mod phone;
pub mod ports;
pub mod session;
