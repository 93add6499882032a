//! Application layer: the session state machine and its orchestration.
//!
//! `UssdEngine` is the entry point for inbound requests. It loads or creates
//! the session, lets `SessionMachine` compute the next state, renders the
//! resulting screen and commits or deletes the session.

pub mod engine;
pub mod locale;
pub mod locks;
pub mod render;
pub mod transition;
