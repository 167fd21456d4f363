//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation, store writes, and event publishing so
//! route handlers can stay focused on protocol translation.

pub mod board;
