//! Valoris - waste-recycling management backend, authorization core
//!
//! Societies, pickups, planning, accounting and sales live in sibling
//! services; this crate carries the subsystem every one of their requests
//! passes through: the role/resource/action policy engine, the request
//! filter enforcing it, and the administrative surface for editing
//! policies at runtime. It exposes all modules for testing purposes.

pub mod authz;
pub mod entities;
pub mod errors;
pub mod principal;
pub mod settings;
pub mod storage;
pub mod web;
