// server/src/lib.rs

//! The HTTP application over the `crossdock` engine: configuration,
//! shared state, the route table, and in-process collaborator
//! implementations. `main.rs` wires these into an actix-web server; the
//! integration tests wire the same pieces into `actix_web::test`.

pub mod config;
pub mod errors;
pub mod seed;
pub mod services;
pub mod state;
pub mod web;
