//! API Module
//!
//! HTTP handlers and routing over the cache façade.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value
//! - `GET /get/:key` - Retrieve a value by key
//! - `POST /mget` - Retrieve several values
//! - `DELETE /del/:key` - Delete a key
//! - `POST /delete-pattern` - Delete every key matching a regex
//! - `POST /clear` - Drop all entries and statistics
//! - `GET /stats` - Cache statistics report
//! - `GET /health` - Health verdict with recommendations

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
