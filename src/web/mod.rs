//! HTTP API for lab recommendations.
//!
//! This module serves the ranker over JSON using Axum.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8000
//! lab-matcher serve
//!
//! # Custom port, corpus, and auto-open browser
//! lab-matcher serve --port 3000 --corpus labs.ts --open
//!
//! # Bind to all interfaces
//! lab-matcher serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Corpus size and index readiness
//! - `POST /api/recommend` - Rank labs for `{keywords, major?, university?, top_n?}`
//! - `GET /api/labs` - List labs, optionally filtered by `major` / `university`
//! - `GET /api/labs/{id}` - Look up one lab
//! - `POST /api/reload` - Reload the corpus and swap in a new index

pub mod server;
