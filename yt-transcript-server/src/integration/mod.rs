//! Integration testing module
//!
//! End-to-end tests through the real router, with a local stub standing in
//! for the watch-page and caption endpoints.

pub mod e2e;
