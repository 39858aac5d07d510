//! Test support utilities.
//!
//! Provides a mock AhaSend server answering a single request with a
//! canned response, and capturing that request for verification.

#![allow(dead_code)]

pub mod mock_server;

#[allow(unused_imports)]
pub use mock_server::{refused_url, CapturedRequest, MockServer};
