//! Server implementations
//!
//! - web: public site, JSON API and admin console over HTTP

pub mod web;
