//! photoglow - one-click photo enhancement
//!
//! Decodes uploads, runs the `photo_tone` tone and clarity pipeline and
//! returns lossless PNG downloads, from the command line or over HTTP.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
