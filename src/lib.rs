//! Sasskit - Sass compile orchestration
//!
//! This library provides functionality to:
//! - Resolve a changed `.scss`/`.sass` file into the top-level sources it affects
//! - Compile those sources concurrently and report a single completion
//! - Post-process compiled CSS with vendor prefixes for configured browsers
//! - Watch a project and compile on save

pub mod build;
pub mod cli;
pub mod config;
pub mod service;
pub mod stamp;
pub mod watch;
