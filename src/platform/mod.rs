// iislens - platform/mod.rs
//
// Platform abstraction layer: config paths and config.toml loading.
// Dependencies: standard library, directories crate.

pub mod config;
