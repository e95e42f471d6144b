//! I/O helpers: configuration files on disk.

pub mod config;
