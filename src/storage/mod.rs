//! Storage layer for Aegis
//!
//! The sealing core only touches files through the `FileStore` trait.

pub mod file_io;

pub use file_io::{write_atomic, FileStore, LocalFileStore};
