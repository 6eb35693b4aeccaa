//! Key list loading functionality

pub mod key_loader;

pub use key_loader::{collect_keys, parse_keys};
