//! Configuration for the storage layer

pub mod paths;

pub use paths::LedgerPaths;
