//! Persistence layer

pub mod blacklist;

pub use blacklist::BlacklistRepository;
