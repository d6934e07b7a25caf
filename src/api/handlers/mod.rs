//! API request handlers

pub mod content;
pub mod health;
