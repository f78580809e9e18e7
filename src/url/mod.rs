//! URL handling module for Hostwalk
//!
//! URLs travel through the crawler as plain strings and are only decomposed
//! when a request has to be made or a dedup key computed.

mod split;

pub use split::{split_address, Address};
