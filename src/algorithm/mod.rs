//! Generation algorithms
//!
//! `demographics` and `address` create individual people, `pmi` links them
//! into an identity graph and `secondary` cross-links a second PMI to a
//! master PMI.

pub mod address;
pub mod demographics;
pub mod pmi;
pub mod secondary;
