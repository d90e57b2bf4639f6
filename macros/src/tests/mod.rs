//! Tests for the ColumnField derive helpers
//!
//! The generated impls are exercised by the main crate's record tests;
//! these cover the name and type helpers the derive relies on.
