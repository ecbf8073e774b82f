//! The IR data model: locations, blocks, expressions, and the query metadata
//! seam. Blocks and expressions are closed sum types so that every pass match
//! is checked for exhaustiveness when a new variant lands.

pub mod blocks;
pub mod expressions;
pub mod location;
pub mod metadata;
