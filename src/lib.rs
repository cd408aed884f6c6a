//! appy-catalog - indexing and sorting for stored objects
//!
//! - `codec`: conversion of field values to ordered index keys
//! - `index`: inverted indexes (value to ids, id to value)
//! - `query`: search terms and operators over one index
//! - `sorter`: result set sorting with lazy sorted sequences
//! - `catalog`: the indexes of one class, and the registry of catalogs
//! - `config`, `observability`, `cli`: configuration, logging, command line

pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod index;
pub mod model;
pub mod observability;
pub mod query;
pub mod sorter;
