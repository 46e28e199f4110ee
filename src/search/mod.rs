//! Search layer facade.
//!
//! - **[`sorting`]**: Sort-option registry and the built-in alphabetical options.
//! - **[`sorters`]**: Order-by fragments carried by sort options.
//! - **[`query`]**: Sort resolution and SQL assembly for dashboard searches.

pub mod query;
pub mod sorters;
pub mod sorting;
