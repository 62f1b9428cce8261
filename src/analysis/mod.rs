//! Analysis modules.
//!
//! The aggregator evaluates the three project queries; `sql` renders the
//! relational form of each one for the report.

pub mod aggregator;
pub mod sql;

pub use aggregator::*;
pub use sql::equivalent_sql;
