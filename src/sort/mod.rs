//! Sort specifications and the comparator compiler

pub mod compiler;
pub mod spec;

pub use compiler::{Comparator, compile};
pub use spec::{SortCriterion, SortDirection, SortSpec};
