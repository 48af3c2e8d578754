//! Basis computation: the full merge → combine → expand → download →
//! classpath pipeline, plus classpath assembly and tree rendering over its
//! results.

pub mod basis;
pub mod classpath;
pub mod tree;

pub use basis::{calc_basis, calc_basis_with_aliases, Basis};
pub use classpath::{make_classpath_map, ClasspathMap, ClasspathSource};
