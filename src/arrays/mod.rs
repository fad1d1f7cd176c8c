//! Numeric array primitives
//!
//! Dense row-major matrices, sparse matrices restricted to an explicit mask of
//! active positions, and the mask itself.

pub mod dense;
pub mod mask;
pub mod sparse;

pub use dense::DenseArray;
pub use mask::SparseMask;
pub use sparse::SparseArray;
