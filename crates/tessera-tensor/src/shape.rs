//! Shape and Strides - Tensor Dimension Management
//!
//! Shapes define the dimensions of a tensor, strides define how to traverse
//! the underlying storage. Permuted views share storage and only reorder
//! both lists.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use smallvec::SmallVec;

use tessera_core::error::{Error, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Shape type - dimensions of a tensor.
/// Uses `SmallVec` for stack allocation of small shapes (up to 6 dimensions).
pub type Shape = SmallVec<[usize; 6]>;

/// Strides type - step sizes for each dimension, in elements.
pub type Strides = SmallVec<[usize; 6]>;

// =============================================================================
// Shape Utilities
// =============================================================================

/// Computes the total number of elements from a shape.
#[must_use]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Computes row-major (C-order) strides for a shape.
#[must_use]
pub fn contiguous_strides(shape: &[usize]) -> Strides {
    let mut strides = Strides::with_capacity(shape.len());
    let mut stride = 1usize;

    for &dim in shape.iter().rev() {
        strides.push(stride);
        stride *= dim;
    }

    strides.reverse();
    strides
}

/// Checks if strides represent a contiguous row-major layout.
#[must_use]
pub fn is_contiguous(shape: &[usize], strides: &[usize]) -> bool {
    // Size-1 dimensions never move the offset, so their stride is irrelevant.
    let expected = contiguous_strides(shape);
    shape
        .iter()
        .zip(strides.iter().zip(expected.iter()))
        .all(|(&dim, (&s, &e))| dim == 1 || s == e)
}

/// Computes the storage offset of multi-dimensional indices.
#[must_use]
pub fn linear_index(indices: &[usize], strides: &[usize]) -> usize {
    debug_assert_eq!(indices.len(), strides.len());
    indices.iter().zip(strides.iter()).map(|(&i, &s)| i * s).sum()
}

/// Converts a row-major linear index to multi-dimensional indices.
#[must_use]
pub fn unravel_index(mut linear: usize, shape: &[usize]) -> Vec<usize> {
    let mut indices = vec![0; shape.len()];

    for (i, &dim) in shape.iter().enumerate().rev() {
        indices[i] = linear % dim;
        linear /= dim;
    }

    indices
}

/// Validates that `dims` is a permutation of `0..ndim`.
pub fn validate_permutation(dims: &[usize], ndim: usize) -> Result<()> {
    if dims.len() != ndim {
        return Err(Error::invalid_operation(format!(
            "Expected {} dimensions in permutation, got {}",
            ndim,
            dims.len()
        )));
    }

    let mut seen = vec![false; ndim];
    for &d in dims {
        if d >= ndim {
            return Err(Error::InvalidDimension { index: d, ndim });
        }
        if seen[d] {
            return Err(Error::invalid_operation("Duplicate dimension in permute"));
        }
        seen[d] = true;
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
