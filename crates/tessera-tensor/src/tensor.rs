//! Tensor - Dense N-Dimensional Array
//!
//! The `Tensor` struct is the array type every Tessera kernel consumes and
//! produces. Storage is reference-counted so that `permute` is a zero-copy
//! view; `contiguous` materializes a row-major copy when a kernel needs one.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use core::fmt;
use std::sync::Arc;

use tessera_core::dtype::{DType, Element};
use tessera_core::error::{Error, Result};

use crate::shape::{
    contiguous_strides, is_contiguous, linear_index, numel, unravel_index, validate_permutation,
    Shape, Strides,
};

// =============================================================================
// Tensor Struct
// =============================================================================

/// An N-dimensional array of elements with shared storage.
#[derive(Clone)]
pub struct Tensor<T: Element> {
    /// Underlying data storage (reference-counted).
    storage: Arc<Vec<T>>,
    /// Shape of the tensor (dimensions).
    shape: Shape,
    /// Strides for each dimension.
    strides: Strides,
}

impl<T: Element> Tensor<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a new tensor from a vector with the given shape.
    ///
    /// # Returns
    /// New tensor, or error if shape doesn't match data length.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        if numel(shape) != data.len() {
            return Err(Error::shape_mismatch(&[data.len()], shape));
        }

        Ok(Self {
            storage: Arc::new(data),
            shape: Shape::from_slice(shape),
            strides: contiguous_strides(shape),
        })
    }

    /// Creates a tensor filled with zeros.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, T::zero())
    }

    /// Creates a tensor filled with a constant value.
    #[must_use]
    pub fn full(shape: &[usize], value: T) -> Self {
        Self {
            storage: Arc::new(vec![value; numel(shape)]),
            shape: Shape::from_slice(shape),
            strides: contiguous_strides(shape),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the size of one dimension.
    #[must_use]
    pub fn size(&self, dim: usize) -> usize {
        self.shape[dim]
    }

    /// Returns the strides of the tensor.
    #[must_use]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Returns true if the tensor has zero elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Returns the element type of the tensor.
    #[must_use]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Returns true if the tensor is laid out row-major in its storage.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        is_contiguous(&self.shape, &self.strides)
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Returns the backing slice when the tensor is contiguous.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[T]> {
        if self.is_contiguous() {
            Some(&self.storage[..self.numel()])
        } else {
            None
        }
    }

    /// Returns the elements in row-major order of the logical shape.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        if let Some(slice) = self.as_slice() {
            return slice.to_vec();
        }

        (0..self.numel())
            .map(|i| {
                let indices = unravel_index(i, &self.shape);
                self.storage[linear_index(&indices, &self.strides)]
            })
            .collect()
    }

    /// Returns the element at the given multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        if indices.len() != self.ndim() {
            return Err(Error::invalid_operation(format!(
                "Expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }
        for (dim, (&idx, &size)) in indices.iter().zip(self.shape.iter()).enumerate() {
            if idx >= size {
                return Err(Error::invalid_operation(format!(
                    "Index {idx} out of bounds for dimension {dim} of size {size}"
                )));
            }
        }
        Ok(self.storage[linear_index(indices, &self.strides)])
    }

    // =========================================================================
    // Layout Operations
    // =========================================================================

    /// Returns a view with dimensions reordered.
    ///
    /// # Arguments
    /// * `dims` - New order of dimensions
    pub fn permute(&self, dims: &[usize]) -> Result<Self> {
        validate_permutation(dims, self.ndim())?;

        Ok(Self {
            storage: Arc::clone(&self.storage),
            shape: dims.iter().map(|&d| self.shape[d]).collect(),
            strides: dims.iter().map(|&d| self.strides[d]).collect(),
        })
    }

    /// Returns a contiguous version of the tensor, copying only if needed.
    #[must_use]
    pub fn contiguous(&self) -> Self {
        if self.is_contiguous() {
            return self.clone();
        }

        Self {
            storage: Arc::new(self.to_vec()),
            shape: self.shape.clone(),
            strides: contiguous_strides(&self.shape),
        }
    }

    /// Applies `f` to every element, producing a contiguous tensor of the
    /// same shape.
    #[must_use]
    pub fn map<U: Element, F>(&self, f: F) -> Tensor<U>
    where
        F: Fn(T) -> U,
    {
        let data: Vec<U> = self.to_vec().into_iter().map(f).collect();
        Tensor {
            storage: Arc::new(data),
            shape: self.shape.clone(),
            strides: contiguous_strides(&self.shape),
        }
    }
}

impl<T: Element> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape.as_slice())
            .field("dtype", &T::DTYPE)
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
