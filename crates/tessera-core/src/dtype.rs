//! Data Types - Tessera Element Types
//!
//! Defines the element types Tessera tensors can hold. Floating point tensors
//! carry real-valued activations; the 8-bit and 32-bit integer types carry
//! quantized values and accumulators.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use bytemuck::{Pod, Zeroable};
use num_traits::{Bounded, NumCast, Zero};

use core::fmt::Debug;

// =============================================================================
// DType Enum
// =============================================================================

/// Runtime representation of tensor element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    /// 32-bit floating point.
    #[default]
    F32,
    /// 8-bit signed integer.
    I8,
    /// 8-bit unsigned integer.
    U8,
    /// 32-bit signed integer.
    I32,
}

impl DType {
    /// Returns the size in bytes of this data type.
    #[must_use]
    pub const fn size_of(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::F32 | Self::I32 => 4,
        }
    }

    /// Returns true if this is a floating point type.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }

    /// Returns the name of this data type as a string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I32 => "i32",
        }
    }
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Element Trait
// =============================================================================

/// Trait for all element types that can be stored in a tensor.
pub trait Element:
    Copy + Debug + Default + PartialOrd + Send + Sync + Pod + Zeroable + Zero + Bounded + NumCast + 'static
{
    /// The runtime dtype for this element type.
    const DTYPE: DType;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
}

impl Element for i8 {
    const DTYPE: DType = DType::I8;
}

impl Element for u8 {
    const DTYPE: DType = DType::U8;
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_size() {
        assert_eq!(DType::F32.size_of(), 4);
        assert_eq!(DType::U8.size_of(), 1);
        assert_eq!(DType::I8.size_of(), 1);
        assert_eq!(DType::I32.size_of(), 4);
    }

    #[test]
    fn test_dtype_properties() {
        assert!(DType::F32.is_float());
        assert!(!DType::U8.is_float());
        assert_eq!(DType::default(), DType::F32);
        assert_eq!(format!("{}", DType::U8), "u8");
    }

    #[test]
    fn test_element_dtypes() {
        assert_eq!(<u8 as Element>::DTYPE, DType::U8);
        assert_eq!(<i8 as Element>::DTYPE, DType::I8);
        assert_eq!(<i32 as Element>::DTYPE, DType::I32);
    }
}
