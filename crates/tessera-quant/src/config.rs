//! Quantization Configuration
//!
//! Builder-style settings shared by the quantized kernels: bit width,
//! signedness, sparsity preservation and which backend runs the kernels.
//!
//! ```rust
//! use tessera_quant::{BackendKind, QuantConfig};
//!
//! let config = QuantConfig::new()
//!     .precision(8)
//!     .preserve_sparsity(true)
//!     .backend(BackendKind::Reference);
//! assert!(config.validate().is_ok());
//! ```
//!
//! @version 0.1.0
//! @author Tessera Development Team

use core::fmt;

use tracing::{debug, warn};

use crate::backend::{QuantBackend, ReferenceBackend, UnavailableBackend};
use crate::error::{QuantError, QuantResult};
use crate::params::qrange;

/// Environment variable selecting the quantization backend.
pub const BACKEND_ENV_VAR: &str = "TESSERA_QUANT_BACKEND";

static REFERENCE_BACKEND: ReferenceBackend = ReferenceBackend;
static UNAVAILABLE_BACKEND: UnavailableBackend = UnavailableBackend;

// =============================================================================
// Backend Selection
// =============================================================================

/// Which backend executes the quantized kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Portable scalar kernels, always available.
    #[default]
    Reference,
    /// Placeholder for a backend missing on this machine.
    Unavailable,
}

impl BackendKind {
    /// Parses a backend name, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reference" | "ref" | "scalar" => Some(BackendKind::Reference),
            "unavailable" | "none" => Some(BackendKind::Unavailable),
            _ => None,
        }
    }

    /// Returns the backend instance for this kind.
    pub fn instance(self) -> &'static dyn QuantBackend {
        match self {
            BackendKind::Reference => &REFERENCE_BACKEND,
            BackendKind::Unavailable => &UNAVAILABLE_BACKEND,
        }
    }

    /// Resolves an optional environment value, falling back to the default
    /// on absent or unrecognised input.
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None => Self::default(),
            Some(raw) => Self::from_str(raw).unwrap_or_else(|| {
                warn!(value = raw, var = BACKEND_ENV_VAR, "Unknown quantization backend, using reference");
                Self::default()
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Reference => write!(f, "reference"),
            BackendKind::Unavailable => write!(f, "unavailable"),
        }
    }
}

// =============================================================================
// Quantization Config
// =============================================================================

/// Configuration for quantizing tensors and running quantized kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantConfig {
    /// Bit width of quantized values.
    pub precision: u8,
    /// Whether quantized values are signed.
    pub signed: bool,
    /// Make ranges straddling zero symmetric around the zero point.
    pub preserve_sparsity: bool,
    /// Backend executing the kernels.
    pub backend: BackendKind,
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            precision: 8,
            signed: false,
            preserve_sparsity: false,
            backend: BackendKind::Reference,
        }
    }
}

impl QuantConfig {
    /// Creates a configuration with 8-bit unsigned defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default configuration whose backend is taken from
    /// `TESSERA_QUANT_BACKEND` when set.
    pub fn from_env() -> Self {
        let value = std::env::var(BACKEND_ENV_VAR).ok();
        let backend = BackendKind::from_env_value(value.as_deref());
        debug!(%backend, "Selected quantization backend");
        Self::new().backend(backend)
    }

    /// Builder: set bit width.
    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Builder: set signedness.
    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Builder: preserve sparsity.
    pub fn preserve_sparsity(mut self, preserve_sparsity: bool) -> Self {
        self.preserve_sparsity = preserve_sparsity;
        self
    }

    /// Builder: set backend.
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Returns `(qmin, qmax)` for the configured width.
    pub fn qrange(&self) -> (i32, i32) {
        qrange(self.precision, self.signed)
    }

    /// Checks that the configuration fits the unsigned 8-bit kernels.
    pub fn validate(&self) -> QuantResult<()> {
        if self.precision == 0 || self.precision > 8 {
            return Err(QuantError::InvalidConfig(format!(
                "precision must be in 1..=8, got {}",
                self.precision
            )));
        }
        if self.signed {
            return Err(QuantError::InvalidConfig(
                "signed quantization is not supported by the u8 kernels".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
