//! Compute device selection
//!
//! The device is resolved once at the start of a run and used consistently
//! for the whole run: it decides which optimizer update kernel is executed.

use std::fmt;

/// Compute backend for parameter updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// Trueno-backed fused vector kernels.
    Simd,
    /// Plain ndarray expression path.
    Scalar,
}

impl Device {
    /// Pick the preferred device for this host.
    ///
    /// Never fails: when no vector ISA is detected the scalar path is used.
    pub fn preferred() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                return Device::Simd;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            // NEON is part of the baseline aarch64 feature set
            return Device::Simd;
        }
        #[allow(unreachable_code)]
        Device::Scalar
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Simd => write!(f, "simd"),
            Device::Scalar => write!(f, "scalar"),
        }
    }
}
