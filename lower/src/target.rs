//! Target environment: which optional capabilities the device declares.
//!
//! Supports both explicit configuration through a bon builder and an
//! environment variable fallback.

use std::str::FromStr;

use bon::bon;
use enumset::EnumSet;
use snafu::OptionExt;
use spindle_dtype::{Capability, FloatKind};

use crate::error::{Result, UnknownCapabilitySnafu};

/// Environment variable holding a comma separated capability list.
pub const CAPS_ENV: &str = "SPINDLE_CAPS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetEnv {
    capabilities: EnumSet<Capability>,
}

#[bon]
impl TargetEnv {
    #[builder]
    pub fn new(#[builder(default)] capabilities: EnumSet<Capability>) -> Self {
        Self { capabilities }
    }

    /// Parses a comma separated list such as `"Int8, StorageBuffer8BitAccess"`.
    pub fn from_caps_str(list: &str) -> Result<Self> {
        let mut capabilities = EnumSet::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let cap = Capability::from_str(name).ok().context(UnknownCapabilitySnafu { name })?;
            capabilities.insert(cap);
        }
        Ok(Self { capabilities })
    }

    /// Reads `SPINDLE_CAPS`. Missing or malformed values fall back to the
    /// baseline environment with 32-bit types only.
    pub fn from_env() -> Self {
        let Ok(list) = std::env::var(CAPS_ENV) else {
            return Self::default();
        };
        match Self::from_caps_str(&list) {
            Ok(env) => env,
            Err(error) => {
                tracing::warn!(%error, value = %list, "ignoring {CAPS_ENV}");
                Self::default()
            }
        }
    }

    pub fn with_capability(mut self, cap: Capability) -> Self {
        self.capabilities.insert(cap);
        self
    }

    pub fn capabilities(&self) -> EnumSet<Capability> {
        self.capabilities
    }

    pub fn supports(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Integer widths usable in computations. 1 and 32 are always available.
    pub fn supports_int_width(&self, width: u32) -> bool {
        match width {
            1 | 32 => true,
            8 => self.supports(Capability::Int8),
            16 => self.supports(Capability::Int16),
            64 => self.supports(Capability::Int64),
            _ => false,
        }
    }

    /// Integer widths usable for elements of interface storage.
    pub fn supports_storage_int_width(&self, width: u32) -> bool {
        match width {
            32 => true,
            8 => self.supports(Capability::StorageBuffer8BitAccess),
            16 => self.supports(Capability::StorageBuffer16BitAccess),
            64 => self.supports(Capability::Int64),
            _ => false,
        }
    }

    pub fn supports_float(&self, kind: FloatKind) -> bool {
        match kind {
            FloatKind::F32 => true,
            FloatKind::F16 => self.supports(Capability::Float16),
            FloatKind::F64 => self.supports(Capability::Float64),
            FloatKind::BF16 => false,
        }
    }
}
