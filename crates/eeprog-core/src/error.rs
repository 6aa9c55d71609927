//! Error types for eeprog-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus transaction errors
    /// Slave did not acknowledge its address or a data byte
    Nak,
    /// Bus arbitration was lost to another master
    ArbitrationLost,
    /// Bus transfer failed for another adapter-level reason
    BusError,
    /// Bus-idle wait exceeded its configured bound
    Timeout,

    // Buffer bridging errors
    /// Caller buffer could not be copied (bad address)
    BadAddress,
    /// Staging buffer could not be allocated
    OutOfMemory,

    // Capability errors
    /// Operation is not supported by the adapter
    NotSupported,

    // Device lifecycle errors
    /// Device number allocation failed
    RegistrationFailed,
    /// Device node creation failed (number already released)
    NodeCreationFailed,
    /// File-operation binding failed (node and number already released)
    BindFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nak => write!(f, "slave did not acknowledge"),
            Self::ArbitrationLost => write!(f, "bus arbitration lost"),
            Self::BusError => write!(f, "bus transfer failed"),
            Self::Timeout => write!(f, "bus-idle wait timed out"),
            Self::BadAddress => write!(f, "caller buffer copy failed"),
            Self::OutOfMemory => write!(f, "staging buffer allocation failed"),
            Self::NotSupported => write!(f, "operation not supported by adapter"),
            Self::RegistrationFailed => write!(f, "device number allocation failed"),
            Self::NodeCreationFailed => write!(f, "device node creation failed"),
            Self::BindFailed => write!(f, "file-operation binding failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
