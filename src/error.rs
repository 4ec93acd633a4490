//! Error type shared by the descriptor builder and the device controller.
//!
//! Configuration mistakes and resource exhaustion are reported through
//! [`MidiError`]. Transient conditions on the data plane (host not mounted,
//! nothing queued) are not errors and surface as empty results instead.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiError {
    /// The device is running and its configuration is frozen.
    AlreadyRunning,
    /// Cable id outside the configured range.
    InvalidCable(u8),
    /// Cable count outside `1..=MAX_CABLES`.
    InvalidCableCount(u8),
    /// The stack refused to store a string descriptor.
    StringExhausted,
    /// The stack has no free IN or OUT endpoint.
    EndpointExhausted,
    /// The stack refused to register the interface.
    InterfaceExhausted,
    /// Destination buffer cannot hold the whole descriptor.
    BufferTooSmall { needed: usize, got: usize },
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::AlreadyRunning => write!(f, "MIDI interface is already running"),
            MidiError::InvalidCable(id) => write!(f, "Invalid cable id: {id}"),
            MidiError::InvalidCableCount(n) => write!(f, "Invalid cable count: {n}"),
            MidiError::StringExhausted => write!(f, "No free string descriptor slot"),
            MidiError::EndpointExhausted => write!(f, "No free endpoint"),
            MidiError::InterfaceExhausted => write!(f, "Interface registration refused"),
            MidiError::BufferTooSmall { needed, got } => {
                write!(f, "Descriptor needs {needed} bytes, buffer holds {got}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MidiError {}

pub type Result<T> = core::result::Result<T, MidiError>;
