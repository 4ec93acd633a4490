//! Class-compliant USB MIDI interface exposing up to [`MAX_CABLES`] virtual
//! cables on top of an externally owned USB device stack.
//!
//! The stack is injected through the [`UsbStack`] trait. [`MidiDevice`]
//! registers the MIDI interface with it on [`MidiDevice::begin`] and answers
//! descriptor fetches with a [`MidiDescriptor`] snapshot.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod builder;
pub mod error;
pub mod midi;
#[cfg(feature = "std")]
pub mod mock;
#[cfg(feature = "rtt")]
pub mod rtt;
pub mod stack;

pub use builder::MidiDeviceBuilder;
pub use error::{MidiError, Result};
pub use midi::descriptors::{MidiDescriptor, MAX_CABLES, MAX_PACKET_SIZE};
pub use midi::device::MidiDevice;
pub use midi::packet::EventPacket;
pub use stack::{InterfaceRegistration, UsbStack};
