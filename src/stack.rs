//! Boundary with the USB device stack that owns enumeration, endpoint
//! memory and the string table.
//!
//! The MIDI device never talks to hardware. Everything it needs from the
//! stack goes through [`UsbStack`], which is handed to
//! [`MidiDevice::new`](crate::MidiDevice::new).

use usb_device::endpoint::EndpointAddress;
use usb_device::Result;

use crate::midi::descriptors::MidiDescriptor;

/// Number of interfaces the MIDI function occupies (audio control + MIDI
/// streaming).
pub const MIDI_INTERFACES: u8 = 2;
/// Position of the function in the configuration descriptor.
pub const MIDI_ORDERING: u8 = 3;
/// Bit folded into the product id so hosts re-enumerate a MIDI variant.
pub const MIDI_PID_MASK: u32 = 1 << 16;

/// Arguments of an interface registration.
///
/// `descriptor` plays the role of the descriptor callback and its context:
/// the stack keeps it and calls [`MidiDescriptor::write_to`] with the
/// interface number it assigned whenever the configuration descriptor is
/// built. `descriptor_len` is the length the stack must reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceRegistration {
    pub interfaces: u8,
    pub descriptor: MidiDescriptor,
    pub descriptor_len: usize,
    pub ordering: u8,
    pub pid_mask: u32,
}

impl InterfaceRegistration {
    pub fn midi(descriptor: MidiDescriptor) -> Self {
        InterfaceRegistration {
            interfaces: MIDI_INTERFACES,
            descriptor,
            descriptor_len: descriptor.total_length(),
            ordering: MIDI_ORDERING,
            pid_mask: MIDI_PID_MASK,
        }
    }
}

/// Registration and transfer primitives of the underlying USB stack.
///
/// Registrations return non-zero ids; a refusal is reported as an error.
/// Registration changes are bracketed by [`disconnect`](UsbStack::disconnect)
/// and [`connect`](UsbStack::connect).
pub trait UsbStack {
    fn register_string(&mut self, text: &'static str) -> Result<u8>;
    fn register_endpoint_in(&mut self) -> Result<EndpointAddress>;
    fn register_endpoint_out(&mut self) -> Result<EndpointAddress>;
    fn register_interface(&mut self, registration: InterfaceRegistration) -> Result<u8>;

    fn unregister_interface(&mut self, id: u8);
    fn unregister_endpoint_in(&mut self, ep: EndpointAddress);
    fn unregister_endpoint_out(&mut self, ep: EndpointAddress);

    fn disconnect(&mut self);
    fn connect(&mut self);

    /// True once the host has configured the MIDI interface.
    fn midi_mounted(&self) -> bool;
    /// Bytes queued from the host.
    fn midi_available(&self) -> usize;
    /// Reads raw MIDI stream bytes, returns how many were copied.
    fn stream_read(&mut self, buf: &mut [u8]) -> usize;
    /// Writes raw MIDI stream bytes to `cable` (0-based), returns how many
    /// were accepted.
    fn stream_write(&mut self, cable: u8, buf: &[u8]) -> usize;
    /// Reads one event packet. `UsbError::WouldBlock` when nothing is queued.
    fn packet_read(&mut self) -> Result<[u8; 4]>;
    fn packet_write(&mut self, packet: &[u8; 4]) -> Result<()>;
}

impl<S: UsbStack + ?Sized> UsbStack for &mut S {
    fn register_string(&mut self, text: &'static str) -> Result<u8> {
        (**self).register_string(text)
    }

    fn register_endpoint_in(&mut self) -> Result<EndpointAddress> {
        (**self).register_endpoint_in()
    }

    fn register_endpoint_out(&mut self) -> Result<EndpointAddress> {
        (**self).register_endpoint_out()
    }

    fn register_interface(&mut self, registration: InterfaceRegistration) -> Result<u8> {
        (**self).register_interface(registration)
    }

    fn unregister_interface(&mut self, id: u8) {
        (**self).unregister_interface(id)
    }

    fn unregister_endpoint_in(&mut self, ep: EndpointAddress) {
        (**self).unregister_endpoint_in(ep)
    }

    fn unregister_endpoint_out(&mut self, ep: EndpointAddress) {
        (**self).unregister_endpoint_out(ep)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn connect(&mut self) {
        (**self).connect()
    }

    fn midi_mounted(&self) -> bool {
        (**self).midi_mounted()
    }

    fn midi_available(&self) -> usize {
        (**self).midi_available()
    }

    fn stream_read(&mut self, buf: &mut [u8]) -> usize {
        (**self).stream_read(buf)
    }

    fn stream_write(&mut self, cable: u8, buf: &[u8]) -> usize {
        (**self).stream_write(cable, buf)
    }

    fn packet_read(&mut self) -> Result<[u8; 4]> {
        (**self).packet_read()
    }

    fn packet_write(&mut self, packet: &[u8; 4]) -> Result<()> {
        (**self).packet_write(packet)
    }
}
