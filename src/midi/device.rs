use log::{debug, warn};
use usb_device::endpoint::EndpointAddress;
use usb_device::UsbError;

use super::descriptors::{MidiDescriptor, MAX_CABLES};
use super::packet::EventPacket;
use crate::error::{MidiError, Result};
use crate::stack::{InterfaceRegistration, UsbStack};

pub const DEFAULT_NAME: &str = "PicoMIDI";
pub const DEFAULT_CABLE_NAME: &str = "virtual-cable";

/// Resources held from the stack while the interface is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    interface: u8,
    ep_in: EndpointAddress,
    ep_out: EndpointAddress,
    descriptor: MidiDescriptor,
}

/// USB MIDI interface with one to [`MAX_CABLES`] virtual cables.
///
/// The device is idle until [`begin`](MidiDevice::begin) registers it with
/// the stack. Cable count and names can only change while idle. Data-plane
/// calls start the device on first use unless auto-start is turned off, and
/// return empty results while the host has not mounted the interface.
pub struct MidiDevice<S: UsbStack> {
    stack: S,
    cables: u8,
    string_id: u8,
    cable_string_ids: [u8; MAX_CABLES],
    auto_start: bool,
    registration: Option<Registration>,
}

impl<S: UsbStack> MidiDevice<S> {
    pub fn new(stack: S) -> Self {
        MidiDevice {
            stack,
            cables: 1,
            string_id: 0,
            cable_string_ids: [0; MAX_CABLES],
            auto_start: true,
            registration: None,
        }
    }

    pub fn with_cables(stack: S, cables: u8) -> Result<Self> {
        let mut device = Self::new(stack);
        device.set_cables(cables)?;
        Ok(device)
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn cables(&self) -> u8 {
        self.cables
    }

    pub fn is_running(&self) -> bool {
        self.registration.is_some()
    }

    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    pub fn set_auto_start(&mut self, auto_start: bool) {
        self.auto_start = auto_start;
    }

    /// Interface id handed out by the stack, while running.
    pub fn interface(&self) -> Option<u8> {
        self.registration.map(|r| r.interface)
    }

    /// Descriptor registered with the stack, while running.
    pub fn descriptor(&self) -> Option<MidiDescriptor> {
        self.registration.map(|r| r.descriptor)
    }

    pub fn set_cables(&mut self, cables: u8) -> Result<()> {
        if self.is_running() {
            return Err(MidiError::AlreadyRunning);
        }
        if cables == 0 || cables as usize > MAX_CABLES {
            return Err(MidiError::InvalidCableCount(cables));
        }
        self.cables = cables;
        Ok(())
    }

    /// Sets the interface name shown by the host.
    pub fn set_name(&mut self, name: &'static str) -> Result<()> {
        if self.is_running() {
            return Err(MidiError::AlreadyRunning);
        }
        self.string_id = self.register_string(name)?;
        Ok(())
    }

    /// Names cable `id` (1-based). The name appears on every jack of that
    /// cable.
    pub fn set_cable_name(&mut self, id: u8, name: &'static str) -> Result<()> {
        if self.is_running() {
            return Err(MidiError::AlreadyRunning);
        }
        if id == 0 || id > self.cables {
            return Err(MidiError::InvalidCable(id));
        }
        self.cable_string_ids[id as usize - 1] = self.register_string(name)?;
        Ok(())
    }

    /// Registers endpoints, strings and the interface with the stack.
    ///
    /// The connection is dropped for the duration of the registration. On
    /// failure the endpoints taken so far are given back and the device
    /// stays idle.
    pub fn begin(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(MidiError::AlreadyRunning);
        }

        self.stack.disconnect();
        let result = self.register();
        self.stack.connect();

        match result {
            Ok(registration) => {
                debug!(
                    "MIDI interface {} up: {} cable(s), in {:?}, out {:?}",
                    registration.interface,
                    self.cables,
                    registration.ep_in,
                    registration.ep_out
                );
                self.registration = Some(registration);
                Ok(())
            }
            Err(e) => {
                warn!("MIDI interface registration failed: {}", e);
                Err(e)
            }
        }
    }

    /// Unregisters the interface and its endpoints. Does nothing while idle.
    pub fn end(&mut self) {
        if let Some(registration) = self.registration.take() {
            self.stack.disconnect();
            self.stack.unregister_interface(registration.interface);
            self.stack.unregister_endpoint_in(registration.ep_in);
            self.stack.unregister_endpoint_out(registration.ep_out);
            self.stack.connect();
            debug!("MIDI interface {} down", registration.interface);
        }
    }

    fn register(&mut self) -> Result<Registration> {
        let ep_in = self.stack.register_endpoint_in().map_err(|e| {
            warn!("no IN endpoint for MIDI: {:?}", e);
            MidiError::EndpointExhausted
        })?;
        let ep_out = match self.stack.register_endpoint_out() {
            Ok(ep) => ep,
            Err(e) => {
                warn!("no OUT endpoint for MIDI: {:?}", e);
                self.stack.unregister_endpoint_in(ep_in);
                return Err(MidiError::EndpointExhausted);
            }
        };

        self.register_interface(ep_in, ep_out).map_err(|e| {
            self.stack.unregister_endpoint_in(ep_in);
            self.stack.unregister_endpoint_out(ep_out);
            e
        })
    }

    fn register_interface(
        &mut self,
        ep_in: EndpointAddress,
        ep_out: EndpointAddress,
    ) -> Result<Registration> {
        if self.string_id == 0 {
            self.string_id = self.register_string(DEFAULT_NAME)?;
        }
        if self.cable_string_ids[0] == 0 {
            self.cable_string_ids[0] = self.register_string(DEFAULT_CABLE_NAME)?;
        }

        let descriptor = MidiDescriptor::new(
            self.string_id,
            self.cables,
            self.cable_string_ids,
            ep_in,
            ep_out,
        );
        let interface = match self
            .stack
            .register_interface(InterfaceRegistration::midi(descriptor))
        {
            Ok(id) if id != 0 => id,
            Ok(_) => {
                warn!("MIDI interface got id 0");
                return Err(MidiError::InterfaceExhausted);
            }
            Err(e) => {
                warn!("MIDI interface refused: {:?}", e);
                return Err(MidiError::InterfaceExhausted);
            }
        };

        Ok(Registration {
            interface,
            ep_in,
            ep_out,
            descriptor,
        })
    }

    fn register_string(&mut self, text: &'static str) -> Result<u8> {
        match self.stack.register_string(text) {
            Ok(id) if id != 0 => Ok(id),
            Ok(_) => {
                warn!("string {:?} got id 0", text);
                Err(MidiError::StringExhausted)
            }
            Err(e) => {
                warn!("string {:?} refused: {:?}", text, e);
                Err(MidiError::StringExhausted)
            }
        }
    }

    /// Starts the device if the auto-start policy allows it and reports
    /// whether it is running.
    fn ensure_running(&mut self) -> bool {
        if !self.is_running() && self.auto_start {
            if let Err(e) = self.begin() {
                debug!("MIDI auto-start failed: {}", e);
            }
        }
        self.is_running()
    }

    /// True once running and mounted by the host.
    pub fn connected(&mut self) -> bool {
        self.ensure_running() && self.stack.midi_mounted()
    }

    pub fn is_ready(&mut self) -> bool {
        self.connected()
    }

    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.write_cable(0, &[byte])
    }

    pub fn write(&mut self, buf: &[u8]) -> usize {
        self.write_cable(0, buf)
    }

    /// Writes raw MIDI stream bytes to `cable` (0-based).
    pub fn write_cable(&mut self, cable: u8, buf: &[u8]) -> usize {
        if !self.connected() || cable >= self.cables {
            return 0;
        }
        self.stack.stream_write(cable, buf)
    }

    pub fn write_packet(&mut self, packet: &[u8; 4]) -> bool {
        if !self.connected() {
            return false;
        }
        match self.stack.packet_write(packet) {
            Ok(()) => true,
            Err(UsbError::WouldBlock) => false,
            Err(e) => {
                warn!("MIDI packet write failed: {:?}", e);
                false
            }
        }
    }

    pub fn send_midi(&mut self, event: EventPacket) -> bool {
        self.write_packet(&event.to_bytes())
    }

    pub fn available(&mut self) -> usize {
        if !self.connected() {
            return 0;
        }
        self.stack.midi_available()
    }

    /// The transport has no lookahead.
    pub fn peek(&self) -> Option<u8> {
        None
    }

    /// Nothing is buffered on this side.
    pub fn flush(&mut self) {}

    pub fn read_byte(&mut self) -> Option<u8> {
        self.poll_read(|stack| {
            let mut byte = [0u8; 1];
            if stack.stream_read(&mut byte) == 1 {
                Some(byte[0])
            } else {
                None
            }
        })
    }

    pub fn read_packet(&mut self) -> Option<[u8; 4]> {
        self.poll_read(|stack| match stack.packet_read() {
            Ok(packet) => Some(packet),
            Err(UsbError::WouldBlock) => None,
            Err(e) => {
                warn!("MIDI packet read failed: {:?}", e);
                None
            }
        })
    }

    /// Reads one event packet, all zero when nothing could be read.
    pub fn read_event_packet(&mut self) -> EventPacket {
        self.read_packet()
            .map(EventPacket::from)
            .unwrap_or_default()
    }

    fn poll_read<T>(&mut self, read: impl FnOnce(&mut S) -> Option<T>) -> Option<T> {
        if !self.connected() {
            return None;
        }
        read(&mut self.stack)
    }
}
