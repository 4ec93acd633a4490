//! In-memory [`UsbStack`] for tests and host-side experiments.

use std::collections::VecDeque;
use std::vec::Vec;

use usb_device::endpoint::EndpointAddress;
use usb_device::{Result, UsbDirection, UsbError};

use crate::stack::{InterfaceRegistration, UsbStack};

/// Stack calls in the order they were made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    RegisterString(&'static str),
    RegisterEndpointIn,
    RegisterEndpointOut,
    RegisterInterface,
    UnregisterInterface(u8),
    UnregisterEndpointIn(EndpointAddress),
    UnregisterEndpointOut(EndpointAddress),
    Disconnect,
    Connect,
}

/// Records every registration, hands out ids from small fixed pools and
/// serves queued host traffic.
///
/// String ids are `index + 1` into `strings`. Endpoint numbers are the
/// lowest free number in `1..=endpoint_limit` per direction. Interface ids
/// count up from 1 and are never reused.
pub struct MockStack {
    pub calls: Vec<Call>,
    pub strings: Vec<&'static str>,
    pub endpoints_in: Vec<EndpointAddress>,
    pub endpoints_out: Vec<EndpointAddress>,
    /// Live registrations keyed by interface id.
    pub interfaces: Vec<(u8, InterfaceRegistration)>,
    pub string_limit: usize,
    pub endpoint_limit: usize,
    pub interface_limit: usize,
    /// Report string and interface registrations as id 0 instead of
    /// storing them.
    pub zero_ids: bool,
    pub connected: bool,
    /// Registration calls made while connected.
    pub unbracketed: usize,
    pub mounted: bool,
    pub rx_bytes: VecDeque<u8>,
    pub rx_packets: VecDeque<[u8; 4]>,
    /// Stream writes as `(cable, bytes)`.
    pub tx_stream: Vec<(u8, Vec<u8>)>,
    pub tx_packets: Vec<[u8; 4]>,
    next_interface: u8,
}

impl Default for MockStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStack {
    pub fn new() -> Self {
        MockStack {
            calls: Vec::new(),
            strings: Vec::new(),
            endpoints_in: Vec::new(),
            endpoints_out: Vec::new(),
            interfaces: Vec::new(),
            string_limit: 16,
            endpoint_limit: 7,
            interface_limit: 8,
            zero_ids: false,
            connected: true,
            unbracketed: 0,
            mounted: false,
            rx_bytes: VecDeque::new(),
            rx_packets: VecDeque::new(),
            tx_stream: Vec::new(),
            tx_packets: Vec::new(),
            next_interface: 1,
        }
    }

    /// Configuration descriptor body as the stack would emit it: every live
    /// registration in order, interface numbers assigned from 0.
    pub fn configuration_descriptor(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut interface_number = 0u8;
        for (_, registration) in &self.interfaces {
            let mut buf = std::vec![0; registration.descriptor_len];
            if let Ok(written) = registration.descriptor.write_to(interface_number, &mut buf) {
                out.extend_from_slice(&buf[..written]);
            }
            interface_number += registration.interfaces;
        }
        out
    }

    fn record(&mut self, call: Call) {
        match call {
            Call::Disconnect | Call::Connect => {}
            _ if self.connected => self.unbracketed += 1,
            _ => {}
        }
        self.calls.push(call);
    }

    fn allocate(
        live: &mut Vec<EndpointAddress>,
        limit: usize,
        direction: UsbDirection,
    ) -> Result<EndpointAddress> {
        let index = (1..=limit)
            .find(|&i| !live.iter().any(|ep| ep.index() == i))
            .ok_or(UsbError::EndpointOverflow)?;
        let ep = EndpointAddress::from_parts(index, direction);
        live.push(ep);
        Ok(ep)
    }
}

impl UsbStack for MockStack {
    fn register_string(&mut self, text: &'static str) -> Result<u8> {
        self.record(Call::RegisterString(text));
        if self.strings.len() >= self.string_limit {
            return Err(UsbError::BufferOverflow);
        }
        if self.zero_ids {
            return Ok(0);
        }
        self.strings.push(text);
        Ok(self.strings.len() as u8)
    }

    fn register_endpoint_in(&mut self) -> Result<EndpointAddress> {
        self.record(Call::RegisterEndpointIn);
        Self::allocate(&mut self.endpoints_in, self.endpoint_limit, UsbDirection::In)
    }

    fn register_endpoint_out(&mut self) -> Result<EndpointAddress> {
        self.record(Call::RegisterEndpointOut);
        Self::allocate(&mut self.endpoints_out, self.endpoint_limit, UsbDirection::Out)
    }

    fn register_interface(&mut self, registration: InterfaceRegistration) -> Result<u8> {
        self.record(Call::RegisterInterface);
        if self.interfaces.len() >= self.interface_limit {
            return Err(UsbError::BufferOverflow);
        }
        if self.zero_ids {
            return Ok(0);
        }
        let id = self.next_interface;
        self.next_interface += 1;
        self.interfaces.push((id, registration));
        Ok(id)
    }

    fn unregister_interface(&mut self, id: u8) {
        self.record(Call::UnregisterInterface(id));
        self.interfaces.retain(|(i, _)| *i != id);
    }

    fn unregister_endpoint_in(&mut self, ep: EndpointAddress) {
        self.record(Call::UnregisterEndpointIn(ep));
        self.endpoints_in.retain(|e| *e != ep);
    }

    fn unregister_endpoint_out(&mut self, ep: EndpointAddress) {
        self.record(Call::UnregisterEndpointOut(ep));
        self.endpoints_out.retain(|e| *e != ep);
    }

    fn disconnect(&mut self) {
        self.record(Call::Disconnect);
        self.connected = false;
    }

    fn connect(&mut self) {
        self.record(Call::Connect);
        self.connected = true;
    }

    fn midi_mounted(&self) -> bool {
        self.mounted
    }

    fn midi_available(&self) -> usize {
        self.rx_bytes.len()
    }

    fn stream_read(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx_bytes.pop_front() {
                Some(byte) => *slot = byte,
                None => break,
            }
            count += 1;
        }
        count
    }

    fn stream_write(&mut self, cable: u8, buf: &[u8]) -> usize {
        self.tx_stream.push((cable, buf.to_vec()));
        buf.len()
    }

    fn packet_read(&mut self) -> Result<[u8; 4]> {
        self.rx_packets.pop_front().ok_or(UsbError::WouldBlock)
    }

    fn packet_write(&mut self, packet: &[u8; 4]) -> Result<()> {
        self.tx_packets.push(*packet);
        Ok(())
    }
}
