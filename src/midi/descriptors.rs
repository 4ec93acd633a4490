use usb_device::endpoint::{EndpointAddress, EndpointType};

use crate::error::{MidiError, Result};

// USB descriptor types
pub const INTERFACE: u8 = 0x04;
pub const ENDPOINT: u8 = 0x05;
pub const CS_INTERFACE: u8 = 0x24;
pub const CS_ENDPOINT: u8 = 0x25;

// USB Class
pub const AUDIO_CLASS: u8 = 0x01;

// USB Subclass
pub const AUDIO_CONTROL: u8 = 0x01;
pub const MIDI_STREAMING: u8 = 0x03;
pub const PROTOCOL_UNDEFINED: u8 = 0x00;

// Audio subclass
pub const AC_HEADER: u8 = 0x01;

// MIDI interface descriptor subtypes
pub const MS_HEADER: u8 = 0x01;
pub const MIDI_IN_JACK: u8 = 0x02;
pub const MIDI_OUT_JACK: u8 = 0x03;
pub const MS_GENERAL: u8 = 0x01;

// MIDI jack types
pub const EMBEDDED: u8 = 0x01;
pub const EXTERNAL: u8 = 0x02;

// Descriptor sizes
pub const INTERFACE_SIZE: usize = 9;
pub const AC_HEADER_SIZE: usize = 9;
pub const MS_HEADER_SIZE: usize = 7;
pub const MIDI_IN_JACK_SIZE: usize = 6;
pub const MIDI_OUT_JACK_SIZE: usize = 9;
// Audio class 1.0 endpoints carry bRefresh and bSynchAddress
pub const ENDPOINT_SIZE: usize = 9;
pub const CS_ENDPOINT_SIZE: usize = 4;

/// Interface head: AC interface, AC header, MS interface, MS header.
pub const HEAD_LEN: usize = 2 * INTERFACE_SIZE + AC_HEADER_SIZE + MS_HEADER_SIZE;
/// Four jacks per cable: embedded and external, IN and OUT.
pub const JACK_LEN: usize = 2 * MIDI_IN_JACK_SIZE + 2 * MIDI_OUT_JACK_SIZE;

pub const MAX_CABLES: usize = 6;
pub const MAX_PACKET_SIZE: u16 = 64;

/// Bulk endpoint plus its class-specific block listing one jack per cable.
pub const fn ep_len(cables: u8) -> usize {
    ENDPOINT_SIZE + CS_ENDPOINT_SIZE + cables as usize
}

/// Total length of the interface descriptor for `cables` cables.
pub const fn descriptor_len(cables: u8) -> usize {
    HEAD_LEN + cables as usize * JACK_LEN + 2 * ep_len(cables)
}

// Jack ids are allocated in blocks of four per cable, starting at 1.
pub const fn jack_id_in_embedded(cable: u8) -> u8 {
    (cable - 1) * 4 + 1
}

pub const fn jack_id_in_external(cable: u8) -> u8 {
    (cable - 1) * 4 + 2
}

pub const fn jack_id_out_embedded(cable: u8) -> u8 {
    (cable - 1) * 4 + 3
}

pub const fn jack_id_out_external(cable: u8) -> u8 {
    (cable - 1) * 4 + 4
}

/// Cable number (1-based) owning a jack id.
pub const fn cable_of_jack(jack: u8) -> u8 {
    (jack - 1) / 4 + 1
}

/// Everything needed to emit the MIDI interface descriptor once the stack
/// has handed out the endpoint and string ids.
///
/// The value is a snapshot taken at registration time. The stack stores it
/// and calls [`MidiDescriptor::write_to`] whenever the host fetches the
/// configuration descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiDescriptor {
    string_id: u8,
    cables: u8,
    cable_string_ids: [u8; MAX_CABLES],
    ep_in: EndpointAddress,
    ep_out: EndpointAddress,
}

impl MidiDescriptor {
    pub fn new(
        string_id: u8,
        cables: u8,
        cable_string_ids: [u8; MAX_CABLES],
        ep_in: EndpointAddress,
        ep_out: EndpointAddress,
    ) -> Self {
        debug_assert!(cables >= 1 && cables as usize <= MAX_CABLES);
        MidiDescriptor {
            string_id,
            cables,
            cable_string_ids,
            ep_in,
            ep_out,
        }
    }

    pub fn cables(&self) -> u8 {
        self.cables
    }

    pub fn string_id(&self) -> u8 {
        self.string_id
    }

    /// String id attached to the jacks of `cable` (1-based), 0 if unnamed.
    pub fn cable_string_id(&self, cable: u8) -> u8 {
        if cable == 0 || cable > self.cables {
            return 0;
        }
        self.cable_string_ids[cable as usize - 1]
    }

    pub fn endpoint_in(&self) -> EndpointAddress {
        self.ep_in
    }

    pub fn endpoint_out(&self) -> EndpointAddress {
        self.ep_out
    }

    /// Length declared to the stack at registration time.
    pub fn total_length(&self) -> usize {
        descriptor_len(self.cables)
    }

    /// Writes the descriptor for interface number `interface` into `dst` and
    /// returns the number of bytes written. The MIDI streaming interface
    /// takes the number right after `interface`.
    pub fn write_to(&self, interface: u8, dst: &mut [u8]) -> Result<usize> {
        let total_len = self.total_length();
        if dst.len() < total_len {
            return Err(MidiError::BufferTooSmall {
                needed: total_len,
                got: dst.len(),
            });
        }

        let mut writer = Writer::new(dst);
        let streaming_interface = interface.wrapping_add(1);

        // Audio control
        writer.write(
            INTERFACE,
            &[
                interface,
                0x00, // alternate setting
                0x00, // no endpoints
                AUDIO_CLASS,
                AUDIO_CONTROL,
                PROTOCOL_UNDEFINED,
                self.string_id,
            ],
        );
        let ac_len = (AC_HEADER_SIZE as u16).to_le_bytes();
        writer.write(
            CS_INTERFACE,
            &[
                AC_HEADER, // audio control header
                0x00,
                0x01, // revision (little endian)
                ac_len[0],
                ac_len[1],           // total length -- just this header
                0x01,                // number of streaming interfaces = 1
                streaming_interface, // interface for MIDI streaming
            ],
        );

        // MIDI streaming
        writer.write(
            INTERFACE,
            &[
                streaming_interface,
                0x00, // alternate setting
                0x02, // bulk OUT + bulk IN
                AUDIO_CLASS,
                MIDI_STREAMING,
                PROTOCOL_UNDEFINED,
                0x00,
            ],
        );
        let ms_len = ((MS_HEADER_SIZE + self.cables as usize * JACK_LEN) as u16).to_le_bytes();
        writer.write(
            CS_INTERFACE,
            &[
                MS_HEADER, // MIDI Header
                0x00,
                0x01, // revision (little endian)
                ms_len[0],
                ms_len[1], // total length -- header and jacks
            ],
        );

        for cable in 1..=self.cables {
            writer.jacks(cable, self.cable_string_id(cable));
        }

        // Host to device: feeds the embedded IN jacks
        writer.endpoint(self.ep_out);
        writer.embedded_jacks(self.cables, jack_id_in_embedded);

        // Device to host: drains the embedded OUT jacks
        writer.endpoint(self.ep_in);
        writer.embedded_jacks(self.cables, jack_id_out_embedded);

        let written = writer.position();
        assert_eq!(
            written, total_len,
            "MIDI descriptor length does not match the declared length"
        );
        log::trace!("MIDI descriptor: {} bytes for interface {}", written, interface);
        Ok(written)
    }

    #[cfg(feature = "std")]
    pub fn to_vec(&self, interface: u8) -> std::vec::Vec<u8> {
        let mut buf = std::vec![0; self.total_length()];
        self.write_to(interface, &mut buf)
            .expect("buffer sized from declared length");
        buf
    }
}

/// Sequential descriptor writer. Each block is prefixed with its length and
/// descriptor type. Callers check the total size up front.
struct Writer<'b> {
    buf: &'b mut [u8],
    position: usize,
}

impl<'b> Writer<'b> {
    fn new(buf: &'b mut [u8]) -> Self {
        Writer { buf, position: 0 }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn write(&mut self, descriptor_type: u8, descriptor: &[u8]) {
        let length = descriptor.len() + 2;
        let dst = &mut self.buf[self.position..self.position + length];
        dst[0] = length as u8;
        dst[1] = descriptor_type;
        dst[2..].copy_from_slice(descriptor);
        self.position += length;
    }

    fn jacks(&mut self, cable: u8, string_id: u8) {
        self.write(
            CS_INTERFACE,
            &[MIDI_IN_JACK, EMBEDDED, jack_id_in_embedded(cable), string_id],
        );
        self.write(
            CS_INTERFACE,
            &[MIDI_IN_JACK, EXTERNAL, jack_id_in_external(cable), string_id],
        );
        self.write(
            CS_INTERFACE,
            &[
                MIDI_OUT_JACK,
                EMBEDDED,
                jack_id_out_embedded(cable),
                0x01, // number of input pins
                jack_id_in_external(cable),
                0x01, // source pin
                string_id,
            ],
        );
        self.write(
            CS_INTERFACE,
            &[
                MIDI_OUT_JACK,
                EXTERNAL,
                jack_id_out_external(cable),
                0x01,
                jack_id_in_embedded(cable),
                0x01,
                string_id,
            ],
        );
    }

    fn endpoint(&mut self, address: EndpointAddress) {
        let size = MAX_PACKET_SIZE.to_le_bytes();
        self.write(
            ENDPOINT,
            &[
                u8::from(address),
                EndpointType::Bulk as u8,
                size[0],
                size[1],
                0x00, // interval
                0x00, // refresh
                0x00, // synch address
            ],
        );
    }

    fn embedded_jacks(&mut self, cables: u8, jack_id: fn(u8) -> u8) {
        let mut block = [0u8; 2 + MAX_CABLES];
        block[0] = MS_GENERAL;
        block[1] = cables; // number of embedded jacks
        for cable in 1..=cables {
            block[1 + cable as usize] = jack_id(cable);
        }
        self.write(CS_ENDPOINT, &block[..2 + cables as usize]);
    }
}
