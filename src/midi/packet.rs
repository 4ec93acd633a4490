/// One USB MIDI event packet: a header byte (cable number in the high
/// nibble, code index number in the low nibble) followed by up to three
/// MIDI bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventPacket {
    pub header: u8,
    pub byte1: u8,
    pub byte2: u8,
    pub byte3: u8,
}

impl EventPacket {
    /// Builds a packet for `cable` (0-based) with code index number `cin`.
    pub fn new(cable: u8, cin: u8, byte1: u8, byte2: u8, byte3: u8) -> Self {
        EventPacket {
            header: (cable << 4) | (cin & 0x0F),
            byte1,
            byte2,
            byte3,
        }
    }

    pub fn cable_number(&self) -> u8 {
        self.header >> 4
    }

    pub fn code_index_number(&self) -> u8 {
        self.header & 0x0F
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.header, self.byte1, self.byte2, self.byte3]
    }
}

impl From<[u8; 4]> for EventPacket {
    fn from(bytes: [u8; 4]) -> Self {
        EventPacket {
            header: bytes[0],
            byte1: bytes[1],
            byte2: bytes[2],
            byte3: bytes[3],
        }
    }
}

impl From<EventPacket> for [u8; 4] {
    fn from(packet: EventPacket) -> Self {
        packet.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_header() {
        let packet = EventPacket::new(2, 0x09, 0x90, 0x40, 0x7F);
        assert_eq!(packet.header, 0x29);
        assert_eq!(packet.cable_number(), 2);
        assert_eq!(packet.code_index_number(), 0x09);
    }

    #[test]
    fn bytes_keep_field_order() {
        let packet = EventPacket {
            header: 0x09,
            byte1: 0x90,
            byte2: 0x40,
            byte3: 0x7F,
        };
        assert_eq!(packet.to_bytes(), [0x09, 0x90, 0x40, 0x7F]);
        assert_eq!(EventPacket::from([0x08, 0x80, 0x40, 0x00]).byte1, 0x80);
    }

    #[test]
    fn default_is_all_zero() {
        assert_eq!(EventPacket::default().to_bytes(), [0; 4]);
    }
}
