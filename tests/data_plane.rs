//! Reads and writes through a started device: lazy start, host mount
//! gating and the empty results returned while nothing can move.

use midiusb::mock::MockStack;
use midiusb::{EventPacket, MidiDevice, MidiDeviceBuilder};

fn mounted() -> MidiDevice<MockStack> {
    let mut device = MidiDevice::new(MockStack::new());
    device.stack_mut().mounted = true;
    device
}

#[test]
fn first_use_starts_the_device() {
    let mut device = MidiDevice::new(MockStack::new());
    assert!(!device.connected());
    assert!(device.is_running());
    assert_eq!(device.stack().interfaces.len(), 1);
}

#[test]
fn disabled_auto_start_keeps_device_idle() {
    let mut device = MidiDeviceBuilder::new(MockStack::new())
        .auto_start(false)
        .build()
        .unwrap();
    device.stack_mut().mounted = true;
    device.stack_mut().rx_bytes.push_back(0x90);

    assert!(!device.is_ready());
    assert_eq!(device.write_byte(0x90), 0);
    assert_eq!(device.available(), 0);
    assert_eq!(device.read_byte(), None);
    assert!(!device.is_running());
    assert!(device.stack().calls.is_empty());

    device.begin().unwrap();
    assert_eq!(device.read_byte(), Some(0x90));
}

#[test]
fn unmounted_device_returns_empty_results() {
    let mut device = MidiDevice::new(MockStack::new());
    device.stack_mut().rx_bytes.extend([1, 2, 3].iter());
    device.stack_mut().rx_packets.push_back([0x09, 0x90, 0x40, 0x7F]);

    assert_eq!(device.write_byte(0x90), 0);
    assert_eq!(device.write(&[0x90, 0x40, 0x7F]), 0);
    assert!(!device.write_packet(&[0x09, 0x90, 0x40, 0x7F]));
    assert_eq!(device.available(), 0);
    assert_eq!(device.read_byte(), None);
    assert_eq!(device.read_packet(), None);
    assert_eq!(device.read_event_packet(), EventPacket::default());

    let stack = device.stack();
    assert!(stack.tx_stream.is_empty());
    assert!(stack.tx_packets.is_empty());
    assert_eq!(stack.rx_bytes.len(), 3);
    assert_eq!(stack.rx_packets.len(), 1);
}

#[test]
fn connected_follows_mount_state() {
    let mut device = MidiDevice::new(MockStack::new());
    device.begin().unwrap();
    assert!(!device.connected());

    device.stack_mut().mounted = true;
    assert!(device.connected());
    assert!(device.is_ready());

    device.stack_mut().mounted = false;
    assert!(!device.connected());
}

#[test]
fn write_then_available_reports_queued_bytes() {
    let mut device = mounted();
    device.stack_mut().rx_bytes.extend([0x80, 0x40].iter());

    assert_eq!(device.write_byte(0x90), 1);
    assert_eq!(device.available(), 2);
    assert_eq!(device.stack().tx_stream, vec![(0, vec![0x90])]);
}

#[test]
fn buffer_writes_go_to_the_requested_cable() {
    let mut device = MidiDevice::with_cables(MockStack::new(), 2).unwrap();
    device.stack_mut().mounted = true;

    assert_eq!(device.write(&[0x90, 0x40, 0x7F]), 3);
    assert_eq!(device.write_cable(1, &[0xF8]), 1);
    assert_eq!(device.write_cable(2, &[0xF8]), 0);
    assert_eq!(
        device.stack().tx_stream,
        vec![(0, vec![0x90, 0x40, 0x7F]), (1, vec![0xF8])]
    );
}

#[test]
fn send_midi_uses_the_packet_path() {
    let mut device = mounted();
    let event = EventPacket {
        header: 0x09,
        byte1: 0x90,
        byte2: 0x40,
        byte3: 0x7F,
    };

    assert!(device.send_midi(event));
    assert_eq!(device.stack().tx_packets, vec![[0x09, 0x90, 0x40, 0x7F]]);
    assert!(device.stack().tx_stream.is_empty());
}

#[test]
fn read_byte_consumes_one_byte() {
    let mut device = mounted();
    device.stack_mut().rx_bytes.extend([0x90, 0x3C].iter());

    assert_eq!(device.read_byte(), Some(0x90));
    assert_eq!(device.available(), 1);
    assert_eq!(device.read_byte(), Some(0x3C));
    assert_eq!(device.read_byte(), None);
}

#[test]
fn read_event_packet_fills_fields_in_order() {
    let mut device = mounted();
    device.stack_mut().rx_packets.push_back([0x08, 0x80, 0x3C, 0x00]);

    let packet = device.read_event_packet();
    assert_eq!(
        packet,
        EventPacket {
            header: 0x08,
            byte1: 0x80,
            byte2: 0x3C,
            byte3: 0x00,
        }
    );
    assert_eq!(packet.code_index_number(), 0x08);
}

#[test]
fn empty_reads_are_never_partial() {
    let mut device = mounted();
    assert_eq!(device.read_byte(), None);
    assert_eq!(device.read_packet(), None);
    assert_eq!(device.read_event_packet(), EventPacket::default());
}

#[test]
fn raw_packets_round_trip_through_the_stack() {
    let mut device = mounted();
    assert!(device.write_packet(&[0x0B, 0xB0, 0x07, 0x64]));
    let written = device.stack().tx_packets[0];
    device.stack_mut().rx_packets.push_back(written);
    assert_eq!(device.read_packet(), Some([0x0B, 0xB0, 0x07, 0x64]));
}

#[test]
fn peek_and_flush_never_change_state() {
    let mut device = mounted();
    device.stack_mut().rx_bytes.push_back(0x90);

    assert_eq!(device.peek(), None);
    device.flush();
    assert!(!device.is_running());
    assert!(device.stack().calls.is_empty());

    device.begin().unwrap();
    assert_eq!(device.peek(), None);
    device.flush();
    assert_eq!(device.available(), 1);
}

#[test]
fn stopped_device_restarts_on_next_use() {
    let mut device = mounted();
    device.begin().unwrap();
    device.end();
    assert!(!device.is_running());

    assert_eq!(device.write_byte(0xF8), 1);
    assert!(device.is_running());
}
