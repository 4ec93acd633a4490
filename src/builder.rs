use crate::error::{MidiError, Result};
use crate::midi::descriptors::MAX_CABLES;
use crate::midi::device::MidiDevice;
use crate::stack::UsbStack;

/// Used to configure and construct a [`MidiDevice`] before it is started.
///
/// Names are registered with the stack in [`build`](Self::build), so the
/// builder itself never touches the stack.
pub struct MidiDeviceBuilder<S: UsbStack> {
    stack: S,
    cables: u8,
    name: Option<&'static str>,
    cable_names: [Option<&'static str>; MAX_CABLES],
    invalid_cable: Option<u8>,
    auto_start: bool,
}

impl<S: UsbStack> MidiDeviceBuilder<S> {
    pub fn new(stack: S) -> Self {
        MidiDeviceBuilder {
            stack,
            cables: 1,
            name: None,
            cable_names: [None; MAX_CABLES],
            invalid_cable: None,
            auto_start: true,
        }
    }

    /// Number of virtual cables, `1..=MAX_CABLES`. Default: 1
    pub fn cables(mut self, cables: u8) -> Self {
        self.cables = cables;
        self
    }

    /// Interface name. Default: `"PicoMIDI"`
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Name of cable `id` (1-based). Cable 1 defaults to `"virtual-cable"`,
    /// the others stay unnamed.
    pub fn cable_name(mut self, id: u8, name: &'static str) -> Self {
        match self.cable_names.get_mut((id as usize).wrapping_sub(1)) {
            Some(slot) => *slot = Some(name),
            None => self.invalid_cable = Some(id),
        }
        self
    }

    /// Start the device on the first data-plane call. Default: true
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Creates the device, registering the configured names.
    pub fn build(self) -> Result<MidiDevice<S>> {
        if let Some(id) = self.invalid_cable {
            return Err(MidiError::InvalidCable(id));
        }

        let mut device = MidiDevice::with_cables(self.stack, self.cables)?;
        device.set_auto_start(self.auto_start);
        if let Some(name) = self.name {
            device.set_name(name)?;
        }
        for (id, name) in (1..).zip(self.cable_names.iter().copied()) {
            if let Some(name) = name {
                device.set_cable_name(id, name)?;
            }
        }
        Ok(device)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::mock::MockStack;

    #[test]
    fn defaults() {
        let device = MidiDeviceBuilder::new(MockStack::new()).build().unwrap();
        assert_eq!(device.cables(), 1);
        assert!(device.auto_start());
        assert!(!device.is_running());
        assert!(device.stack().strings.is_empty());
    }

    #[test]
    fn names_are_registered_in_order() {
        let device = MidiDeviceBuilder::new(MockStack::new())
            .cables(3)
            .name("Synth")
            .cable_name(3, "Drums")
            .cable_name(1, "Keys")
            .build()
            .unwrap();
        assert_eq!(device.cables(), 3);
        assert_eq!(device.stack().strings, vec!["Synth", "Keys", "Drums"]);
    }

    #[test]
    fn cable_beyond_count_is_rejected() {
        let result = MidiDeviceBuilder::new(MockStack::new())
            .cables(2)
            .cable_name(3, "Drums")
            .build();
        assert_eq!(result.err(), Some(MidiError::InvalidCable(3)));
    }

    #[test]
    fn cable_zero_is_rejected() {
        let result = MidiDeviceBuilder::new(MockStack::new())
            .cable_name(0, "Nope")
            .build();
        assert_eq!(result.err(), Some(MidiError::InvalidCable(0)));
    }

    #[test]
    fn invalid_cable_count() {
        let result = MidiDeviceBuilder::new(MockStack::new()).cables(9).build();
        assert_eq!(result.err(), Some(MidiError::InvalidCableCount(9)));
    }
}
