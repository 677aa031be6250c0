//! State that survives a sleep/wake cycle.
//!
//! Everything else is rebuilt from constants on every wake. The platform
//! places a [`RetainedRegion`] in memory that start-up code does not clear
//! (`.noinit` on AVR). A region that fails validation, as after power-on,
//! reads back as [`RetainedState::default()`].

const MAGIC: u32 = 0x6A7E_C0DE;

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct RetainedState {
    /// Entries granted since power-on.
    pub gate_entries: u32,
    /// Part of the current wake interval still to be slept, 0 when the next
    /// wake should poll.
    pub sleep_remaining_us: u32,
}

impl RetainedState {
    pub const SERIALIZED_LEN: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_LEN] {
        let mut bytes = [0u8; Self::SERIALIZED_LEN];
        bytes[..4].copy_from_slice(&self.gate_entries.to_le_bytes());
        bytes[4..].copy_from_slice(&self.sleep_remaining_us.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: [u8; Self::SERIALIZED_LEN]) -> Self {
        let mut entries = [0u8; 4];
        let mut remaining = [0u8; 4];
        entries.copy_from_slice(&bytes[..4]);
        remaining.copy_from_slice(&bytes[4..]);
        RetainedState {
            gate_entries: u32::from_le_bytes(entries),
            sleep_remaining_us: u32::from_le_bytes(remaining),
        }
    }
}

pub trait RetainedStore {
    fn load(&self) -> RetainedState;

    fn store(&mut self, state: &RetainedState);

    /// Adds one granted entry and returns the new count.
    fn increment_entries(&mut self) -> u32 {
        let mut state = self.load();
        state.gate_entries = state.gate_entries.wrapping_add(1);
        self.store(&state);
        state.gate_entries
    }
}

impl<S: RetainedStore + ?Sized> RetainedStore for &mut S {
    fn load(&self) -> RetainedState {
        (**self).load()
    }

    fn store(&mut self, state: &RetainedState) {
        (**self).store(state)
    }
}

/// Raw layout of the retained memory. Every bit pattern is a valid value,
/// so uninitialized memory can be viewed through this type.
#[repr(C)]
pub struct RetainedRegion {
    magic: u32,
    payload: [u8; RetainedState::SERIALIZED_LEN],
    check: u32,
}

impl RetainedRegion {
    pub const fn new() -> Self {
        RetainedRegion {
            magic: 0,
            payload: [0; RetainedState::SERIALIZED_LEN],
            check: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC && self.check == checksum(&self.payload)
    }

    /// Drops whatever the region holds, as after a cold boot.
    pub fn invalidate(&mut self) {
        self.magic = 0;
    }
}

impl Default for RetainedRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl RetainedStore for RetainedRegion {
    fn load(&self) -> RetainedState {
        if self.is_valid() {
            RetainedState::from_bytes(self.payload)
        } else {
            RetainedState::default()
        }
    }

    fn store(&mut self, state: &RetainedState) {
        self.payload = state.to_bytes();
        self.check = checksum(&self.payload);
        self.magic = MAGIC;
    }
}

fn checksum(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(MAGIC, |acc, &b| acc.rotate_left(5) ^ u32::from(b))
}
