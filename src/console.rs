//! Diagnostic serial output.

use core::convert::Infallible;
use ufmt::uWrite;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Writes `bytes` as space separated, zero padded upper case hex.
pub fn write_hex<W: uWrite + ?Sized>(serial: &mut W, bytes: &[u8]) {
    for (i, byte) in bytes.iter().enumerate() {
        let digits = [HEX[(byte >> 4) as usize], HEX[(byte & 0x0F) as usize]];
        if i > 0 {
            serial.write_char(' ').ok();
        }
        // Both digits come from the ASCII table above
        if let Ok(text) = core::str::from_utf8(&digits) {
            serial.write_str(text).ok();
        }
    }
}

/// A serial sink that can be muted.
///
/// With `enabled == false` every write is dropped, so logging calls can stay
/// on the control path without changing what the gate does.
pub struct Console<W> {
    serial: W,
    enabled: bool,
}

impl<W: uWrite> Console<W> {
    pub fn new(serial: W, enabled: bool) -> Self {
        Console { serial, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn hex(&mut self, bytes: &[u8]) {
        if self.enabled {
            write_hex(&mut self.serial, bytes);
        }
    }

    pub fn serial(&self) -> &W {
        &self.serial
    }
}

impl<W: uWrite> uWrite for Console<W> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        if self.enabled {
            self.serial.write_str(s).ok();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::string::String;

    struct Capture(String);

    impl uWrite for Capture {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn hex_dump_is_zero_padded() {
        let mut out = Capture(String::new());
        write_hex(&mut out, &[0x01, 0xAB, 0x0F, 0xFF]);
        assert_eq!(out.0, "01 AB 0F FF");
    }

    #[test]
    fn muted_console_drops_output() {
        let mut console = Console::new(Capture(String::new()), false);
        ufmt::uwriteln!(console, "Card UID: {}", 7u8).ok();
        console.hex(&[0x12]);
        assert!(console.serial().0.is_empty());

        let mut console = Console::new(Capture(String::new()), true);
        ufmt::uwrite!(console, "block {}:", 9u8).ok();
        console.hex(&[0x12, 0x34]);
        assert_eq!(console.serial().0, "block 9:12 34");
    }
}
