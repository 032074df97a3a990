use core::fmt;

use crate::drivers::serial::UsartHw;

/// A simple writer that writes to a serial console.
///
/// Bytes go out with a busy-wait on the transmitter; nothing is buffered.
pub struct Writer<'a> {
    serial: &'a dyn UsartHw,
}

impl<'a> Writer<'a> {
    /// Creates a writer over the given console.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut writer = Writer::new(&USB_USART);
    /// writer.write(b'A');
    /// ```
    pub fn new(serial: &'a dyn UsartHw) -> Writer<'a> {
        Writer { serial }
    }

    /// Writes a byte to the serial port.
    pub fn write(&mut self, byte: u8) {
        self.serial.send(byte);
    }
}

impl fmt::Write for Writer<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.write(byte);
        }
        Ok(())
    }
}
