/*
 * Null Device
 *
 * Handle 0. Always open, never has input, swallows output. Writes still
 * go through the mode engine so callers get the same counts and
 * termination errors they would from a real line.
 */

use super::control::{ControlFlags, SizeLimit};
use super::device::{Device, Errno};
use super::mode::{self, CharIo};

#[derive(Debug, Default, Clone, Copy)]
pub struct NullDevice;

impl CharIo for NullDevice {
    fn get_char(&self) -> Result<u8, Errno> {
        Err(Errno::EAGAIN)
    }

    fn put_char(&self, c: u8) -> Result<u8, Errno> {
        Ok(c)
    }
}

impl Device for NullDevice {
    fn open(&self, control: ControlFlags) -> Result<(), Errno> {
        if control.contains(ControlFlags::RDONLY | ControlFlags::WRONLY) {
            return Err(Errno::EINVAL);
        }
        control.baud_rate().map(|_| ())
    }

    fn control(&self, control: ControlFlags, _arg: i16) -> Result<(), Errno> {
        if control.intersects(ControlFlags::RD_SIZE_MAX | ControlFlags::WR_SIZE_MAX) {
            return Err(Errno::EINVAL);
        }
        control.baud_rate().map(|_| ())
    }

    fn read(&self, _buf: &mut [u8], request: i16) -> Result<usize, Errno> {
        mode::Mode::decode(request)?;
        Ok(0)
    }

    fn write(&self, buf: &[u8], request: i16) -> Result<usize, Errno> {
        mode::write(self, buf, request, SizeLimit::NoLimit)
    }

    fn getc(&self) -> Result<u8, Errno> {
        self.get_char()
    }

    fn putc(&self, c: u8) -> Result<u8, Errno> {
        self.put_char(c)
    }
}
