/*
 * stdio-style Stream
 *
 * Binds a handle to the descriptor table so formatted output can go
 * straight to a device:
 *
 * ```rust,ignore
 * let mut out = Stream::new(&table, Handle::USB);
 * write!(out, "ok {}\n", n)?;
 * let cmd = out.read_line::<64>()?;
 * ```
 */

use core::fmt;

use heapless::Vec;

use super::device::Errno;
use super::fd::{DescriptorTable, Handle};

pub struct Stream<'t, 'a> {
    table: &'t DescriptorTable<'a>,
    handle: Handle,
}

impl<'t, 'a> Stream<'t, 'a> {
    pub fn new(table: &'t DescriptorTable<'a>, handle: Handle) -> Self {
        Self { table, handle }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Read one line, delimiter included, terminator stripped
    ///
    /// The line is bounded by N-1 bytes and the device read limit.
    pub fn read_line<const N: usize>(&self) -> Result<Vec<u8, N>, Errno> {
        let mut buf = [0u8; N];
        let n = self.table.readln(self.handle, &mut buf)?;
        Vec::from_slice(&buf[..n]).map_err(|_| Errno::EINTERNAL)
    }

    pub fn getc(&self) -> Result<u8, Errno> {
        self.table.getc(self.handle)
    }

    pub fn putc(&self, c: u8) -> Result<u8, Errno> {
        self.table.putc(self.handle, c)
    }
}

impl fmt::Write for Stream<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.putc(byte).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}
