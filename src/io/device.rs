/*
 * Device Abstraction Layer
 *
 * Character-device trait implemented by every logical device the
 * descriptor table can hand out (null, USB serial, RS-485).
 *
 * Devices look like UNIX files: they are opened with a control word,
 * reconfigured with control(), and moved through read()/write() in one
 * of the transfer modes understood by the mode engine (see mode.rs).
 */

use core::fmt;

use super::control::ControlFlags;

/// Device trait for serial-class character devices
///
/// One implementation per device variant; the descriptor table picks the
/// implementation from the handle, so no function pointers are stored in
/// the control blocks.
pub trait Device: Sync {
    /// Initialize the device from an open() control word
    ///
    /// Resets the receive buffer, resolves the baud rate and applies flag
    /// defaults before the receive path is enabled.
    fn open(&self, control: ControlFlags) -> Result<(), Errno>;

    /// Close the device
    ///
    /// Advisory only. Hardware stays powered and configured.
    fn close(&self) -> Result<(), Errno> {
        Ok(())
    }

    /// Apply control flags after open (baud, echo, blocking, size limits)
    ///
    /// `arg` carries the size for `RD_SIZE_MAX` / `WR_SIZE_MAX`.
    fn control(&self, control: ControlFlags, arg: i16) -> Result<(), Errno>;

    /// Read into buf according to `request` (see mode.rs)
    ///
    /// Returns the number of bytes transferred.
    fn read(&self, buf: &mut [u8], request: i16) -> Result<usize, Errno>;

    /// Write from buf according to `request` (see mode.rs)
    ///
    /// Returns the number of source bytes consumed.
    fn write(&self, buf: &[u8], request: i16) -> Result<usize, Errno>;

    /// Read a single byte
    ///
    /// Blocks until data arrives when blocking reads are enabled.
    fn getc(&self) -> Result<u8, Errno>;

    /// Write a single byte, returning the byte written
    fn putc(&self, c: u8) -> Result<u8, Errno>;
}

/// POSIX errno values
///
/// Subset of standard POSIX error codes used by the I/O layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Errno {
    EBADF = 9,       // Device not open (or not open for this direction)
    EAGAIN = 11,     // Try again
    ENODEV = 19,     // No such device
    EINVAL = 22,     // Invalid argument
    EFBIG = 27,      // Request larger than the configured limit
    EMSGSIZE = 90,   // Message exceeded the limit before it terminated
    EINTERNAL = 255, // Unreachable dispatch path
}

impl Errno {
    /// Numeric errno value
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Errno::EBADF => "bad file descriptor",
            Errno::EAGAIN => "resource temporarily unavailable",
            Errno::ENODEV => "no such device",
            Errno::EINVAL => "invalid argument",
            Errno::EFBIG => "request too big",
            Errno::EMSGSIZE => "message too long",
            Errno::EINTERNAL => "internal error",
        };
        f.write_str(msg)
    }
}
