/*
 * USART Device Control Block
 *
 * Device trait implementation shared by every USART-backed logical
 * device. One control block per line holds:
 *  - the consumer half of the line's receive ring
 *  - flags, baud rate and size limits (foreground-only, behind a spin lock)
 *  - the register blocks it drives, bound once when the table is built
 *
 * What differs between lines (pin setup, half-duplex turnaround) lives in
 * a LineDriver; see serial_lines.rs.
 *
 * Reads sleep in wait_for_data() when the ring is empty and blocking is
 * on. Writes are synchronous: each byte spins on the transmit data
 * register, there is no transmit buffer.
 */

use spin::Mutex;

use super::control::{Baud, ControlFlags, DeviceFlags, RX_BUFSIZE, SizeLimit};
use super::device::{Device, Errno};
use super::fd::Handle;
use super::mode::{self, CharIo};
use super::ring::RxConsumer;
use crate::drivers::serial::{PortHw, UsartHw};
use crate::scheduler::{WaitForInterrupt, wait_for_data};

/// Hardware a serial device is bound to
pub struct SerialBinding<'a> {
    pub hw: &'a dyn UsartHw,
    pub port: &'a dyn PortHw,
    pub rx: RxConsumer<'a, RX_BUFSIZE>,
}

/// Line-specific behaviour layered on the generic USART device
pub trait LineDriver: Sync + Sized {
    /// Device name for log output
    const NAME: &'static str;

    /// Configure the line's pins at open
    fn open_pins(&self, port: &dyn PortHw);

    /// Send one byte on the wire
    fn transmit(
        &self,
        usart: &UsartDevice<'_, Self>,
        flags: DeviceFlags,
        c: u8,
    ) -> Result<u8, Errno> {
        usart.transmit(flags, c)
    }
}

/// Foreground configuration of one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsartState {
    pub flags: DeviceFlags,
    pub baud: Baud,
    pub rx_limit: SizeLimit,
    pub tx_limit: SizeLimit,
}

/// USART device control block
pub struct UsartDevice<'a, L: LineDriver> {
    handle: Handle,
    line: L,
    hw: &'a dyn UsartHw,
    port: &'a dyn PortHw,
    rx: RxConsumer<'a, RX_BUFSIZE>,
    console: &'a dyn UsartHw,
    waiter: &'a dyn WaitForInterrupt,
    state: Mutex<Option<UsartState>>, // None until opened
}

impl<'a, L: LineDriver> UsartDevice<'a, L> {
    /// Create a closed device
    ///
    /// `console` receives echoed characters.
    pub fn new(
        handle: Handle,
        line: L,
        binding: SerialBinding<'a>,
        console: &'a dyn UsartHw,
        waiter: &'a dyn WaitForInterrupt,
    ) -> Self {
        Self {
            handle,
            line,
            hw: binding.hw,
            port: binding.port,
            rx: binding.rx,
            console,
            waiter,
            state: Mutex::new(None),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn port(&self) -> &'a dyn PortHw {
        self.port
    }

    pub fn hw(&self) -> &'a dyn UsartHw {
        self.hw
    }

    /// Current configuration, EBADF if the device was never opened
    pub fn state(&self) -> Result<UsartState, Errno> {
        (*self.state.lock()).ok_or(Errno::EBADF)
    }

    /// Bytes waiting in the receive ring
    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }

    /// Send one byte, honouring the write-blocking flag
    pub fn transmit(&self, flags: DeviceFlags, c: u8) -> Result<u8, Errno> {
        while !self.hw.tx_ready() {
            if !flags.contains(DeviceFlags::WR_BLOCK) {
                return Err(Errno::EAGAIN);
            }
            core::hint::spin_loop();
        }
        self.hw.write_data(c);
        Ok(c)
    }

    fn read_char(&self, flags: DeviceFlags) -> Result<u8, Errno> {
        wait_for_data(&self.rx, flags.contains(DeviceFlags::RD_BLOCK), self.waiter)?;
        let c = self.rx.pop().ok_or(Errno::EINTERNAL)?;
        if flags.contains(DeviceFlags::ECHO) {
            self.console.send(c);
        }
        Ok(c)
    }

    fn write_char(&self, flags: DeviceFlags, c: u8) -> Result<u8, Errno> {
        if c == b'\n' && flags.contains(DeviceFlags::CRLF) {
            self.line.transmit(self, flags, b'\r')?;
        }
        self.line.transmit(self, flags, c)
    }

    /// Snapshot the flags and check the direction is enabled
    fn session(&self, direction: DeviceFlags) -> Result<(UsartState, Session<'_, 'a, L>), Errno> {
        let state = self.state()?;
        if !state.flags.contains(direction) {
            return Err(Errno::EBADF);
        }
        Ok((state, Session { dev: self, flags: state.flags }))
    }
}

impl<L: LineDriver> Device for UsartDevice<'_, L> {
    fn open(&self, control: ControlFlags) -> Result<(), Errno> {
        let flags = DeviceFlags::from_open(control)?;
        let baud = control.baud_rate()?.resolve();

        self.hw.disable_rx_interrupt();
        self.rx.reset();
        *self.state.lock() = Some(UsartState {
            flags,
            baud,
            rx_limit: SizeLimit::DEFAULT_RX,
            tx_limit: SizeLimit::DEFAULT_TX,
        });

        self.hw.set_baud(baud.setting());
        self.line.open_pins(self.port);
        self.hw.enable();

        log::debug!(
            "xio: opened {} as fd {} at {} baud, flags {:?}",
            L::NAME,
            self.handle.raw(),
            baud.bits_per_second(),
            flags
        );
        Ok(())
    }

    fn close(&self) -> Result<(), Errno> {
        log::debug!("xio: close fd {} ({}) leaves the line running", self.handle.raw(), L::NAME);
        Ok(())
    }

    fn control(&self, control: ControlFlags, arg: i16) -> Result<(), Errno> {
        let mut guard = self.state.lock();
        let state = guard.as_mut().ok_or(Errno::EBADF)?;

        // validate everything before touching the device
        let baud = control.baud_rate()?;
        let rx_limit = match control.contains(ControlFlags::RD_SIZE_MAX) {
            true => Some(SizeLimit::from_arg(arg)?),
            false => None,
        };
        let tx_limit = match control.contains(ControlFlags::WR_SIZE_MAX) {
            true => Some(SizeLimit::from_arg(arg)?),
            false => None,
        };

        if baud != Baud::Unspecified {
            state.baud = baud;
            self.hw.set_baud(baud.setting());
        }
        state.flags.apply(control);
        if let Some(limit) = rx_limit {
            state.rx_limit = limit;
        }
        if let Some(limit) = tx_limit {
            state.tx_limit = limit;
        }

        log::debug!("xio: control fd {} -> {:?}", self.handle.raw(), state);
        Ok(())
    }

    fn read(&self, buf: &mut [u8], request: i16) -> Result<usize, Errno> {
        let (state, io) = self.session(DeviceFlags::RD)?;
        mode::read(&io, buf, request, state.rx_limit)
    }

    fn write(&self, buf: &[u8], request: i16) -> Result<usize, Errno> {
        let (state, io) = self.session(DeviceFlags::WR)?;
        mode::write(&io, buf, request, state.tx_limit)
    }

    fn getc(&self) -> Result<u8, Errno> {
        let (_, io) = self.session(DeviceFlags::RD)?;
        io.get_char()
    }

    fn putc(&self, c: u8) -> Result<u8, Errno> {
        let (_, io) = self.session(DeviceFlags::WR)?;
        io.put_char(c)
    }
}

/// One read or write call's view of a device, with flags fixed at entry
struct Session<'d, 'a, L: LineDriver> {
    dev: &'d UsartDevice<'a, L>,
    flags: DeviceFlags,
}

impl<L: LineDriver> CharIo for Session<'_, '_, L> {
    fn get_char(&self) -> Result<u8, Errno> {
        self.dev.read_char(self.flags)
    }

    fn put_char(&self, c: u8) -> Result<u8, Errno> {
        self.dev.write_char(self.flags, c)
    }
}
