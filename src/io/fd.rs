/*
 * Device Descriptor Table
 *
 * Fixed table of the logical devices the board exposes, and the
 * open/close/control/read/write/getc/putc entry points that route a
 * handle to its device.
 *
 * Handles are assigned at compile time, never allocated:
 * - 0: null device
 * - 1: USB serial (also reachable as the console)
 * - 2: RS-485
 *
 * Every other device identifier in the numbering is reserved. Opening one
 * fails with ENODEV, as does opening USARTC0/USARTC1 directly: those
 * UARTs belong to the USB and RS-485 devices built on them.
 */

use super::control::ControlFlags;
use super::device::{Device, Errno};
use super::mode::{LINE_MODE, PSTR_MODE, STR_MODE};
use super::null_device::NullDevice;
use super::serial_lines::{Rs485Device, Rs485Line, UsbDevice, UsbLine};
use super::usart_device::SerialBinding;
use crate::scheduler::WaitForInterrupt;

/// Handle of an open device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u8);

impl Handle {
    pub const NULL: Handle = Handle(0);
    pub const USB: Handle = Handle(1);
    pub const RS485: Handle = Handle(2);

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Device identifiers accepted by open()
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeviceId {
    Null = 0,
    PortA,
    PortB,
    PortC,
    PortD,
    PortE,
    PortF,
    PortG,
    PortH,
    PortJ,
    PortK,
    PortL,
    PortM,
    PortN,
    PortP,
    PortQ,
    PortR,
    UsartC0,
    UsartC1,
    UsartD0,
    UsartD1,
    UsartE0,
    UsartE1,
    UsartF0,
    UsartF1,
    SpiC,
    SpiD,
    SpiE,
    SpiF,
    TwiC,
    TwiE,
    Ircom,
    Aes,
    AdcA,
    AdcB,
    DacA,
    DacB,
    Sram,
    Eeprom,
    ProgMem,
    TableMem,
    BootMem,
    Console,
    Usb,
    Rs485,
    Encoders,
    Bridge,
}

/// Number of device identifiers
pub const DEVICE_COUNT: usize = DeviceId::Bridge as usize + 1;

/// Device identifier to handle, None for reserved identifiers
const FDES: [Option<Handle>; DEVICE_COUNT] = {
    let mut table = [None; DEVICE_COUNT];
    table[DeviceId::Null as usize] = Some(Handle::NULL);
    table[DeviceId::Console as usize] = Some(Handle::USB);
    table[DeviceId::Usb as usize] = Some(Handle::USB);
    table[DeviceId::Rs485 as usize] = Some(Handle::RS485);
    table
};

impl DeviceId {
    const ALL: [DeviceId; DEVICE_COUNT] = {
        use DeviceId::*;
        [
            Null, PortA, PortB, PortC, PortD, PortE, PortF, PortG, PortH, PortJ, PortK, PortL,
            PortM, PortN, PortP, PortQ, PortR, UsartC0, UsartC1, UsartD0, UsartD1, UsartE0,
            UsartE1, UsartF0, UsartF1, SpiC, SpiD, SpiE, SpiF, TwiC, TwiE, Ircom, Aes, AdcA,
            AdcB, DacA, DacB, Sram, Eeprom, ProgMem, TableMem, BootMem, Console, Usb, Rs485,
            Encoders, Bridge,
        ]
    };

    pub fn from_raw(raw: u8) -> Option<DeviceId> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Handle this identifier opens, if it is implemented
    pub fn handle(self) -> Option<Handle> {
        FDES[self as usize]
    }
}

/// Hardware the descriptor table is built over
pub struct Board<'a> {
    pub usb: SerialBinding<'a>,
    pub rs485: SerialBinding<'a>,
    /// Sleep primitive for blocking reads
    pub waiter: &'a dyn WaitForInterrupt,
}

/// The device table
///
/// Built once at startup from the board wiring. Lives for the rest of the
/// program; there is no teardown.
pub struct DescriptorTable<'a> {
    null: NullDevice,
    usb: UsbDevice<'a>,
    rs485: Rs485Device<'a>,
}

impl<'a> DescriptorTable<'a> {
    pub fn new(board: Board<'a>) -> Self {
        // echo always goes to the USB console
        let console = board.usb.hw;
        Self {
            null: NullDevice,
            usb: UsbDevice::new(Handle::USB, UsbLine, board.usb, console, board.waiter),
            rs485: Rs485Device::new(Handle::RS485, Rs485Line, board.rs485, console, board.waiter),
        }
    }

    pub fn usb(&self) -> &UsbDevice<'a> {
        &self.usb
    }

    pub fn rs485(&self) -> &Rs485Device<'a> {
        &self.rs485
    }

    fn device(&self, handle: Handle) -> Result<&dyn Device, Errno> {
        match handle {
            Handle::NULL => Ok(&self.null),
            Handle::USB => Ok(&self.usb),
            Handle::RS485 => Ok(&self.rs485),
            _ => Err(Errno::ENODEV),
        }
    }

    /// Open a device, returning its handle
    pub fn open(&self, id: DeviceId, control: ControlFlags) -> Result<Handle, Errno> {
        if matches!(id, DeviceId::UsartC0 | DeviceId::UsartC1) {
            log::warn!("xio: {:?} is claimed by a serial device, open it by name", id);
            return Err(Errno::ENODEV);
        }
        let Some(handle) = id.handle() else {
            log::warn!("xio: {:?} is not implemented", id);
            return Err(Errno::ENODEV);
        };
        self.device(handle)?.open(control).inspect_err(|e| {
            log::warn!("xio: open {:?} failed: {}", id, e);
        })?;
        Ok(handle)
    }

    /// Open by raw identifier
    pub fn open_raw(&self, id: u8, control: ControlFlags) -> Result<Handle, Errno> {
        let id = DeviceId::from_raw(id).ok_or(Errno::ENODEV)?;
        self.open(id, control)
    }

    /// Close a handle; the hardware stays configured
    pub fn close(&self, handle: Handle) -> Result<(), Errno> {
        self.device(handle)?.close()
    }

    pub fn control(&self, handle: Handle, control: ControlFlags, arg: i16) -> Result<(), Errno> {
        self.device(handle)?.control(control, arg).inspect_err(|e| {
            log::warn!("xio: control fd {} rejected: {}", handle.raw(), e);
        })
    }

    pub fn read(&self, handle: Handle, buf: &mut [u8], request: i16) -> Result<usize, Errno> {
        self.device(handle)?.read(buf, request)
    }

    pub fn write(&self, handle: Handle, buf: &[u8], request: i16) -> Result<usize, Errno> {
        self.device(handle)?.write(buf, request)
    }

    pub fn getc(&self, handle: Handle) -> Result<u8, Errno> {
        self.device(handle)?.getc()
    }

    pub fn putc(&self, handle: Handle, c: u8) -> Result<u8, Errno> {
        self.device(handle)?.putc(c)
    }

    /// Read one line (through \r, \n or ;)
    pub fn readln(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, Errno> {
        self.read(handle, buf, LINE_MODE)
    }

    /// Write one line (through \r, \n or ;)
    pub fn writeln(&self, handle: Handle, buf: &[u8]) -> Result<usize, Errno> {
        self.write(handle, buf, LINE_MODE)
    }

    /// Read up to a NUL
    pub fn readstr(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, Errno> {
        self.read(handle, buf, STR_MODE)
    }

    /// Write up to a NUL
    pub fn writestr(&self, handle: Handle, buf: &[u8]) -> Result<usize, Errno> {
        self.write(handle, buf, STR_MODE)
    }

    /// Write a string held in program memory
    pub fn writepstr(&self, handle: Handle, pstr: &'static [u8]) -> Result<usize, Errno> {
        self.write(handle, pstr, PSTR_MODE)
    }
}
