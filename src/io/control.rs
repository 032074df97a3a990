/*
 * Open/Control Parameters
 *
 * The control word accepted by open() and control(), the per-device
 * state flags it is folded into, the baud rate enumeration and the
 * size limits that bound line and string transfers.
 *
 * Control word layout:
 *   bits 0-3   baud rate enumeration (0 = unspecified)
 *   bits 8-19  direction, echo, blocking, size-limit and CR/LF requests
 */

use bitflags::bitflags;

use super::device::Errno;

/// Depth of each receive ring (one slot is never used, one is lost to
/// head/tail collision detection).
pub const RX_BUFSIZE: usize = 32;

/// Nominal size of a caller's line buffer; the default read limit leaves
/// room for the terminating NUL.
pub const READ_BUFFER_SIZE: usize = 64;

/// `control()` size argument meaning "no limit"
pub const NO_LIMIT: i16 = -1;

bitflags! {
    /// open() / control() parameter word
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlFlags: u32 {
        /// Baud rate enumeration mask (see `Baud`)
        const BAUD_MASK = 0x0000_000F;

        const RDWR = 0;             // read & write (default)
        const RDONLY = 1 << 8;      // read enable only
        const WRONLY = 1 << 9;      // write enable only

        const ECHO = 1 << 10;       // echo reads to the console
        const NOECHO = 1 << 11;

        const RDBLOCK = 1 << 12;    // reads sleep until data arrives
        const WRBLOCK = 1 << 13;    // writes spin until the transmitter is free
        const RDWRBLOCK = Self::RDBLOCK.bits() | Self::WRBLOCK.bits();
        const RDNONBLOCK = 1 << 14;
        const WRNONBLOCK = 1 << 15;
        const RDWRNONBLOCK = Self::RDNONBLOCK.bits() | Self::WRNONBLOCK.bits();

        const RD_SIZE_MAX = 1 << 16; // control() only, size in arg
        const WR_SIZE_MAX = 1 << 17; // control() only, size in arg

        const CRLF = 1 << 18;       // expand \n to \r\n on output
        const NOCRLF = 1 << 19;
    }
}

bitflags! {
    /// Per-device state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFlags: u8 {
        const RD = 1 << 0;
        const WR = 1 << 1;
        const RD_BLOCK = 1 << 2;
        const WR_BLOCK = 1 << 3;
        const ECHO = 1 << 4;
        const CRLF = 1 << 5;

        const DEFAULT = Self::RD.bits()
            | Self::WR.bits()
            | Self::RD_BLOCK.bits()
            | Self::WR_BLOCK.bits()
            | Self::ECHO.bits();
    }
}

impl ControlFlags {
    /// Control word selecting a baud rate
    pub const fn baud(baud: Baud) -> Self {
        Self::from_bits_retain(baud as u32)
    }

    /// Baud rate carried in the low nibble
    pub fn baud_rate(self) -> Result<Baud, Errno> {
        Baud::from_index((self.bits() & Self::BAUD_MASK.bits()) as u8).ok_or(Errno::EINVAL)
    }
}

impl DeviceFlags {
    /// Flags for a freshly opened device
    ///
    /// Rejects RDONLY together with WRONLY; RDWR is spelled as neither.
    pub fn from_open(control: ControlFlags) -> Result<Self, Errno> {
        if control.contains(ControlFlags::RDONLY | ControlFlags::WRONLY) {
            return Err(Errno::EINVAL);
        }
        let mut flags = Self::DEFAULT;
        if control.contains(ControlFlags::RDONLY) {
            flags.remove(Self::WR);
        } else if control.contains(ControlFlags::WRONLY) {
            flags.remove(Self::RD);
        }
        flags.apply(control);
        Ok(flags)
    }

    /// Fold echo, blocking and CR/LF requests into the flags
    ///
    /// When both the enable and disable request are present the disable wins.
    pub fn apply(&mut self, control: ControlFlags) {
        let pairs = [
            (ControlFlags::ECHO, ControlFlags::NOECHO, Self::ECHO),
            (ControlFlags::RDBLOCK, ControlFlags::RDNONBLOCK, Self::RD_BLOCK),
            (ControlFlags::WRBLOCK, ControlFlags::WRNONBLOCK, Self::WR_BLOCK),
            (ControlFlags::CRLF, ControlFlags::NOCRLF, Self::CRLF),
        ];
        for (on, off, flag) in pairs {
            if control.contains(on) {
                self.insert(flag);
            }
            if control.contains(off) {
                self.remove(flag);
            }
        }
    }
}

/// Baud rate selector
///
/// Enumerated rather than raw so the register values come from a fixed
/// table (32 MHz peripheral clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Baud {
    Unspecified = 0,
    B9600 = 1,
    B19200 = 2,
    B38400 = 3,
    B57600 = 4,
    B115200 = 5,
    B230400 = 6,
    B460800 = 7,
    B921600 = 8,
    B500000 = 9,
    B1000000 = 10,
}

/// BAUDCTRLA values, indexed by `Baud`
const BSEL: [u8; 11] = [0, 207, 103, 51, 34, 33, 31, 27, 19, 1, 1];

/// BAUDCTRLB values (BSCALE in the high nibble), indexed by `Baud`
const BSCALE: [u8; 11] = [0, 0, 0, 0, 0, 0xF0, 0xE0, 0xD0, 0xC0, 0x10, 1];

/// Register values for one baud rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudSetting {
    pub bsel: u8,
    pub bscale: u8,
}

impl Baud {
    pub const DEFAULT: Baud = Baud::B115200;

    const ALL: [Baud; 11] = [
        Baud::Unspecified,
        Baud::B9600,
        Baud::B19200,
        Baud::B38400,
        Baud::B57600,
        Baud::B115200,
        Baud::B230400,
        Baud::B460800,
        Baud::B921600,
        Baud::B500000,
        Baud::B1000000,
    ];

    pub fn from_index(index: u8) -> Option<Baud> {
        Self::ALL.get(index as usize).copied()
    }

    /// Replace Unspecified with the default rate
    pub fn resolve(self) -> Baud {
        match self {
            Baud::Unspecified => Self::DEFAULT,
            baud => baud,
        }
    }

    /// Register values for this rate (Unspecified resolves to the default)
    pub fn setting(self) -> BaudSetting {
        let index = self.resolve() as usize;
        BaudSetting {
            bsel: BSEL[index],
            bscale: BSCALE[index],
        }
    }

    pub fn bits_per_second(self) -> u32 {
        match self.resolve() {
            Baud::B9600 => 9_600,
            Baud::B19200 => 19_200,
            Baud::B38400 => 38_400,
            Baud::B57600 => 57_600,
            Baud::B230400 => 230_400,
            Baud::B460800 => 460_800,
            Baud::B921600 => 921_600,
            Baud::B500000 => 500_000,
            Baud::B1000000 => 1_000_000,
            Baud::B115200 | Baud::Unspecified => 115_200,
        }
    }
}

/// Upper bound on bytes moved by one read or write call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLimit {
    Max(usize),
    NoLimit,
}

impl SizeLimit {
    pub const DEFAULT_RX: SizeLimit = SizeLimit::Max(READ_BUFFER_SIZE - 1);
    pub const DEFAULT_TX: SizeLimit = SizeLimit::NoLimit;

    /// Parse a control() size argument: 1..=i16::MAX or NO_LIMIT
    pub fn from_arg(arg: i16) -> Result<Self, Errno> {
        match arg {
            NO_LIMIT => Ok(SizeLimit::NoLimit),
            n if n > 0 => Ok(SizeLimit::Max(n as usize)),
            _ => Err(Errno::EINVAL),
        }
    }

    /// True if an exact-count request is over the limit
    pub fn exceeded_by(self, request: usize) -> bool {
        match self {
            SizeLimit::Max(max) => request > max,
            SizeLimit::NoLimit => false,
        }
    }

    /// The limit clamped to what the caller's buffer can hold
    pub fn bound(self, capacity: usize) -> usize {
        match self {
            SizeLimit::Max(max) => max.min(capacity),
            SizeLimit::NoLimit => capacity,
        }
    }
}
