/*
 * Input/Output System
 *
 * UNIX-style character I/O over the board's serial lines: a fixed
 * descriptor table of devices, each with an interrupt-fed receive ring,
 * and a mode engine that turns read()/write() requests into single-byte
 * transfers.
 *
 * Layering, bottom up:
 *   mmio      register access
 *   ring      SPSC receive ring (ISR producer, foreground consumer)
 *   mode      exact-count / line / string / program-memory transfers
 *   *_device  Device implementations (null, USART-backed lines)
 *   fd        descriptor table and the public entry points
 */

pub mod control;
pub mod device;
pub mod fd;
pub mod mmio;
pub mod mode;
pub mod null_device;
pub mod ring;
pub mod serial_lines;
pub mod stream;
pub mod usart_device;

pub use mmio::{Io, Mmio, ReadOnly};

pub use control::{Baud, ControlFlags, DeviceFlags, NO_LIMIT, RX_BUFSIZE, SizeLimit};
pub use device::{Device, Errno};
pub use fd::{Board, DescriptorTable, DeviceId, Handle};
pub use mode::{LINE_MODE, PSTR_MODE, STR_MODE};
pub use ring::{RxConsumer, RxProducer, RxRing};
pub use serial_lines::{Rs485Device, UsbDevice};
pub use stream::Stream;
pub use usart_device::SerialBinding;
