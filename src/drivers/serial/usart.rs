use bitflags::bitflags;

use super::UsartHw;
use crate::io::control::BaudSetting;
use crate::io::{Io, Mmio};

bitflags! {
    /// Status flags
    struct StatusFlags: u8 {
        // 0 to 2 are error flags, not used right now
        const DATA_EMPTY = 1 << 5; // DREIF
        const TX_COMPLETE = 1 << 6; // TXCIF, cleared by writing 1
        const RX_COMPLETE = 1 << 7; // RXCIF
    }
}

bitflags! {
    /// Control register B flags
    struct CtrlBFlags: u8 {
        const TX_ENABLE = 1 << 3;
        const RX_ENABLE = 1 << 4;
    }
}

/// Receive-complete interrupt level mask (CTRLA bits 4-5)
const RXC_INT_LEVEL_MASK: u8 = 0x30;
/// Receive-complete interrupt at medium priority
const RXC_INT_LEVEL_MED: u8 = 0x20;
/// Asynchronous, 8 data bits, no parity, 1 stop bit
const CTRLC_8N1: u8 = 0x03;

/// XMEGA USART register block.
pub struct SerialPort<T: Io> {
    data: T,                // Data register, read to receive, write to send
    status: T,              // Status
    ctrl_a: T,              // Interrupt levels
    ctrl_b: T,              // Receiver/transmitter enable
    ctrl_c: T,              // Frame format
    baud_ctrl_a: T,         // BSEL[7:0]
    baud_ctrl_b: T,         // BSCALE[3:0] << 4 | BSEL[11:8]
}

impl SerialPort<Mmio<u8>> {
    /// Creates a serial port over the register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a USART register block (8 bytes) that
    /// stays mapped for the life of the returned value.
    pub const unsafe fn new(base: usize) -> SerialPort<Mmio<u8>> {
        // SAFETY: forwarded from the caller
        unsafe {
            SerialPort {
                data: Mmio::new(base),
                status: Mmio::new(base + 1),
                ctrl_a: Mmio::new(base + 3),
                ctrl_b: Mmio::new(base + 4),
                ctrl_c: Mmio::new(base + 5),
                baud_ctrl_a: Mmio::new(base + 6),
                baud_ctrl_b: Mmio::new(base + 7),
            }
        }
    }
}

impl<T: Io<Value = u8>> SerialPort<T> {
    /// Retrieves the status flags.
    fn status(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.status.read())
    }
}

impl<T: Io<Value = u8> + Sync> UsartHw for SerialPort<T> {
    fn set_baud(&self, setting: BaudSetting) {
        self.baud_ctrl_a.write(setting.bsel);
        self.baud_ctrl_b.write(setting.bscale);
    }

    fn enable(&self) {
        self.ctrl_c.write(CTRLC_8N1);
        self.ctrl_b.write((CtrlBFlags::TX_ENABLE | CtrlBFlags::RX_ENABLE).bits());
        self.ctrl_a.writef(RXC_INT_LEVEL_MASK, false);
        self.ctrl_a.writef(RXC_INT_LEVEL_MED, true);
    }

    fn disable_rx_interrupt(&self) {
        self.ctrl_a.writef(RXC_INT_LEVEL_MASK, false);
    }

    fn tx_ready(&self) -> bool {
        self.status().contains(StatusFlags::DATA_EMPTY)
    }

    fn tx_complete(&self) -> bool {
        self.status().contains(StatusFlags::TX_COMPLETE)
    }

    fn clear_tx_complete(&self) {
        self.status.write(StatusFlags::TX_COMPLETE.bits());
    }

    fn write_data(&self, byte: u8) {
        self.data.write(byte)
    }

    fn read_data(&self) -> u8 {
        self.data.read()
    }

    fn rx_pending(&self) -> bool {
        self.status().contains(StatusFlags::RX_COMPLETE)
    }
}
