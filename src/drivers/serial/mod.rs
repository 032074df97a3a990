/*
 * Serial Communication Drivers
 *
 * Register-level drivers for the XMEGA USART and PORT blocks, the
 * hardware traits the device layer is written against, and the receive
 * interrupt entry point that feeds the ring buffers.
 */

pub mod irq;
pub mod port;
pub mod usart;

pub use irq::RxInterrupt;
pub use port::GpioPort;
pub use usart::SerialPort;

use crate::io::Mmio;
use crate::io::control::BaudSetting;

/// USARTC0, wired to the FTDI USB bridge
pub const USARTC0_BASE: usize = 0x08A0;
/// USARTC1, wired to the RS-485 transceiver
pub const USARTC1_BASE: usize = 0x08B0;
/// PORTC, carrying both USARTs' pins
pub const PORTC_BASE: usize = 0x0640;

/// USB bridge USART
// SAFETY: USARTC0 is a fixed peripheral block on the XMEGA A-series
pub static USB_USART: SerialPort<Mmio<u8>> = unsafe { SerialPort::new(USARTC0_BASE) };
/// RS-485 USART
// SAFETY: USARTC1 is a fixed peripheral block on the XMEGA A-series
pub static RS485_USART: SerialPort<Mmio<u8>> = unsafe { SerialPort::new(USARTC1_BASE) };
/// Port carrying the serial pins
// SAFETY: PORTC is a fixed peripheral block on the XMEGA A-series
pub static PORTC: GpioPort<Mmio<u8>> = unsafe { GpioPort::new(PORTC_BASE) };

/// USB pins on PORTC
pub mod usb_pins {
    pub const CTS: u8 = 1 << 0;
    pub const RTS: u8 = 1 << 1;
    pub const RX: u8 = 1 << 2;
    pub const TX: u8 = 1 << 3;
}

/// RS-485 pins on PORTC
pub mod rs485_pins {
    /// ~Receive enable (active low)
    pub const RE: u8 = 1 << 4;
    /// Driver enable (active high)
    pub const DE: u8 = 1 << 5;
    pub const RX: u8 = 1 << 6;
    pub const TX: u8 = 1 << 7;
}

/// USART operations the device layer needs
///
/// All methods take &self: the receive interrupt reads the data register
/// while foreground code owns configuration and transmit.
pub trait UsartHw: Sync {
    /// Program the baud rate registers
    fn set_baud(&self, setting: BaudSetting);

    /// Enable transmitter, receiver and the receive-complete interrupt
    fn enable(&self);

    /// Mask the receive-complete interrupt
    fn disable_rx_interrupt(&self);

    /// Transmit data register can take a byte
    fn tx_ready(&self) -> bool;

    /// Last byte has left the shift register
    fn tx_complete(&self) -> bool;

    fn clear_tx_complete(&self);

    fn write_data(&self, byte: u8);

    /// Read the received byte (clears the receive-complete flag)
    fn read_data(&self) -> u8;

    /// A received byte is waiting in the data register
    fn rx_pending(&self) -> bool;

    /// Spin until the transmitter is free, then send
    fn send(&self, byte: u8) {
        while !self.tx_ready() {
            core::hint::spin_loop();
        }
        self.write_data(byte);
    }
}

/// PORT operations the device layer needs
pub trait PortHw: Sync {
    fn dir_set(&self, mask: u8);
    fn dir_clr(&self, mask: u8);
    fn out_set(&self, mask: u8);
    fn out_clr(&self, mask: u8);

    /// Current pin levels
    fn input(&self) -> u8;
}
