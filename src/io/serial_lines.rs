/*
 * Serial Line Drivers
 *
 * The two USART-backed devices differ only in their pins:
 *
 *  USB     USARTC0 behind an FTDI bridge. RX/TX plus CTS (input) and RTS
 *          (output, held asserted). No dynamic flow control.
 *  RS-485  USARTC1 behind a half-duplex transceiver. DE (driver enable,
 *          active high) and ~RE (receiver enable, active low) are tied
 *          together in software: the receiver is on and the driver off
 *          except while a byte is on the wire.
 */

use super::control::DeviceFlags;
use super::device::Errno;
use super::usart_device::{LineDriver, UsartDevice};
use crate::drivers::serial::{PortHw, rs485_pins, usb_pins};

/// USB serial device
pub type UsbDevice<'a> = UsartDevice<'a, UsbLine>;

/// RS-485 serial device
pub type Rs485Device<'a> = UsartDevice<'a, Rs485Line>;

#[derive(Debug, Default, Clone, Copy)]
pub struct UsbLine;

impl LineDriver for UsbLine {
    const NAME: &'static str = "usb";

    fn open_pins(&self, port: &dyn PortHw) {
        port.dir_clr(usb_pins::RX);
        port.dir_set(usb_pins::TX);
        port.out_set(usb_pins::TX); // idle high
        port.dir_clr(usb_pins::CTS);
        port.dir_set(usb_pins::RTS);
        port.out_set(usb_pins::RTS);
    }
}

impl UsbDevice<'_> {
    /// The bridge is ready to accept data (CTS is active low)
    pub fn clear_to_send(&self) -> bool {
        self.port().input() & usb_pins::CTS == 0
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Rs485Line;

impl Rs485Line {
    const DRIVER: u8 = rs485_pins::DE | rs485_pins::RE;
}

impl LineDriver for Rs485Line {
    const NAME: &'static str = "rs485";

    fn open_pins(&self, port: &dyn PortHw) {
        port.dir_clr(rs485_pins::RX);
        port.dir_set(rs485_pins::TX);
        port.out_set(rs485_pins::TX);
        port.dir_set(Self::DRIVER);
        port.out_clr(Self::DRIVER); // driver off, receiver on
    }

    fn transmit(
        &self,
        usart: &UsartDevice<'_, Self>,
        flags: DeviceFlags,
        c: u8,
    ) -> Result<u8, Errno> {
        let hw = usart.hw();
        let port = usart.port();

        // don't grab the bus for a byte that can't go out
        if !flags.contains(DeviceFlags::WR_BLOCK) && !hw.tx_ready() {
            return Err(Errno::EAGAIN);
        }

        port.out_set(Self::DRIVER);
        hw.clear_tx_complete();
        let sent = usart.transmit(flags, c);
        if sent.is_ok() {
            while !hw.tx_complete() {
                core::hint::spin_loop();
            }
            hw.clear_tx_complete();
        }
        port.out_clr(Self::DRIVER);
        sent
    }
}
