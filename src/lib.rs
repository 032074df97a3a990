/*
 * XIO: XMEGA Serial I/O Layer
 *
 * UNIX-flavoured device I/O for a bare-metal controller board: fixed
 * device handles, open/control/read/write/getc/putc, and interrupt-fed
 * receive rings on the USB and RS-485 serial lines.
 *
 * Execution model:
 * - one foreground thread of control, no heap, no scheduler
 * - one receive interrupt per serial line, the only producer for its ring
 * - the foreground blocks only inside wait_for_data(), sleeping until the
 *   next interrupt
 *
 * Board bring-up:
 *
 * ```rust,ignore
 * static USB_RING: RxRing<RX_BUFSIZE> = RxRing::new();
 * static RS485_RING: RxRing<RX_BUFSIZE> = RxRing::new();
 * let (usb_isr, usb_rx) = USB_RING.split().ok_or(Errno::EINTERNAL)?;
 * let (rs485_isr, rs485_rx) = RS485_RING.split().ok_or(Errno::EINTERNAL)?;
 * let table = DescriptorTable::new(Board {
 *     usb: SerialBinding { hw: &USB_USART, port: &PORTC, rx: usb_rx },
 *     rs485: SerialBinding { hw: &RS485_USART, port: &PORTC, rx: rs485_rx },
 *     waiter: &Sleep,
 * });
 * logger::init(&USB_USART, LevelFilter::Info).ok();
 * let usb = table.open(DeviceId::Usb, ControlFlags::baud(Baud::B115200))?;
 * ```
 */

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod drivers;
pub mod io;
pub mod scheduler;
pub mod utils;

#[cfg(test)]
mod tests;
