/*
 * Receive Interrupt Entry Point
 *
 * ISR top half for one USART: take the byte out of the data register and
 * push it into the ring bound to that line. Nothing else happens here:
 * no locks, no logging, no allocation, bounded time.
 *
 * A full ring drops the byte. The data register is read either way so
 * the receive-complete flag clears and the interrupt does not refire.
 * Flow control (RTS at a high-water mark) would hook in at that point;
 * it is not implemented.
 */

use super::UsartHw;
use crate::io::control::RX_BUFSIZE;
use crate::io::ring::RxProducer;

/// Receive interrupt for one serial line
pub struct RxInterrupt<'a> {
    hw: &'a dyn UsartHw,
    rx: RxProducer<'a, RX_BUFSIZE>,
}

impl<'a> RxInterrupt<'a> {
    pub fn new(hw: &'a dyn UsartHw, rx: RxProducer<'a, RX_BUFSIZE>) -> Self {
        Self { hw, rx }
    }

    /// Handle one receive-complete interrupt
    ///
    /// Returns false if the byte was dropped because the ring was full.
    #[inline]
    pub fn on_receive(&self) -> bool {
        let byte = self.hw.read_data();
        self.rx.push(byte)
    }
}
