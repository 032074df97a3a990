/*
 * Test Suite for the XIO Layer
 *
 * Scenario tests that drive the descriptor table end to end over mock
 * hardware.
 *
 * ## Fixtures
 * - `MockUsart` - records transmitted bytes (with the port output level
 *   at the moment each byte went out) and queues bytes "on the wire"
 *   for the receive interrupt to pick up
 * - `MockPort` - PORT register block with readable DIR/OUT/IN
 * - `Wire` - the wait primitive: each wait delivers one queued byte
 *   through the receive interrupt, as if the ISR had fired. A wait with
 *   nothing queued would sleep forever, so it panics instead.
 * - `Rig` - a descriptor table built over all of the above
 *
 * ## Modules
 * - `scenarios` - line/string round trips, limits and non-blocking reads
 * - `devices` - open/control/close rules, pins, echo, CR/LF, overflow
 */


use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::collections::VecDeque;

use spin::Mutex;

use crate::drivers::serial::{PortHw, RxInterrupt, UsartHw};
use crate::io::control::{BaudSetting, RX_BUFSIZE};
use crate::io::{Board, DescriptorTable, RxRing, SerialBinding};
use crate::scheduler::WaitForInterrupt;

/// PORT block stand-in
#[derive(Default)]
pub struct MockPort {
    pub dir: AtomicU8,
    pub out: AtomicU8,
    pub input: AtomicU8,
}

impl MockPort {
    pub fn dir(&self) -> u8 {
        self.dir.load(Ordering::SeqCst)
    }

    pub fn out(&self) -> u8 {
        self.out.load(Ordering::SeqCst)
    }
}

impl PortHw for MockPort {
    fn dir_set(&self, mask: u8) {
        self.dir.fetch_or(mask, Ordering::SeqCst);
    }

    fn dir_clr(&self, mask: u8) {
        self.dir.fetch_and(!mask, Ordering::SeqCst);
    }

    fn out_set(&self, mask: u8) {
        self.out.fetch_or(mask, Ordering::SeqCst);
    }

    fn out_clr(&self, mask: u8) {
        self.out.fetch_and(!mask, Ordering::SeqCst);
    }

    fn input(&self) -> u8 {
        self.input.load(Ordering::SeqCst)
    }
}

/// USART block stand-in
pub struct MockUsart {
    port: &'static MockPort,
    /// Transmitted bytes with the port output level at send time
    sent: Mutex<Vec<(u8, u8)>>,
    /// Bytes on the wire, not yet read out of the data register
    incoming: Mutex<VecDeque<u8>>,
    baud: Mutex<Option<BaudSetting>>,
    enabled: AtomicBool,
    rx_masked: AtomicUsize,
    busy: AtomicBool,
    tx_complete: AtomicBool,
}

impl MockUsart {
    pub fn new(port: &'static MockPort) -> Self {
        Self {
            port,
            sent: Mutex::new(Vec::new()),
            incoming: Mutex::new(VecDeque::new()),
            baud: Mutex::new(None),
            enabled: AtomicBool::new(false),
            rx_masked: AtomicUsize::new(0),
            busy: AtomicBool::new(false),
            tx_complete: AtomicBool::new(false),
        }
    }

    /// A USART on its own port that lives for the rest of the test run
    pub fn leaked() -> &'static MockUsart {
        let port: &'static MockPort = Box::leak(Box::default());
        Box::leak(Box::new(MockUsart::new(port)))
    }

    /// Queue bytes arriving from the far end
    pub fn feed(&self, bytes: &[u8]) {
        self.incoming.lock().extend(bytes.iter().copied());
    }

    /// Bytes still on the wire
    pub fn on_wire(&self) -> usize {
        self.incoming.lock().len()
    }

    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().iter().map(|&(byte, _)| byte).collect()
    }

    /// Port output level when each byte was sent
    pub fn sent_levels(&self) -> Vec<u8> {
        self.sent.lock().iter().map(|&(_, level)| level).collect()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().clear();
    }

    pub fn baud(&self) -> Option<BaudSetting> {
        *self.baud.lock()
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn rx_masked(&self) -> usize {
        self.rx_masked.load(Ordering::SeqCst)
    }

    /// Hold the transmit data register full
    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }
}

impl UsartHw for MockUsart {
    fn set_baud(&self, setting: BaudSetting) {
        *self.baud.lock() = Some(setting);
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn disable_rx_interrupt(&self) {
        self.rx_masked.fetch_add(1, Ordering::SeqCst);
    }

    fn tx_ready(&self) -> bool {
        !self.busy.load(Ordering::SeqCst)
    }

    fn tx_complete(&self) -> bool {
        self.tx_complete.load(Ordering::SeqCst)
    }

    fn clear_tx_complete(&self) {
        self.tx_complete.store(false, Ordering::SeqCst);
    }

    fn write_data(&self, byte: u8) {
        assert!(self.tx_ready(), "write to a full data register");
        self.sent.lock().push((byte, self.port.out()));
        self.tx_complete.store(true, Ordering::SeqCst);
    }

    fn read_data(&self) -> u8 {
        self.incoming.lock().pop_front().unwrap_or(0)
    }

    fn rx_pending(&self) -> bool {
        !self.incoming.lock().is_empty()
    }
}

/// One serial line's hardware and its receive interrupt
pub struct Line {
    pub usart: &'static MockUsart,
    isr: RxInterrupt<'static>,
}

impl Line {
    /// Run the receive interrupt once; false if the byte was dropped
    pub fn interrupt(&self) -> bool {
        self.isr.on_receive()
    }

    /// Run the receive interrupt for everything on the wire
    ///
    /// Returns how many bytes were dropped.
    pub fn deliver_all(&self) -> usize {
        let mut dropped = 0;
        while self.usart.rx_pending() {
            if !self.interrupt() {
                dropped += 1;
            }
        }
        dropped
    }
}

/// Wait primitive that fires one pending receive interrupt per wait
pub struct Wire {
    pub usb: Line,
    pub rs485: Line,
    waits: AtomicUsize,
}

impl Wire {
    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

impl WaitForInterrupt for Wire {
    fn wait_for_interrupt(&self) {
        self.waits.fetch_add(1, Ordering::SeqCst);
        for line in [&self.usb, &self.rs485] {
            if line.usart.rx_pending() {
                line.interrupt();
                return;
            }
        }
        panic!("blocking read with nothing on the wire would sleep forever");
    }
}

/// Descriptor table over mock hardware
pub struct Rig {
    pub table: DescriptorTable<'static>,
    pub port: &'static MockPort,
    pub wire: &'static Wire,
}

impl Rig {
    pub fn new() -> Self {
        let port: &'static MockPort = Box::leak(Box::default());
        let usb_hw: &'static MockUsart = Box::leak(Box::new(MockUsart::new(port)));
        let rs485_hw: &'static MockUsart = Box::leak(Box::new(MockUsart::new(port)));

        let usb_ring: &'static RxRing<RX_BUFSIZE> = Box::leak(Box::new(RxRing::new()));
        let rs485_ring: &'static RxRing<RX_BUFSIZE> = Box::leak(Box::new(RxRing::new()));
        let (usb_tx, usb_rx) = usb_ring.split().unwrap();
        let (rs485_tx, rs485_rx) = rs485_ring.split().unwrap();

        let wire: &'static Wire = Box::leak(Box::new(Wire {
            usb: Line { usart: usb_hw, isr: RxInterrupt::new(usb_hw, usb_tx) },
            rs485: Line { usart: rs485_hw, isr: RxInterrupt::new(rs485_hw, rs485_tx) },
            waits: AtomicUsize::new(0),
        }));

        let table = DescriptorTable::new(Board {
            usb: SerialBinding { hw: usb_hw, port, rx: usb_rx },
            rs485: SerialBinding { hw: rs485_hw, port, rx: rs485_rx },
            waiter: wire,
        });

        Self { table, port, wire }
    }

    pub fn usb(&self) -> &'static MockUsart {
        self.wire.usb.usart
    }

    pub fn rs485(&self) -> &'static MockUsart {
        self.wire.rs485.usart
    }
}
