/*
 * Blocking Read Primitive
 *
 * There is exactly one runnable foreground task and no scheduler to hand
 * the CPU to, so "blocking" means parking the core in a low-power wait
 * until the next interrupt fires, then looking again.
 *
 * ## Wake condition
 *
 * Any enabled interrupt wakes the core, not just the one for the line
 * being read, so emptiness is re-checked after every wake. There is no
 * timeout: a blocking read on a line that never receives waits forever.
 * Callers that need bounded latency open the device non-blocking and poll.
 *
 * ## Usage
 *
 * ```rust,ignore
 * wait_for_data(&rx, blocking, waiter)?;
 * let c = rx.pop();
 * ```
 */

use crate::io::control::RX_BUFSIZE;
use crate::io::device::Errno;
use crate::io::ring::RxConsumer;

/// Suspension point for the foreground task
///
/// Implementations sleep until an interrupt occurs (WFI/SLEEP on the
/// target). Returning early is allowed; callers loop.
pub trait WaitForInterrupt: Sync {
    fn wait_for_interrupt(&self);
}

/// SLEEP.CTRL, the sleep controller
#[cfg(target_arch = "avr")]
const SLEEP_CTRL: usize = 0x0048;
/// Sleep enable
#[cfg(target_arch = "avr")]
const SLEEP_SEN: u8 = 1 << 0;
/// Idle mode: the CPU stops, peripherals and interrupts keep running
#[cfg(target_arch = "avr")]
const SLEEP_SMODE_IDLE: u8 = 0x00;

/// Idle sleep until the next interrupt
#[cfg(target_arch = "avr")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Sleep;

#[cfg(target_arch = "avr")]
impl WaitForInterrupt for Sleep {
    fn wait_for_interrupt(&self) {
        use crate::io::{Io, Mmio};

        // SAFETY: SLEEP.CTRL is a fixed I/O register on every XMEGA part
        let ctrl = unsafe { Mmio::<u8>::new(SLEEP_CTRL) };
        ctrl.write(SLEEP_SMODE_IDLE | SLEEP_SEN);
        // SAFETY: `sleep` only halts the core until an interrupt is taken
        unsafe {
            core::arch::asm!("sleep", options(nomem, nostack, preserves_flags));
        }
        ctrl.write(SLEEP_SMODE_IDLE);
    }
}

/// Busy-wait stand-in for targets without a sleep instruction wired up
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinWait;

impl WaitForInterrupt for SpinWait {
    #[inline]
    fn wait_for_interrupt(&self) {
        core::hint::spin_loop();
    }
}

/// Wait until `rx` has a byte to read
///
/// Returns immediately if data is present. With blocking disabled an
/// empty ring is EAGAIN; otherwise the core waits for interrupts until
/// the receive interrupt has pushed something.
pub fn wait_for_data(
    rx: &RxConsumer<'_, RX_BUFSIZE>,
    blocking: bool,
    waiter: &dyn WaitForInterrupt,
) -> Result<(), Errno> {
    while rx.is_empty() {
        if !blocking {
            return Err(Errno::EAGAIN);
        }
        waiter.wait_for_interrupt();
    }
    Ok(())
}
