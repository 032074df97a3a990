/*
 * Foreground Scheduling
 *
 * The I/O layer runs as a single foreground task interrupted by receive
 * ISRs. The only suspension point is the blocking read primitive, which
 * parks the core until the next interrupt.
 */

pub mod io_wait;

pub use io_wait::{SpinWait, WaitForInterrupt, wait_for_data};

#[cfg(target_arch = "avr")]
pub use io_wait::Sleep;
