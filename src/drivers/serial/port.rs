use super::PortHw;
use crate::io::{Io, Mmio, ReadOnly};

/// XMEGA PORT register block (the part the serial drivers touch).
pub struct GpioPort<T: Io> {
    dir_set: T,         // Write 1 to make pins outputs
    dir_clr: T,         // Write 1 to make pins inputs
    out_set: T,         // Write 1 to drive pins high
    out_clr: T,         // Write 1 to drive pins low
    input: ReadOnly<T>, // Pin levels
}

impl GpioPort<Mmio<u8>> {
    /// Creates a port over the register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a PORT register block that stays
    /// mapped for the life of the returned value.
    pub const unsafe fn new(base: usize) -> GpioPort<Mmio<u8>> {
        // SAFETY: forwarded from the caller
        unsafe {
            GpioPort {
                dir_set: Mmio::new(base + 1),
                dir_clr: Mmio::new(base + 2),
                out_set: Mmio::new(base + 5),
                out_clr: Mmio::new(base + 6),
                input: ReadOnly::new(Mmio::new(base + 8)),
            }
        }
    }
}

impl<T: Io<Value = u8> + Sync> PortHw for GpioPort<T> {
    fn dir_set(&self, mask: u8) {
        self.dir_set.write(mask);
    }

    fn dir_clr(&self, mask: u8) {
        self.dir_clr.write(mask);
    }

    fn out_set(&self, mask: u8) {
        self.out_set.write(mask);
    }

    fn out_clr(&self, mask: u8) {
        self.out_clr.write(mask);
    }

    fn input(&self) -> u8 {
        self.input.read()
    }
}
