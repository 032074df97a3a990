/*
 * Memory-Mapped I/O Registers
 *
 * Type-safe access to peripheral registers that live in the data address
 * space. Every access is volatile so the compiler can neither elide nor
 * reorder it.
 *
 * Writes take &self: a register block is shared between the receive
 * interrupt and foreground code, and hardware registers have no Rust
 * ownership to protect.
 */

use core::marker::PhantomData;
use core::ops::{BitAnd, BitOr, Not};
use core::ptr::NonNull;

use volatile::VolatilePtr;

/// Register interface trait
pub trait Io {
    /// The value type used for register operations.
    type Value: Copy
        + PartialEq
        + BitAnd<Output = Self::Value>
        + BitOr<Output = Self::Value>
        + Not<Output = Self::Value>;

    /// Reads the register.
    fn read(&self) -> Self::Value;

    /// Writes the register.
    fn write(&self, value: Self::Value);

    /// Reads the register and checks if all of the specified flags are set.
    #[inline(always)]
    fn readf(&self, flags: Self::Value) -> bool {
        (self.read() & flags) == flags
    }

    /// Sets (`true`) or clears (`false`) the specified flags, keeping the rest.
    #[inline(always)]
    fn writef(&self, flags: Self::Value, value: bool) {
        let tmp: Self::Value = match value {
            true => self.read() | flags,
            false => self.read() & !flags,
        };
        self.write(tmp);
    }
}

/// Wrapper for a register providing read-only access.
pub struct ReadOnly<I> {
    inner: I,
}

impl<I> ReadOnly<I> {
    /// Creates a new `ReadOnly` wrapper instance.
    pub const fn new(inner: I) -> ReadOnly<I> {
        ReadOnly { inner }
    }
}

impl<I: Io> ReadOnly<I> {
    /// Reads the register.
    #[inline(always)]
    pub fn read(&self) -> I::Value {
        self.inner.read()
    }

    /// Reads the register and checks if the specified flags are set.
    #[inline(always)]
    pub fn readf(&self, flags: I::Value) -> bool {
        self.inner.readf(flags)
    }
}

/// Generic memory-mapped register
#[derive(Copy, Clone)]
pub struct Mmio<T> {
    address: usize,
    value: PhantomData<T>,
}

impl<T> Mmio<T> {
    /// Create a register handle at the specified address.
    ///
    /// # Safety
    ///
    /// `address` must be non-null, aligned for `T`, and valid for volatile
    /// reads and writes for as long as the handle is used.
    pub const unsafe fn new(address: usize) -> Self {
        Mmio::<T> {
            address,
            value: PhantomData,
        }
    }

    #[inline(always)]
    fn ptr(&self) -> VolatilePtr<'_, T> {
        // SAFETY: the constructor's contract guarantees a valid, non-null address
        unsafe { VolatilePtr::new(NonNull::new_unchecked(self.address as *mut T)) }
    }
}

impl<T> Io for Mmio<T>
where
    T: Copy + PartialEq + BitAnd<Output = T> + BitOr<Output = T> + Not<Output = T>,
{
    type Value = T;

    #[inline(always)]
    fn read(&self) -> T {
        self.ptr().read()
    }

    #[inline(always)]
    fn write(&self, value: T) {
        self.ptr().write(value)
    }
}
