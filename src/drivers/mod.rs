/*
 * Hardware Drivers
 *
 * This module contains the hardware-specific drivers for the I/O layer.
 * Only serial peripherals are driven here; the device layer in io/ is
 * written against the traits they implement so it can run over mock
 * hardware in tests.
 */

pub mod serial;
