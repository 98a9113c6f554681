/*
    PETdrive
    https://github.com/dbalsom/petdrive

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    devices::riot1.rs

    Implements the RIOT1 port set: the IEEE-488 data line interface of the
    drive board.

    Port A reads the DIO lines; port B drives them. The data contribution
    is re-published when the latched ATN state changes, since ATN gates how
    the addressing logic presents the data lines across the two chips (the
    RIOT2 ATN edge transition calls back into refresh_bus_data here).
*/

#![allow(dead_code)]

use crate::{
    bus::{BusDeviceId, IeeeBus},
    devices::riot::{DriveIo, RiotPorts},
    drive::DRIVE_SLOTS,
    interrupt::{InterruptId, InterruptStatus, IrqKind},
};

/// The RIOT1 callback set for one drive slot.
pub struct ParallelDataAdapter {
    unit: usize,
    bus_id: BusDeviceId,
    int_num: InterruptId,
    /// Last effective port B pin state; the latch behind the DIO drivers.
    data_out: u8,
}

impl ParallelDataAdapter {
    pub fn new(unit: usize, bus_id: BusDeviceId, interrupts: &mut InterruptStatus) -> Self {
        assert!(unit < DRIVE_SLOTS, "drive slot out of range: {}", unit);
        let int_num = interrupts.register_source(&format!("RIOT1D{}", unit));
        Self {
            unit,
            bus_id,
            int_num,
            data_out: 0xFF,
        }
    }

    /// Re-publish this slot's DIO contribution from the output latch.
    /// Invoked by the store path and again by the RIOT2 ATN edge
    /// transition, since address-bit visibility depends on the ATN state.
    pub fn refresh_bus_data(&self, bus: &mut IeeeBus) {
        // Open-collector drivers: a low output pin pulls its DIO line.
        bus.set_data(self.bus_id, !self.data_out);
    }
}

impl RiotPorts for ParallelDataAdapter {
    fn store_pra(&mut self, _io: &mut DriveIo, pa: u8) {
        // Port A is the DIO input side; stores have no bus effect.
        log::trace!("RIOT1D{}: ORA <- {:02X}", self.unit, pa);
    }

    fn store_prb(&mut self, io: &mut DriveIo, pb: u8) {
        self.data_out = pb;
        self.refresh_bus_data(io.bus);
    }

    fn undump_pra(&mut self, io: &mut DriveIo, pa: u8) {
        self.store_pra(io, pa);
    }

    fn undump_prb(&mut self, io: &mut DriveIo, pb: u8) {
        self.data_out = pb;
        self.refresh_bus_data(io.bus);
    }

    fn read_pra(&self, io: &DriveIo, latch: u8, ddr: u8) -> u8 {
        // Asserted DIO lines read low.
        let byte = !io.bus.data();
        (byte & !ddr) | (latch & ddr)
    }

    fn read_prb(&self, _io: &DriveIo, latch: u8, ddr: u8) -> u8 {
        (0xFF & !ddr) | (latch & ddr)
    }

    fn reset(&mut self, io: &mut DriveIo, _pa: u8) {
        self.data_out = 0xFF;
        self.refresh_bus_data(io.bus);
    }

    fn set_irq(&mut self, io: &mut DriveIo, asserted: bool, clk: u64) {
        let kind = if asserted { IrqKind::Irq } else { IrqKind::None };
        io.interrupts.set_irq(self.int_num, kind, clk);
    }

    fn restore_irq(&mut self, io: &mut DriveIo, asserted: bool) {
        let kind = if asserted { IrqKind::Irq } else { IrqKind::None };
        io.interrupts.restore_irq(self.int_num, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::DriveUnit;

    #[test]
    fn port_b_drives_data_lines_inverted() {
        let mut bus = IeeeBus::new();
        let mut ints = InterruptStatus::new();
        let id = bus.attach_device("drive");
        let mut adapter = ParallelDataAdapter::new(0, id, &mut ints);
        let mut drives = [DriveUnit::new(), DriveUnit::new()];
        let mut io = DriveIo {
            bus: &mut bus,
            drives: &mut drives,
            interrupts: &mut ints,
        };

        adapter.store_prb(&mut io, 0xF0);
        assert_eq!(io.bus.data(), 0x0F);

        // Released latch drops the contribution.
        adapter.store_prb(&mut io, 0xFF);
        assert_eq!(io.bus.data(), 0x00);
    }

    #[test]
    fn port_a_reads_data_lines_inverted() {
        let mut bus = IeeeBus::new();
        let mut ints = InterruptStatus::new();
        let drive_id = bus.attach_device("drive");
        let controller = bus.attach_device("controller");
        let adapter = ParallelDataAdapter::new(0, drive_id, &mut ints);
        let mut drives = [DriveUnit::new(), DriveUnit::new()];

        bus.set_data(controller, 0x81);
        let io = DriveIo {
            bus: &mut bus,
            drives: &mut drives,
            interrupts: &mut ints,
        };
        assert_eq!(adapter.read_pra(&io, 0x00, 0x00), 0x7E);
    }
}
