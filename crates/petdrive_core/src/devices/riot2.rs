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

    devices::riot2.rs

    Implements the RIOT2 port set: the IEEE-488 handshake interface of the
    drive board.

    Port A drives the bus handshake through the MC3446 transceivers and
    reads ATN/DAV/EOI back; port B drives the activity/error LEDs and reads
    NRFD/NDAC plus the hardwired device address bits. On the DOS1/DOS2
    boards (2040/3040/4040) the ATN line is additionally wired to the PA7
    edge detector so ATN transitions interrupt the drive CPU.
*/

#![allow(dead_code)]

use modular_bitfield::{bitfield, prelude::*};

use crate::{
    bus::{BusDeviceId, IeeeBus},
    devices::riot::{DriveIo, RiotPorts},
    drive::{DriveUnit, DRIVE_SLOTS, LED_STATUS_ACTIVITY, LED_STATUS_ERROR},
    interrupt::{InterruptId, InterruptStatus, IrqKind},
    machine_types::DriveType,
};

/// Port A output register, named as in the schematics.
#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct IeeeControlPort {
    pub atna: bool,
    pub dac_out_n: bool,
    pub rfd_out: bool,
    pub eoi_out: bool,
    pub dav_out: bool,
    #[skip]
    unused: B3,
}

// Port A read bits (inputs from the bus).
pub const PA_ATN_IN_N: u8 = 0b1000_0000;
pub const PA_DAV_IN: u8 = 0b0100_0000;
pub const PA_EOI_IN: u8 = 0b0010_0000;

// Port B write bits.
pub const PB_ACT_LED_1: u8 = 0b0000_1000;
pub const PB_ACT_LED_0: u8 = 0b0001_0000;
pub const PB_ERROR_LED: u8 = 0b0010_0000;

// Port B read bits.
pub const PB_NRFD_IN: u8 = 0b1000_0000;
pub const PB_NDAC_IN: u8 = 0b0100_0000;
pub const PB_DEVICE_ADDR_0: u8 = 0b0000_0001;
pub const PB_DEVICE_ADDR_1: u8 = 0b0000_0010;
pub const PB_DEVICE_ADDR_2: u8 = 0b0000_0100;

/// The RIOT2 callback set for one drive slot.
pub struct HandshakeAdapter {
    /// Which mechanism of the cabinet this chip serves (0 or 1).
    unit: usize,
    /// This slot's contribution handle on the shared bus.
    bus_id: BusDeviceId,
    /// Latched ATN state as last applied through the edge transition.
    atn_active: bool,
    int_num: InterruptId,
    legacy_generation: bool,
    dual_mechanism: bool,
}

impl HandshakeAdapter {
    pub fn new(
        unit: usize,
        drive_type: DriveType,
        bus_id: BusDeviceId,
        interrupts: &mut InterruptStatus,
    ) -> Self {
        assert!(unit < DRIVE_SLOTS, "drive slot out of range: {}", unit);
        let int_num = interrupts.register_source(&format!("RIOT2D{}", unit));
        Self {
            unit,
            bus_id,
            atn_active: false,
            int_num,
            legacy_generation: drive_type.is_legacy_generation(),
            dual_mechanism: drive_type.is_dual_mechanism(),
        }
    }

    pub fn unit(&self) -> usize {
        self.unit
    }

    pub fn atn_active(&self) -> bool {
        self.atn_active
    }

    pub fn set_atn_active(&mut self, state: bool) {
        self.atn_active = state;
    }

    pub fn is_legacy_generation(&self) -> bool {
        self.legacy_generation
    }

    pub fn interrupt_id(&self) -> InterruptId {
        self.int_num
    }

    /// Derive and publish NRFD and NDAC from the port A pin state and the
    /// latched ATN. Idempotent; named as in the schematics:
    ///
    ///   RFDO = (/ATN == ATNA) & RFDO   -> to IEEE via MC3446
    ///   DACO = /DACO & (ATNA | ATN)    -> to IEEE via MC3446
    pub fn set_handshake(&self, bus: &mut IeeeBus, pa: u8) {
        let pa = IeeeControlPort::from_bytes([pa]);

        let rfdo = (self.atn_active == pa.atna()) && pa.rfd_out();
        bus.set_nrfd(self.bus_id, !rfdo);

        let daco = !pa.dac_out_n() && (pa.atna() || !self.atn_active);
        bus.set_ndac(self.bus_id, !daco);
    }

    /// Shared body of the port A store and undump callbacks: handshake
    /// derivation plus the directly driven EOI and DAV lines.
    fn apply_pra(&self, bus: &mut IeeeBus, byte: u8) {
        let pa = IeeeControlPort::from_bytes([byte]);
        self.set_handshake(bus, byte);
        bus.set_eoi(self.bus_id, !pa.eoi_out());
        bus.set_dav(self.bus_id, !pa.dav_out());
    }

    /// Shared body of the port B store and undump callbacks: LED status
    /// for this mechanism, plus the second mechanism's LEDs when slot 0 of
    /// a dual cabinet writes them through the same register.
    fn apply_prb(&self, drives: &mut [DriveUnit; DRIVE_SLOTS], byte: u8) {
        // bit 3 Act LED 1
        // bit 4 Act LED 0
        // bit 5 Error LED
        drives[self.unit].led_status = (byte >> 4) & 0x03;

        if (self.unit == 0) && self.dual_mechanism {
            let mut status = 0;
            if byte & PB_ACT_LED_1 != 0 {
                status |= LED_STATUS_ACTIVITY;
            }
            if byte & PB_ERROR_LED != 0 {
                status |= LED_STATUS_ERROR;
            }
            drives[1].led_status = status;
        }
    }
}

impl RiotPorts for HandshakeAdapter {
    fn store_pra(&mut self, io: &mut DriveIo, pa: u8) {
        self.apply_pra(io.bus, pa);
    }

    fn store_prb(&mut self, io: &mut DriveIo, pb: u8) {
        self.apply_prb(io.drives, pb);
    }

    // State loading bypasses CPU timing but must produce bit-identical bus
    // effects, so the undump callbacks share the store bodies.
    fn undump_pra(&mut self, io: &mut DriveIo, pa: u8) {
        self.apply_pra(io.bus, pa);
    }

    fn undump_prb(&mut self, io: &mut DriveIo, pb: u8) {
        self.apply_prb(io.drives, pb);
    }

    fn read_pra(&self, io: &DriveIo, latch: u8, ddr: u8) -> u8 {
        let mut byte = 0xFF;
        if !io.bus.atn() {
            byte -= PA_ATN_IN_N;
        }
        if io.bus.dav() {
            byte -= PA_DAV_IN;
        }
        if io.bus.eoi() {
            byte -= PA_EOI_IN;
        }
        (byte & !ddr) | (latch & ddr)
    }

    fn read_prb(&self, io: &DriveIo, latch: u8, ddr: u8) -> u8 {
        let mut byte = 0xFF;
        if io.bus.nrfd() {
            byte -= PB_NRFD_IN;
        }
        if io.bus.ndac() {
            byte -= PB_NDAC_IN;
        }

        if self.unit == 0 {
            byte -= PB_DEVICE_ADDR_0;
        }
        // Address bits 1 and 2 are strapped low on both slots; the fixed
        // contribution is identical for either mechanism.
        byte -= PB_DEVICE_ADDR_1;
        byte -= PB_DEVICE_ADDR_2;

        (byte & !ddr) | (latch & ddr)
    }

    fn reset(&mut self, io: &mut DriveIo, pa: u8) {
        self.atn_active = false;

        io.bus.set_dav(self.bus_id, false);
        io.bus.set_eoi(self.bus_id, false);

        self.set_handshake(io.bus, pa);

        // Power-on state: activity and error indicators both lit.
        io.drives[self.unit].led_status = LED_STATUS_ACTIVITY | LED_STATUS_ERROR;
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
