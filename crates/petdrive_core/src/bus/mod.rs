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

    bus::mod.rs

    Implements the shared IEEE-488 bus line state.

    The five handshake lines (ATN, DAV, EOI, NRFD, NDAC) and the eight data
    lines are open-collector: the wire reads asserted if ANY attached device
    asserts it. We keep one contribution mask per line so a device releasing
    its contribution does not stomp another device still holding the line.
*/

#![allow(dead_code)]

/// Maximum number of devices that can register a bus contribution.
/// One controller plus up to two drive slots per cabinet is all we ever
/// wire up, but the mask has room for more.
pub const MAX_BUS_DEVICES: usize = 8;

/// Handle identifying one device's contribution slot on the bus.
/// Obtained once from [`IeeeBus::attach_device`] and held for the lifetime
/// of the adapter that owns it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BusDeviceId(u8);

impl BusDeviceId {
    fn mask(&self) -> u8 {
        1 << self.0
    }
}

/// The shared IEEE-488 bus line set.
///
/// Lines are stored in logical sense: `true`/nonzero means asserted on the
/// wire. The active-low electrical polarity of the physical bus is applied
/// here, at the aggregation point, not by the contributing adapters.
pub struct IeeeBus {
    atn: u8,
    dav: u8,
    eoi: u8,
    nrfd: u8,
    ndac: u8,
    data: [u8; MAX_BUS_DEVICES],
    device_ct: u8,
    device_names: Vec<String>,
}

impl IeeeBus {
    pub fn new() -> Self {
        Self {
            atn: 0,
            dav: 0,
            eoi: 0,
            nrfd: 0,
            ndac: 0,
            data: [0; MAX_BUS_DEVICES],
            device_ct: 0,
            device_names: Vec::new(),
        }
    }

    /// Register a device on the bus, returning its contribution handle.
    pub fn attach_device(&mut self, name: &str) -> BusDeviceId {
        assert!(
            (self.device_ct as usize) < MAX_BUS_DEVICES,
            "too many devices attached to IEEE bus"
        );
        let id = BusDeviceId(self.device_ct);
        self.device_ct += 1;
        self.device_names.push(name.to_string());
        log::debug!("attached bus device {}: {}", id.0, name);
        id
    }

    fn set_line(line: &mut u8, dev: BusDeviceId, asserted: bool) {
        if asserted {
            *line |= dev.mask();
        }
        else {
            *line &= !dev.mask();
        }
    }

    pub fn set_atn(&mut self, dev: BusDeviceId, asserted: bool) {
        Self::set_line(&mut self.atn, dev, asserted);
    }

    pub fn set_dav(&mut self, dev: BusDeviceId, asserted: bool) {
        Self::set_line(&mut self.dav, dev, asserted);
    }

    pub fn set_eoi(&mut self, dev: BusDeviceId, asserted: bool) {
        Self::set_line(&mut self.eoi, dev, asserted);
    }

    pub fn set_nrfd(&mut self, dev: BusDeviceId, asserted: bool) {
        Self::set_line(&mut self.nrfd, dev, asserted);
    }

    pub fn set_ndac(&mut self, dev: BusDeviceId, asserted: bool) {
        Self::set_line(&mut self.ndac, dev, asserted);
    }

    /// Publish a device's data-line contribution. Bits are logical: a set
    /// bit pulls the corresponding DIO line low on the wire.
    pub fn set_data(&mut self, dev: BusDeviceId, byte: u8) {
        self.data[dev.0 as usize] = byte;
    }

    pub fn atn(&self) -> bool {
        self.atn != 0
    }

    pub fn dav(&self) -> bool {
        self.dav != 0
    }

    pub fn eoi(&self) -> bool {
        self.eoi != 0
    }

    pub fn nrfd(&self) -> bool {
        self.nrfd != 0
    }

    pub fn ndac(&self) -> bool {
        self.ndac != 0
    }

    /// Aggregate data-line state: the OR of every device's contribution.
    pub fn data(&self) -> u8 {
        self.data.iter().fold(0, |acc, d| acc | d)
    }
}
