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

    interrupt.rs

    Tracks the named interrupt sources feeding one drive CPU's IRQ line.

    The 6502's IRQ input is level-sensitive and shared: the line is active
    while ANY registered source is asserting. Sources register themselves
    once by name at adapter construction and then assert/deassert against
    the virtual clock.
*/

#![allow(dead_code)]

/// Opaque handle for a registered interrupt source.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InterruptId(usize);

/// State contributed by one source to the shared IRQ line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IrqKind {
    None,
    Irq,
}

struct IrqSource {
    name: String,
    kind: IrqKind,
    set_clk: u64,
}

/// Per-CPU interrupt status table.
pub struct InterruptStatus {
    sources: Vec<IrqSource>,
}

impl InterruptStatus {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    /// Register a new interrupt source. Called once per adapter at
    /// construction time; the returned id is used for every subsequent
    /// assert/deassert.
    pub fn register_source(&mut self, name: &str) -> InterruptId {
        let id = InterruptId(self.sources.len());
        self.sources.push(IrqSource {
            name: name.to_string(),
            kind: IrqKind::None,
            set_clk: 0,
        });
        id
    }

    /// Assert or deassert a source at the given clock tick.
    pub fn set_irq(&mut self, id: InterruptId, kind: IrqKind, clk: u64) {
        let source = &mut self.sources[id.0];
        if source.kind != kind {
            log::trace!("{}: IRQ {:?} at clk {}", source.name, kind, clk);
        }
        source.kind = kind;
        source.set_clk = clk;
    }

    /// Restore a source's state from persisted data. Unlike [`set_irq`],
    /// this does not retime the assertion against the clock.
    ///
    /// [`set_irq`]: InterruptStatus::set_irq
    pub fn restore_irq(&mut self, id: InterruptId, kind: IrqKind) {
        self.sources[id.0].kind = kind;
    }

    /// Aggregate IRQ line level: active while any source is asserting.
    pub fn irq_pending(&self) -> bool {
        self.sources.iter().any(|s| s.kind == IrqKind::Irq)
    }

    pub fn is_asserted(&self, id: InterruptId) -> bool {
        self.sources[id.0].kind == IrqKind::Irq
    }

    pub fn source_name(&self, id: InterruptId) -> &str {
        &self.sources[id.0].name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_line_is_or_of_sources() {
        let mut ints = InterruptStatus::new();
        let a = ints.register_source("RIOT2D0");
        let b = ints.register_source("RIOT2D1");

        assert!(!ints.irq_pending());

        ints.set_irq(a, IrqKind::Irq, 100);
        ints.set_irq(b, IrqKind::Irq, 101);
        assert!(ints.irq_pending());

        ints.set_irq(a, IrqKind::None, 102);
        assert!(ints.irq_pending());

        ints.set_irq(b, IrqKind::None, 103);
        assert!(!ints.irq_pending());
    }

    #[test]
    fn restore_sets_level_without_retiming() {
        let mut ints = InterruptStatus::new();
        let a = ints.register_source("RIOT2D0");

        ints.restore_irq(a, IrqKind::Irq);
        assert!(ints.is_asserted(a));
        assert!(ints.irq_pending());

        ints.restore_irq(a, IrqKind::None);
        assert!(!ints.irq_pending());
    }

    #[test]
    fn source_names_are_preserved() {
        let mut ints = InterruptStatus::new();
        let a = ints.register_source("RIOT2D0");
        assert_eq!(ints.source_name(a), "RIOT2D0");
    }
}
