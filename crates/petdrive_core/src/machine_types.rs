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

    machine_types.rs

    This module manages drive-related type definitions.

*/

use core::fmt;
use serde_derive::Deserialize;
use std::{fmt::Display, str::FromStr};

/// The CBM IEEE-488 drive models we emulate.
///
/// The 2040/3040/4040 family runs the original DOS1/DOS2 board; the
/// 8050/8250/SFD-1001 family runs the later DOS2.5/DOS2.7 board with a
/// different interrupt wiring (see [`DriveType::is_legacy_generation`]).
#[derive(Copy, Clone, Debug, Default, Deserialize, Hash, Eq, PartialEq)]
pub enum DriveType {
    Cbm2040,
    Cbm3040,
    #[default]
    Cbm4040,
    Cbm8050,
    Cbm8250,
    Sfd1001,
}

impl FromStr for DriveType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "2040" | "cbm2040" => Ok(DriveType::Cbm2040),
            "3040" | "cbm3040" => Ok(DriveType::Cbm3040),
            "4040" | "cbm4040" => Ok(DriveType::Cbm4040),
            "8050" | "cbm8050" => Ok(DriveType::Cbm8050),
            "8250" | "cbm8250" => Ok(DriveType::Cbm8250),
            "1001" | "sfd1001" => Ok(DriveType::Sfd1001),
            _ => Err("Bad value for drive type".to_string()),
        }
    }
}

impl Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveType::Cbm2040 => write!(f, "CBM 2040"),
            DriveType::Cbm3040 => write!(f, "CBM 3040"),
            DriveType::Cbm4040 => write!(f, "CBM 4040"),
            DriveType::Cbm8050 => write!(f, "CBM 8050"),
            DriveType::Cbm8250 => write!(f, "CBM 8250"),
            DriveType::Sfd1001 => write!(f, "SFD-1001"),
        }
    }
}

impl DriveType {
    /// Old-generation (DOS1/DOS2) boards wire the IEEE ATN line to the
    /// RIOT2 PA7 edge detector so that ATN transitions interrupt the drive
    /// CPU. The later boards poll ATN instead.
    pub fn is_legacy_generation(&self) -> bool {
        matches!(self, DriveType::Cbm2040 | DriveType::Cbm3040 | DriveType::Cbm4040)
    }

    /// True for cabinets with two drive mechanisms behind one DOS board.
    /// Only the SFD-1001 is a single-mechanism unit.
    pub fn is_dual_mechanism(&self) -> bool {
        !matches!(self, DriveType::Sfd1001)
    }

    pub fn num_mechanisms(&self) -> usize {
        if self.is_dual_mechanism() {
            2
        }
        else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_type_classification() {
        assert!(DriveType::Cbm2040.is_legacy_generation());
        assert!(DriveType::Cbm3040.is_legacy_generation());
        assert!(DriveType::Cbm4040.is_legacy_generation());
        assert!(!DriveType::Cbm8050.is_legacy_generation());
        assert!(!DriveType::Sfd1001.is_legacy_generation());

        assert!(DriveType::Cbm8250.is_dual_mechanism());
        assert!(!DriveType::Sfd1001.is_dual_mechanism());
        assert_eq!(DriveType::Sfd1001.num_mechanisms(), 1);
        assert_eq!(DriveType::Cbm4040.num_mechanisms(), 2);
    }

    #[test]
    fn drive_type_from_str() {
        assert_eq!(DriveType::from_str("8050").unwrap(), DriveType::Cbm8050);
        assert_eq!(DriveType::from_str("CBM4040").unwrap(), DriveType::Cbm4040);
        assert_eq!(DriveType::from_str("sfd1001").unwrap(), DriveType::Sfd1001);
        assert!(DriveType::from_str("1541").is_err());
    }
}
