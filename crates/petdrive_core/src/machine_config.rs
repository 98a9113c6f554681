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

    machine_config.rs

    Configuration structs consumed when assembling an emulated drive.

*/

use anyhow::{anyhow, Error};
use serde_derive::Deserialize;

use crate::machine_types::DriveType;

/// One `[[drive]]` entry from the frontend's machine configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct DriveConfig {
    pub drive_type: DriveType,
    /// IEEE device number (8-15). Validated when the context is built.
    pub device_id: u8,
}

impl DriveConfig {
    pub fn from_toml(text: &str) -> Result<DriveConfig, Error> {
        toml::from_str(text).map_err(|e| anyhow!("error parsing drive config: {}", e))
    }
}
