// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded previews of a job payload for the diagnostic console.
//
// Previews are copies. The bytes handed to the print backend are never
// touched by anything in this module.

use std::fmt::Write;

/// Bytes of payload shown as text.
pub const TEXT_PREVIEW_BYTES: usize = 4096;

/// Bytes of payload shown in the hex dump.
pub const HEX_PREVIEW_BYTES: usize = 256;

const ROW: usize = 16;

/// The first `TEXT_PREVIEW_BYTES` of the payload as text.
///
/// BRF is plain ASCII so this is normally exact; anything else is decoded
/// lossily.
pub fn text_preview(data: &[u8]) -> String {
    let end = data.len().min(TEXT_PREVIEW_BYTES);
    String::from_utf8_lossy(&data[..end]).into_owned()
}

/// Canonical hex dump of the first `HEX_PREVIEW_BYTES` of the payload.
///
/// ```text
/// 0000  2c 47 52 41 48 41 4d 20  42 52 49 44 47 45 20 54  |,GRAHAM BRIDGE T|
/// ```
pub fn hex_dump(data: &[u8]) -> String {
    let data = &data[..data.len().min(HEX_PREVIEW_BYTES)];
    let mut out = String::with_capacity(data.len().div_ceil(ROW) * 80);

    for (row_index, row) in data.chunks(ROW).enumerate() {
        let _ = write!(out, "{:04x}  ", row_index * ROW);
        for (j, byte) in row.iter().enumerate() {
            let _ = write!(out, "{byte:02x} ");
            if j == 7 {
                out.push(' ');
            }
        }
        if row.len() < ROW {
            let mut pad = (ROW - row.len()) * 3;
            if row.len() < 8 {
                pad += 1;
            }
            out.extend(std::iter::repeat_n(' ', pad));
        }
        out.push_str(" |");
        out.extend(row.iter().map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}
