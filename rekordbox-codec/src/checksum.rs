//! CRC16/XMODEM checksum used by the device settings files
//!
//! Polynomial 0x1021, initial value 0, no reflection, no final XOR.
//! Reference: https://reveng.sourceforge.io/crc-catalogue/all.htm#crc.cat.crc-16-xmodem

use std::ops::Range;

use crate::error::{Error, Result};

const POLY: u16 = 0x1021;

const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// CRC16/XMODEM over the whole slice
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        (crc << 8) ^ TABLE[(((crc >> 8) as u8) ^ byte) as usize]
    })
}

/// CRC16/XMODEM over `range` of `data`
pub fn crc16_xmodem_range(data: &[u8], range: Range<usize>) -> Result<u16> {
    let bytes = data.get(range.clone()).ok_or(Error::TruncatedInput {
        offset: range.start,
        needed: range.end.saturating_sub(range.start),
        available: data.len().saturating_sub(range.start),
    })?;
    Ok(crc16_xmodem(bytes))
}
