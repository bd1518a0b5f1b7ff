// CLASSIFICATION: COMMUNITY
// Filename: dump.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Offset‑annotated hex + ASCII dump of a raw byte range.
//!
//! Independent of the exposure subsystem; used by the `txtdump` tool to
//! inspect the physical window directly.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Bytes per output line.
pub const CHUNK: usize = 16;

/// Printable column character for `byte`.
fn ascii(byte: u8) -> char {
    if (0x21..=0x7e).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

/// Render one line: `addr: xx xx .. ascii`.
pub fn format_line(addr: u64, bytes: &[u8]) -> String {
    let mut line = format!("{addr:04x}: ");
    for i in 0..CHUNK {
        match bytes.get(i) {
            Some(b) => line.push_str(&format!("{b:02x} ")),
            None => line.push_str("   "),
        }
    }
    line.extend(bytes.iter().copied().map(ascii));
    line
}

/// Dump up to `limit` bytes from `input`, labelling lines from `start`.
/// Stops early at end of input. Returns the number of bytes dumped.
pub fn dump<R: Read, W: Write>(
    input: &mut R,
    out: &mut W,
    start: u64,
    limit: u64,
) -> io::Result<u64> {
    let mut buf = [0u8; CHUNK];
    let mut done = 0u64;
    while done < limit {
        let want = (limit - done).min(CHUNK as u64) as usize;
        let got = read_full(input, &mut buf[..want])?;
        if got == 0 {
            break;
        }
        writeln!(out, "{}", format_line(start + done, &buf[..got]))?;
        done += got as u64;
        if got < want {
            break;
        }
    }
    Ok(done)
}

/// Dump `len` bytes at `base` of a device or file.
pub fn dump_region<W: Write>(path: &Path, base: u64, len: u64, out: &mut W) -> io::Result<u64> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(base))?;
    dump(&mut file, out, base, len)
}

/// Parse `0x`-prefixed hex or plain decimal, as taken by the CLI tools.
pub fn parse_number(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number {text:?}: {e}"))
}

fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
