//! i3bar protocol output: header, opening bracket, then one
//! comma-terminated JSON array per frame. The outer array is never closed.

use std::io::{self, Write};

use crate::types::Frame;

pub const HEADER: &str = r#"{"version":1}"#;

pub struct StreamWriter<W: Write> {
    out: W,
    frames: u64,
}

impl<W: Write> StreamWriter<W> {
    /// Write the preamble and return a writer ready for frames.
    pub fn begin(mut out: W) -> io::Result<Self> {
        out.write_all(format!("{HEADER}\n[\n").as_bytes())?;
        out.flush()?;
        Ok(Self { out, frames: 0 })
    }

    /// Append one frame as a single write, then flush.
    pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        let mut line = serde_json::to_vec(frame)?;
        line.extend_from_slice(b",\n");
        self.out.write_all(&line)?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
