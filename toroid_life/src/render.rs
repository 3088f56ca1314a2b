// render.rs - Observational per-generation display

use std::io::Write;

use crate::error::Result;
use crate::grid::{ALIVE, Cell, Dimensions};

const LIVE  : &str = "\x1b[32mX\x1b[0m";
const DEAD  : &str = "\x1b[90mO\x1b[0m";
const CLEAN : &str = "\x1b[2J\x1b[H";

/// Read-only view handed to a renderer once per generation.
pub struct Frame<'a> {
    pub generation: usize,
    pub dims: Dimensions,
    pub present: &'a [Cell],
    /// Neighbour counts, only provided in debug mode.
    pub neighbors: Option<&'a [u8]>,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// ANSI console output. In debug mode prints raw values and the neighbour map
/// instead of clearing the screen.
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rows<T: Copy>(&mut self, width: usize, values: &[T], glyph: impl Fn(T) -> String) -> Result<()> {
        for row in values.chunks(width) {
            for &v in row {
                write!(self.out, "{} ", glyph(v))?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl ConsoleRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        let width = frame.dims.width;
        match frame.neighbors {
            None => {
                write!(self.out, "{CLEAN}")?;
                self.rows(width, frame.present, |c| (if c == ALIVE { LIVE } else { DEAD }).to_string())?;
            }
            Some(neighbors) => {
                writeln!(self.out, "Generation {} present map", frame.generation)?;
                self.rows(width, frame.present, |c| c.to_string())?;
                writeln!(self.out)?;
                writeln!(self.out, "Generation {} neighbour map", frame.generation)?;
                self.rows(width, neighbors, |n| n.to_string())?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_frame_uses_glyphs() {
        let dims = Dimensions::new(2, 2).unwrap();
        let mut r = ConsoleRenderer::new(Vec::new());
        r.render(&Frame { generation: 0, dims, present: &[1, 0, 0, 1], neighbors: None }).unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.starts_with(CLEAN));
        assert_eq!(text.matches(LIVE).count(), 2);
        assert_eq!(text.matches(DEAD).count(), 2);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn debug_frame_prints_neighbour_map() {
        let dims = Dimensions::new(1, 3).unwrap();
        let mut r = ConsoleRenderer::new(Vec::new());
        r.render(&Frame { generation: 4, dims, present: &[1, 0, 1], neighbors: Some(&[2, 4, 2]) }).unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.contains("1 0 1 \n"));
        assert!(text.contains("2 4 2 \n"));
        assert!(text.contains("Generation 4 neighbour map"));
    }
}
