//! Writes the response body to stdout, optionally wrapped in color escapes.
//!
//! Coloring is cosmetic: the bytes between the escapes are always the body
//! exactly as received.

use std::io::{self, IsTerminal, Write};

use clap::builder::styling::{AnsiColor, Style};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// color only when stdout is a terminal and NO_COLOR is unset
    Auto,
    Always,
    Never,
}

pub trait BodyWriter {
    fn write_body(&self, out: &mut dyn Write, body: &[u8]) -> io::Result<()>;
}

/// The body, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl BodyWriter for Plain {
    fn write_body(&self, out: &mut dyn Write, body: &[u8]) -> io::Result<()> {
        out.write_all(body)
    }
}

/// The body between a style's opening and reset escapes.
#[derive(Debug, Clone, Copy)]
pub struct Styled(pub Style);

impl BodyWriter for Styled {
    fn write_body(&self, out: &mut dyn Write, body: &[u8]) -> io::Result<()> {
        write!(out, "{}", self.0.render())?;
        out.write_all(body)?;
        write!(out, "{}", self.0.render_reset())
    }
}

pub fn body_style() -> Style {
    AnsiColor::Green.on_default()
}

pub fn select(choice: ColorChoice) -> Box<dyn BodyWriter> {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    if should_color(choice, io::stdout().is_terminal(), no_color) {
        Box::new(Styled(body_style()))
    } else {
        Box::new(Plain)
    }
}

fn should_color(choice: ColorChoice, is_terminal: bool, no_color: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => is_terminal && !no_color,
    }
}
