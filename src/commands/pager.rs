use std::io::{self, Write};

use derive_new::new;
use is_terminal::IsTerminal;
use minus::Pager;

/// Wrapper that implements `Write` for the minus pager
///
/// The minus pager doesn't implement `std::io::Write` directly, so this
/// wrapper adapts it to be compatible with Rust's standard I/O traits. This
/// allows using the pager as a drop-in replacement for stdout when a diff
/// produces long output.
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(s).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where diff output goes: straight to stdout, or buffered into the pager
/// when stdout is a terminal and neither `--no-pager` nor the `NO_PAGER`
/// environment variable disables it.
pub enum OutputTarget {
    Stdout,
    Paged(Pager),
}

impl OutputTarget {
    pub fn detect(no_pager: bool) -> Self {
        let paged = !no_pager
            && std::env::var_os("NO_PAGER").is_none()
            && io::stdout().is_terminal();

        if paged {
            OutputTarget::Paged(Pager::new())
        } else {
            OutputTarget::Stdout
        }
    }

    pub fn writer(&self) -> Box<dyn Write> {
        match self {
            OutputTarget::Stdout => Box::new(io::stdout()),
            OutputTarget::Paged(pager) => Box::new(PagerWriter::new(pager.clone())),
        }
    }

    /// Hands the buffered output over to the pager; a no-op for plain
    /// stdout.
    pub fn finish(self) -> anyhow::Result<()> {
        match self {
            OutputTarget::Stdout => Ok(()),
            OutputTarget::Paged(pager) => Ok(minus::page_all(pager)?),
        }
    }
}
