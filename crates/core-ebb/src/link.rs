use core_error::{PlotError, Result};
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

/// A byte-oriented line transport to the controller. Implementors own
/// framing (CR-terminated commands, CRLF-terminated replies).
pub trait EbbLink {
    fn send_line(&mut self, line: &str) -> Result<()>;
    fn read_line(&mut self, timeout: Duration) -> Result<String>;
}

/// A live serial connection to an EBB-class controller, opened at the
/// fixed 9600 8N1 framing the protocol specifies.
pub struct SerialLink {
    reader: BufReader<Box<dyn serialport::SerialPort>>,
}

impl SerialLink {
    pub fn open(path: &str, timeout: Duration) -> Result<Self> {
        let port = serialport::new(path, 9600)
            .timeout(timeout)
            .open()
            .map_err(|e| PlotError::io(format!("opening {path}: {e}")))?;
        Ok(Self {
            reader: BufReader::new(port),
        })
    }
}

impl EbbLink for SerialLink {
    fn send_line(&mut self, line: &str) -> Result<()> {
        let port = self.reader.get_mut();
        port.write_all(line.as_bytes())
            .and_then(|_| port.write_all(b"\r"))
            .map_err(|e| PlotError::io(format!("write failed: {e}")))
    }

    fn read_line(&mut self, timeout: Duration) -> Result<String> {
        self.reader
            .get_mut()
            .set_timeout(timeout)
            .map_err(|e| PlotError::io(format!("set_timeout failed: {e}")))?;
        let mut buf = String::new();
        match self.reader.read_line(&mut buf) {
            Ok(0) => Err(PlotError::timeout("serial link closed before a reply arrived")),
            Ok(_) => Ok(buf.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut || e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(PlotError::timeout(format!("no reply within {timeout:?}")))
            }
            Err(e) => Err(PlotError::io(format!("read failed: {e}"))),
        }
    }
}

/// An in-memory link used by tests and dry-run diagnostics: commands are
/// recorded, replies come from a pre-seeded queue.
#[cfg(test)]
pub(crate) struct MockLink {
    pub sent: Vec<String>,
    pub replies: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl EbbLink for MockLink {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.sent.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<String> {
        self.replies
            .pop_front()
            .ok_or_else(|| PlotError::timeout("mock link ran out of replies"))
    }
}
