use std::{
    fs::{File, OpenOptions},
    io::{LineWriter, Write},
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
    path::{Path, PathBuf},
    sync::Mutex,
};

use eyre::Context;

use crate::LogSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

enum StreamHandle {
    Stdout(std::io::Stdout),
    Stderr(std::io::Stderr),
}

pub struct ConsoleSink {
    handle: StreamHandle,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        let handle = match stream {
            ConsoleStream::Stdout => StreamHandle::Stdout(std::io::stdout()),
            ConsoleStream::Stderr => StreamHandle::Stderr(std::io::stderr()),
        };
        Self { handle }
    }
}

impl LogSink for ConsoleSink {
    fn write_log(&self, rendered: &str) -> eyre::Result<()> {
        match &self.handle {
            StreamHandle::Stdout(handle) => {
                let mut writer = handle.lock();
                writeln!(writer, "{}", rendered)?;
                writer.flush().context("Can't flush stdout")
            }
            StreamHandle::Stderr(handle) => {
                let mut writer = handle.lock();
                writeln!(writer, "{}", rendered)?;
                writer.flush().context("Can't flush stderr")
            }
        }
    }

    fn flush(&self) {
        match &self.handle {
            StreamHandle::Stdout(handle) => {
                let _ = handle.lock().flush();
            }
            StreamHandle::Stderr(handle) => {
                let _ = handle.lock().flush();
            }
        }
    }
}

// On unix the open handle is identified by (device, inode) so an
// external rotation that recreates the path is detected even when the
// new file has the same name. Elsewhere only removal is detectable.
#[cfg(unix)]
fn file_identity(file: &File) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    file.metadata().ok().map(|md| (md.dev(), md.ino()))
}

#[cfg(not(unix))]
fn file_identity(_file: &File) -> Option<(u64, u64)> {
    Some((0, 0))
}

#[cfg(unix)]
fn path_identity(path: &Path) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path).ok().map(|md| (md.dev(), md.ino()))
}

#[cfg(not(unix))]
fn path_identity(path: &Path) -> Option<(u64, u64)> {
    if path.exists() {
        Some((0, 0))
    } else {
        None
    }
}

struct WatchedFile {
    writer: LineWriter<File>,
    identity: Option<(u64, u64)>,
}

/// Append-only file sink with watched semantics: before every write it
/// checks whether the path still names the file it has open and reopens
/// after an external rotation or removal. Rotation itself happens
/// outside this process.
pub struct WatchedFileSink {
    file: Mutex<WatchedFile>,
    file_path: PathBuf,
}

impl WatchedFileSink {
    pub fn new(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let file_path: PathBuf = path.into();
        let file = open_append(&file_path)?;
        let identity = file_identity(&file);

        Ok(Self {
            file: Mutex::new(WatchedFile {
                writer: LineWriter::new(file),
                identity,
            }),
            file_path,
        })
    }

    fn reopen_if_rotated(&self, watched: &mut WatchedFile) -> eyre::Result<()> {
        let on_disk = path_identity(&self.file_path);
        if on_disk.is_some() && on_disk == watched.identity {
            return Ok(());
        }

        let file = open_append(&self.file_path)?;
        watched.identity = file_identity(&file);
        watched.writer = LineWriter::new(file);
        Ok(())
    }
}

fn open_append(path: &Path) -> eyre::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed opening or creating log file {}", path.display()))
}

impl LogSink for WatchedFileSink {
    fn write_log(&self, rendered: &str) -> eyre::Result<()> {
        let mut watched = self.file.lock().map_err(|e| eyre::eyre!(e.to_string()))?;

        self.reopen_if_rotated(&mut watched)?;

        writeln!(watched.writer, "{}", rendered)?;
        watched.writer.flush().context("Can't flush log file")
    }

    fn flush(&self) {
        if let Ok(mut watched) = self.file.lock() {
            let _ = watched.writer.flush();
        }
    }
}

/// One datagram per record, fire-and-forget. Send failures surface as
/// errors and are absorbed at the dispatcher boundary; there is no ack,
/// retry or backpressure.
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    pub fn new(host: &str, port: u16) -> eyre::Result<Self> {
        let target = (host, port)
            .to_socket_addrs()
            .with_context(|| format!("Failed resolving remote collector {}:{}", host, port))?
            .next()
            .ok_or_else(|| eyre::eyre!("No address found for remote collector {}:{}", host, port))?;

        let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).context("Failed binding datagram socket")?;

        Ok(Self { socket, target })
    }
}

impl LogSink for UdpSink {
    fn write_log(&self, rendered: &str) -> eyre::Result<()> {
        self.socket
            .send_to(rendered.as_bytes(), self.target)
            .with_context(|| format!("Failed sending log datagram to {}", self.target))?;
        Ok(())
    }

    fn flush(&self) {}
}
