//! Size-based rotating file sink.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::buffer::LogBuffer;

/// Log file that rotates to `<name>.1 .. <name>.N` once it grows past `max_bytes`
pub struct RollingFile {
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    file: Option<File>,
    written: u64,
}

impl RollingFile {
    pub fn new(path: PathBuf, max_bytes: u64, max_files: usize) -> Self {
        let written = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self {
            path,
            max_bytes,
            max_files,
            file: None,
            written,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;
        if self.max_files == 0 {
            std::fs::remove_file(&self.path).or_else(ignore_missing)?;
        } else {
            std::fs::remove_file(self.rotated_path(self.max_files)).or_else(ignore_missing)?;
            for index in (1..self.max_files).rev() {
                let from = self.rotated_path(index);
                if from.exists() {
                    std::fs::rename(&from, self.rotated_path(index + 1))?;
                }
            }
            if self.path.exists() {
                std::fs::rename(&self.path, self.rotated_path(1))?;
            }
        }
        self.written = 0;
        Ok(())
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))
    }

    pub fn write_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + bytes.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file()?.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn ignore_missing(err: io::Error) -> io::Result<()> {
    if err.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(err)
    }
}

/// `MakeWriter` handing out writers that share one rolling file and one buffer
#[derive(Clone)]
pub struct RollingWriter {
    file: Arc<Mutex<RollingFile>>,
    buffer: LogBuffer,
}

impl RollingWriter {
    pub fn new(file: RollingFile, buffer: LogBuffer) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
            buffer,
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.buffer.push(format!(
                "[{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                line
            ));
        }

        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        file.write_line(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RollingFile::new(path.clone(), 16, 2);

        file.write_line(b"0123456789\n").unwrap();
        file.write_line(b"abcdefghij\n").unwrap();
        file.write_line(b"ABCDEFGHIJ\n").unwrap();
        file.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ABCDEFGHIJ\n");
        assert_eq!(std::fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "abcdefghij\n");
        assert_eq!(std::fs::read_to_string(dir.path().join("app.log.2")).unwrap(), "0123456789\n");
    }

    #[test]
    fn test_keeps_at_most_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RollingFile::new(path, 4, 1);

        for line in ["aaaa\n", "bbbb\n", "cccc\n"] {
            file.write_line(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert!(dir.path().join("app.log.1").exists());
        assert!(!dir.path().join("app.log.2").exists());
    }

    #[test]
    fn test_writer_feeds_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = LogBuffer::new(8);
        let mut writer = RollingWriter::new(RollingFile::new(dir.path().join("w.log"), 1024, 1), buffer.clone());

        writer.write_all(b"first line\nsecond line\n").unwrap();
        writer.flush().unwrap();

        let lines = buffer.recent(8);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first line"));
        assert!(lines[1].ends_with("second line"));
    }
}
