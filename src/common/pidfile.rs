//! PID file handling.

use std::fs;
use std::io;
use std::path::Path;

/// Write the current process id to `path`, creating parent directories.
pub fn write_pid_file(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, std::process::id().to_string())
}

/// Remove a PID file written by [`write_pid_file`]. Missing files are fine.
pub fn remove_pid_file(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
