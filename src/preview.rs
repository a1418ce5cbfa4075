//! Editor side of the drop-directory handshake.
//!
//! The editor and viewer share nothing but a directory on disk acting as
//! a single-slot mailbox. Showing an image means copying it into the
//! slot; the viewer's poll loop picks it up from there. No acknowledgment
//! ever flows back, so every operation here is fire-and-forget.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::error::Result;

/// File name of the viewer binary, expected next to the editor binary.
const VIEWER_EXE: &str = "phototag-viewer";

/// Copy `path` into the drop slot under its original file name.
/// A pending file of the same name is overwritten (last write wins).
pub fn deposit(drop_dir: &Path, path: &Path) -> Result<u64> {
    fs::create_dir_all(drop_dir)?;
    let name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("path has no file name"))?;
    Ok(fs::copy(path, drop_dir.join(name))?)
}

/// Handle to the viewer process held by the editor.
///
/// The viewer is spawned lazily on the first show request and respawned
/// whenever the previous process is observed to have exited (the user
/// closed the popup window). [`close`] kills it; the drop directory is
/// left behind for the next session.
///
/// [`close`]: PreviewHandle::close
pub struct PreviewHandle {
    child: Option<Child>,
    drop_dir: PathBuf,
}

impl PreviewHandle {
    pub fn new(drop_dir: PathBuf) -> Self {
        PreviewHandle {
            child: None,
            drop_dir,
        }
    }

    /// Push an image at `path` to the viewer, spawning it first when no
    /// live viewer process exists.
    pub fn request_show(&mut self, path: &Path) -> Result<()> {
        if !self.viewer_running() {
            self.spawn_viewer()?;
        }
        deposit(&self.drop_dir, path)?;
        debug!(path = %path.display(), "queued image for preview");
        Ok(())
    }

    /// Kill the viewer process if one is held. Never fails; killing an
    /// already-exited process is a no-op.
    pub fn close(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// True when the held child process has not exited yet.
    fn viewer_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// (Re)create the drop directory and start a fresh viewer process,
    /// detached from the editor's terminal session.
    fn spawn_viewer(&mut self) -> Result<()> {
        fs::create_dir_all(&self.drop_dir)?;
        purge_stale(&self.drop_dir);

        // The viewer resolves the drop directory by its relative name,
        // so its working directory must be the slot's parent.
        let workdir = self
            .drop_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut command = Command::new(viewer_executable());
        command
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // New process group: closing the editor's terminal must not
            // take the popup down with it
            command.process_group(0);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const DETACHED_PROCESS: u32 = 0x00000008;
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            command.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
        }

        self.child = Some(command.spawn()?);
        debug!("spawned viewer process");
        Ok(())
    }
}

/// A previous session may have died with an unconsumed file in the
/// slot; replaying it in a fresh session is never wanted.
fn purge_stale(drop_dir: &Path) {
    let Ok(entries) = fs::read_dir(drop_dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        if entry.path().is_file() {
            warn!(file = %entry.path().display(), "purging stale preview file");
            let _ = fs::remove_file(entry.path());
        }
    }
}

/// Find the viewer binary next to the running editor binary, falling
/// back to a bare name resolved through PATH.
fn viewer_executable() -> PathBuf {
    let exe_name = format!("{}{}", VIEWER_EXE, std::env::consts::EXE_SUFFIX);
    if let Ok(editor_exe) = std::env::current_exe() {
        let sibling = editor_exe.with_file_name(&exe_name);
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from(exe_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(dir: &Path, name: &str, shade: u8) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(4, 4, Rgb([shade, shade, shade]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_deposit_creates_slot_and_copies() {
        let dir = tempfile::tempdir().unwrap();
        let drop_dir = dir.path().join("preview");
        let src = write_image(dir.path(), "pic.jpg", 10);

        deposit(&drop_dir, &src).unwrap();
        assert!(drop_dir.join("pic.jpg").is_file());
    }

    #[test]
    fn test_same_name_deposit_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let drop_dir = dir.path().join("preview");
        let a = write_image(dir.path(), "pic.jpg", 10);
        deposit(&drop_dir, &a).unwrap();

        let other_dir = tempfile::tempdir().unwrap();
        let b = write_image(other_dir.path(), "pic.jpg", 200);
        deposit(&drop_dir, &b).unwrap();

        // Last write wins
        let expected = fs::read(&b).unwrap();
        assert_eq!(fs::read(drop_dir.join("pic.jpg")).unwrap(), expected);
    }

    #[test]
    fn test_purge_stale_empties_slot() {
        let dir = tempfile::tempdir().unwrap();
        let drop_dir = dir.path().join("preview");
        let src = write_image(dir.path(), "old.jpg", 10);
        deposit(&drop_dir, &src).unwrap();

        purge_stale(&drop_dir);
        assert_eq!(fs::read_dir(&drop_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_close_without_viewer_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = PreviewHandle::new(dir.path().join("preview"));
        handle.close();
        handle.close();
    }
}
