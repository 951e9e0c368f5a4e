use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{Environment, UndefinedBehavior};
use simplelog::*;
use tempfile::TempPath;

/// Render a template, failing on any variable that was not passed in.
pub fn render_strict(template: &str, ctx: minijinja::Value) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    env.render_str(template, ctx)
        .context("could not render manifest template")
}

/// A file in the working directory that only lives as long as this guard.
///
/// Removal is attempted on every exit path; failing to remove it is logged
/// and otherwise ignored.
#[derive(Debug)]
pub struct TransientFile {
    path: Option<TempPath>,
}

impl TransientFile {
    /// Write `contents` to a fresh `<prefix>*.yaml` file under `dir`.
    pub fn create(dir: &Path, prefix: &str, contents: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".yaml")
            .tempfile_in(dir)
            .with_context(|| format!("could not create {prefix} file in {}", dir.display()))?;

        file.write_all(contents.as_bytes())
            .with_context(|| format!("could not write {:?}", file.path()))?;
        trace!("wrote transient file {:?}", file.path());

        Ok(TransientFile {
            path: Some(file.into_temp_path()),
        })
    }

    pub fn path(&self) -> &Path {
        // only taken in drop()
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Path as a command-line argument.
    pub fn arg(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.to_path_buf();
        if let Err(e) = path.close() {
            // close() may have failed because someone else already removed it
            if shown.exists() {
                warn!("failed to clean up {shown:?}: {e}");
            }
        }
    }
}

/// Move `from` to `to`, copying across filesystems when a rename is refused.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Err(e) = fs::rename(from, to) {
        debug!("rename {from:?} -> {to:?} failed ({e}), copying instead");

        let data = fs::read(from).with_context(|| format!("failed to read {}", from.display()))?;
        fs::write(to, data).with_context(|| format!("failed to write {}", to.display()))?;
        set_mode(to, 0o755)?;

        if let Err(e) = fs::remove_file(from) {
            warn!("failed to clean up temporary file {from:?}: {e}");
        }
    }
    Ok(())
}

/// Set unix permission bits on `path`. No-op off unix.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to set permissions for {}", path.display()))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
