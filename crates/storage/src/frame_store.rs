//! Atomic, no-overwrite publication of normalized frames.
//!
//! A frame is encoded into a hidden temporary file in its partition
//! directory, synced, and then linked into place only if nothing exists at
//! the target path. A failed attempt leaves no file at the target path and
//! removes its temporary file.

use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use deskreel_capture_model::{DateLayout, NormalizedFrame};
use deskreel_common::clock::Timestamp;
use deskreel_common::error::{DeskreelError, DeskreelResult};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// Writes retained frames beneath a storage root.
#[derive(Debug, Clone)]
pub struct FrameStore {
    layout: DateLayout,
}

impl FrameStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: DateLayout::new(root),
        }
    }

    pub fn layout(&self) -> &DateLayout {
        &self.layout
    }

    /// Store `frame` at the path derived from `at` and return that path.
    ///
    /// Fails with [`DeskreelError::PathCollision`] if a file already exists
    /// there.
    pub fn store(&self, frame: &NormalizedFrame, at: &Timestamp) -> DeskreelResult<PathBuf> {
        let path = self.layout.screenshot_path(at);
        if !self.layout.contains(&path) {
            return Err(DeskreelError::format(format!(
                "derived path {} escapes the storage root",
                path.display()
            )));
        }
        let dir = path
            .parent()
            .ok_or_else(|| DeskreelError::format("screenshot path has no parent"))?;

        std::fs::create_dir_all(dir).map_err(|e| {
            DeskreelError::storage(format!("cannot create {}: {e}", dir.display()))
        })?;

        publish_png(frame, dir, &path)?;
        tracing::debug!(path = %path.display(), "Frame published");
        Ok(path)
    }
}

fn publish_png(frame: &NormalizedFrame, dir: &Path, path: &Path) -> DeskreelResult<()> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{stem}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| {
            DeskreelError::storage(format!("cannot create temp file in {}: {e}", dir.display()))
        })?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        PngEncoder::new(&mut writer).write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;
        writer.flush().map_err(|e| {
            DeskreelError::storage(format!("cannot write {}: {e}", path.display()))
        })?;
    }
    tmp.as_file().sync_all().map_err(|e| {
        DeskreelError::storage(format!("cannot sync {}: {e}", path.display()))
    })?;

    tmp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            DeskreelError::PathCollision {
                path: path.to_path_buf(),
            }
        } else {
            DeskreelError::storage(format!("cannot publish {}: {}", path.display(), e.error))
        }
    })?;
    Ok(())
}

/// Read a stored frame back as 8-bit RGB.
pub fn load_frame(path: &Path) -> DeskreelResult<NormalizedFrame> {
    Ok(NormalizedFrame::from_rgb(image::open(path)?.to_rgb8()))
}
