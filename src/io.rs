//! Loading source images and persisting rendered mode sets.
//!
//! Output files are laid out as `<output root>/<level>/<mode id>.png`.

use crate::{Error, ModeDescriptor, ModeOutputSet, Result};
use image::{ImageError, ImageFormat, ImageReader, RgbImage};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Loads the image at `path` and converts it to 8-bit RGB.
///
/// Any alpha channel is dropped, and grayscale or palette images are expanded to RGB.
///
/// # Errors
/// Returns [`Error::SourceNotFound`] if `path` does not exist and [`Error::SourceDecode`]
/// if it could not be read or decoded as an image.
pub fn load_source(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    let decode_error = |source| Error::SourceDecode { path: path.to_path_buf(), source };

    // the format is sniffed from the file contents, the extension is only a fallback
    let image = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|err| decode_error(ImageError::IoError(err)))?
        .decode()
        .map_err(decode_error)?
        .into_rgb8();

    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "loaded source image"
    );

    Ok(image)
}

/// Returns the path `mode` is saved to under `root` for the given `level`.
#[must_use]
pub fn output_path(root: impl AsRef<Path>, level: &str, mode: &ModeDescriptor) -> PathBuf {
    root.as_ref().join(level).join(format!("{}.png", mode.id))
}

/// Saves every output of `set` as a PNG under `root/level`, creating directories as needed.
///
/// Existing files are overwritten. Returns the written paths in the order of `set`.
///
/// # Errors
/// Returns [`Error::Persistence`] if a directory could not be created
/// or an image could not be encoded or written.
pub fn save_output_set(set: &ModeOutputSet, root: impl AsRef<Path>, level: &str) -> Result<Vec<PathBuf>> {
    let dir = root.as_ref().join(level);
    fs::create_dir_all(&dir)
        .map_err(|err| Error::Persistence { path: dir.clone(), source: ImageError::IoError(err) })?;

    let mut paths = Vec::with_capacity(set.len());
    for output in set {
        let path = output_path(root.as_ref(), level, &output.mode);
        output
            .image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| Error::Persistence { path: path.clone(), source })?;

        let kb = fs::metadata(&path).map_or(0, |meta| meta.len()) / 1024;
        tracing::info!(
            mode = output.mode.id,
            width = output.mode.width,
            height = output.mode.height,
            kb,
            path = %path.display(),
            "saved"
        );

        paths.push(path);
    }

    Ok(paths)
}
