// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use strum_macros::AsRefStr;
use tracing::{debug, warn};

use crate::{
    Body,
    BodyStream,
    Error,
    InvalidArgument,
    RuntimeFailure,
    Stream,
};

/// The size of the chunks in which a stream is copied to its target.
const COPY_CHUNK_SIZE: usize = 8192;

/// The outcome of an upload, as reported by the server that received it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr)]
#[repr(u8)]
pub enum UploadErrorCode {
    Ok = 0,
    IniSize = 1,
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    /// Unassigned.
    Reserved = 5,
    NoTmpDir = 6,
    CantWrite = 7,
    Extension = 8,
}

impl UploadErrorCode {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl TryFrom<u8> for UploadErrorCode {
    type Error = InvalidArgument;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            5 => Self::Reserved,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => return Err(InvalidArgument::UploadErrorCode(code)),
        })
    }
}

impl fmt::Display for UploadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "there is no error, the file uploaded with success",
            Self::IniSize => "the uploaded file exceeds the maximum upload size of the server",
            Self::FormSize => "the uploaded file exceeds the maximum size specified by the form",
            Self::Partial => "the uploaded file was only partially uploaded",
            Self::NoFile => "no file was uploaded",
            Self::Reserved => "unknown upload error",
            Self::NoTmpDir => "missing a temporary folder",
            Self::CantWrite => "failed to write file to disk",
            Self::Extension => "a server extension stopped the file upload",
        })
    }
}

/// Where the contents of an uploaded file can be found.
#[derive(Debug)]
pub enum UploadSource {
    /// A file on disk, typically in a temporary directory.
    Path(PathBuf),
    Stream(Body),
}

/// A file uploaded with a request. Its contents can be moved to their final
/// destination exactly once.
#[derive(Debug)]
pub struct UploadedFile {
    source: UploadSource,
    size: Option<u64>,
    error: UploadErrorCode,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    moved: Mutex<bool>,
}

impl UploadedFile {
    /// Fails if `error` isn't one of the codes `0` through `8`.
    pub fn new(
        source: UploadSource,
        size: Option<u64>,
        error: u8,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            source,
            size,
            error: UploadErrorCode::try_from(error)?,
            client_filename,
            client_media_type,
            moved: Mutex::new(false),
        })
    }

    fn ensure_usable(&self, moved: bool) -> Result<(), RuntimeFailure> {
        if !self.error.is_ok() {
            return Err(RuntimeFailure::UploadError(self.error));
        }

        if moved {
            return Err(RuntimeFailure::UploadAlreadyMoved);
        }

        Ok(())
    }

    fn moved_guard(&self) -> MutexGuard<'_, bool> {
        self.moved.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The contents of the file. A file on disk is opened anew on every call.
    pub fn stream(&self) -> Result<Body, Error> {
        self.ensure_usable(*self.moved_guard())?;

        match &self.source {
            UploadSource::Path(path) => Ok(Body::new(Stream::open(path, "r")?)),
            UploadSource::Stream(body) => Ok(body.clone()),
        }
    }

    /// Moves the file to `target`. A file on disk is renamed, falling back
    /// to copying when renaming isn't possible, e.g. across file systems. A
    /// stream is copied from its start.
    ///
    /// The directory containing `target` must exist and be writable.
    pub fn move_to(&self, target: impl AsRef<Path>) -> Result<(), Error> {
        let target = target.as_ref();

        let mut moved = self.moved_guard();
        self.ensure_usable(*moved)?;

        if target.as_os_str().is_empty() {
            return Err(InvalidArgument::EmptyTargetPath.into());
        }

        let directory = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let writable = fs::metadata(directory)
            .map(|metadata| metadata.is_dir() && !metadata.permissions().readonly())
            .unwrap_or(false);
        if !writable {
            return Err(InvalidArgument::TargetDirectory(directory.to_path_buf()).into());
        }

        match &self.source {
            UploadSource::Path(path) => move_file(path, target)?,
            UploadSource::Stream(body) => copy_stream(body, target)?,
        }

        *moved = true;
        Ok(())
    }

    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[must_use]
    pub fn error(&self) -> UploadErrorCode {
        self.error
    }

    #[must_use]
    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    #[must_use]
    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    #[must_use]
    pub fn is_moved(&self) -> bool {
        *self.moved_guard()
    }
}

fn move_file(source: &Path, target: &Path) -> Result<(), RuntimeFailure> {
    match fs::rename(source, target) {
        Ok(()) => {
            debug!(strategy = "rename", "Moved uploaded file {} to {}", source.display(), target.display());
            return Ok(());
        }
        Err(error) => {
            warn!("Failed to rename {} to {}, copying instead: {}", source.display(), target.display(), error);
        }
    }

    fs::copy(source, target).map_err(RuntimeFailure::io("copying the uploaded file"))?;
    fs::remove_file(source).map_err(RuntimeFailure::io("removing the uploaded file"))?;

    debug!(strategy = "copy", "Moved uploaded file {} to {}", source.display(), target.display());
    Ok(())
}

fn copy_stream(body: &Body, target: &Path) -> Result<(), Error> {
    let mut stream = body.lock();
    if stream.is_seekable() {
        stream.rewind()?;
    }

    let mut file = File::create(target).map_err(RuntimeFailure::io("creating the target file"))?;
    loop {
        let chunk = stream.read(COPY_CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }

        file.write_all(&chunk).map_err(RuntimeFailure::io("writing the target file"))?;
    }

    debug!(strategy = "stream", "Moved uploaded stream to {}", target.display());
    Ok(())
}
