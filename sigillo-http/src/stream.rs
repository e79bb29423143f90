// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Body streams of messages.
//!
//! A message doesn't own its body by value: it holds a [`Body`], a shared
//! handle to a [`BodyStream`]. Deriving a new message from an existing one
//! shares the handle, so reading from the body of one is observable through
//! the other.

use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError},
};

use tracing::trace;

use crate::{
    Error,
    InvalidArgument,
    RuntimeFailure,
};

/// The operations a message body supports.
pub trait BodyStream: Send + fmt::Debug {
    /// Closes the stream and its underlying resource. Every subsequent
    /// operation fails with [`RuntimeFailure::StreamDetached`].
    fn close(&mut self);

    /// Separates the underlying resource from the stream, leaving the stream
    /// unusable.
    fn detach(&mut self) -> Option<Resource>;

    /// The size of the stream, if known.
    fn size(&self) -> Option<u64>;

    fn tell(&mut self) -> Result<u64, Error>;

    fn eof(&self) -> bool;

    fn is_seekable(&self) -> bool;

    fn seek(&mut self, position: SeekFrom) -> Result<u64, Error>;

    fn rewind(&mut self) -> Result<(), Error> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn is_writable(&self) -> bool;

    /// Writes the data, returning the number of bytes written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Error>;

    fn is_readable(&self) -> bool;

    /// Reads at most `length` bytes.
    fn read(&mut self, length: usize) -> Result<Vec<u8>, Error>;

    /// Reads the remainder of the stream.
    fn contents(&mut self) -> Result<Vec<u8>, Error>;

    fn metadata(&self) -> StreamMetadata;
}

/// The resource behind a [`Stream`].
#[derive(Debug)]
pub enum Resource {
    Memory(Cursor<Vec<u8>>),
    File(File),
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.read(buf),
            Self::File(file) => file.read(buf),
        }
    }
}

impl Write for Resource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.write(buf),
            Self::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Memory(cursor) => cursor.flush(),
            Self::File(file) => file.flush(),
        }
    }
}

impl Seek for Resource {
    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        match self {
            Self::Memory(cursor) => cursor.seek(position),
            Self::File(file) => file.seek(position),
        }
    }
}

/// The mode a stream is opened in, in `fopen` notation.
///
/// ```text
/// mode          = ( "r" / "w" / "a" / "x" / "c" ) [ "+" ] [ "b" / "t" ]
/// ```
///
/// The `+` and `b`/`t` flags may appear in either order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StreamMode {
    kind: ModeKind,
    update: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ModeKind {
    Read,
    Write,
    Append,
    CreateNew,
    Create,
}

impl StreamMode {
    /// The mode of in-memory streams, `wb+`.
    pub const MEMORY: Self = Self { kind: ModeKind::Write, update: true };

    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.update || self.kind == ModeKind::Read
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.update || self.kind != ModeKind::Read
    }

    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable());
        match self.kind {
            ModeKind::Read => options.write(self.update),
            ModeKind::Write => options.write(true).create(true).truncate(true),
            ModeKind::Append => options.append(true).create(true),
            ModeKind::CreateNew => options.write(true).create_new(true),
            ModeKind::Create => options.write(true).create(true),
        };
        options
    }
}

impl FromStr for StreamMode {
    type Err = InvalidArgument;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidArgument::StreamMode(mode.to_string());

        let mut chars = mode.chars();
        let kind = match chars.next() {
            Some('r') => ModeKind::Read,
            Some('w') => ModeKind::Write,
            Some('a') => ModeKind::Append,
            Some('x') => ModeKind::CreateNew,
            Some('c') => ModeKind::Create,
            _ => return Err(invalid()),
        };

        let mut update = false;
        let mut translation = false;
        for flag in chars {
            match flag {
                '+' if !update => update = true,
                'b' | 't' if !translation => translation = true,
                _ => return Err(invalid()),
            }
        }

        Ok(Self { kind, update })
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.kind {
            ModeKind::Read => "r",
            ModeKind::Write => "w",
            ModeKind::Append => "a",
            ModeKind::CreateNew => "x",
            ModeKind::Create => "c",
        })?;
        f.write_str("b")?;
        if self.update {
            f.write_str("+")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamMetadata {
    pub mode: String,
    pub seekable: bool,
    pub uri: Option<String>,
}

impl StreamMetadata {
    /// Looks a single metadata entry up by its key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "mode" => Some(self.mode.clone()),
            "seekable" => Some(self.seekable.to_string()),
            "uri" => self.uri.clone(),
            _ => None,
        }
    }
}

/// A stream backed by memory or by a file.
#[derive(Debug)]
pub struct Stream {
    resource: Option<Resource>,
    mode: StreamMode,
    uri: Option<String>,
    eof: bool,
}

impl Stream {
    /// A new empty, readable and writable in-memory stream.
    pub fn memory() -> Self {
        Self {
            resource: Some(Resource::Memory(Cursor::new(Vec::new()))),
            mode: StreamMode::MEMORY,
            uri: Some(String::from("memory")),
            eof: false,
        }
    }

    /// An in-memory stream positioned at the start of `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            resource: Some(Resource::Memory(Cursor::new(bytes.into()))),
            ..Self::memory()
        }
    }

    /// Opens the file at `path` using an `fopen`-style `mode`.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, Error> {
        let path = path.as_ref();
        let mode: StreamMode = mode.parse()?;

        let file = mode.open_options()
            .open(path)
            .map_err(|error| InvalidArgument::StreamReference {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        trace!("Opened stream {} in mode {}", path.display(), mode);
        Ok(Self {
            resource: Some(Resource::File(file)),
            mode,
            uri: Some(path.display().to_string()),
            eof: false,
        })
    }

    /// Replaces the resource of the stream, which is usable again after a
    /// [`BodyStream::detach`]. The previous resource, if any, is closed.
    pub fn attach(&mut self, resource: Resource, mode: &str) -> Result<(), Error> {
        let mode: StreamMode = mode.parse()?;

        self.uri = match resource {
            Resource::Memory(..) => Some(String::from("memory")),
            Resource::File(..) => None,
        };
        self.resource = Some(resource);
        self.mode = mode;
        self.eof = false;

        trace!("Attached stream {:?} in mode {}", self.uri, mode);
        Ok(())
    }

    fn resource(&mut self) -> Result<&mut Resource, RuntimeFailure> {
        self.resource.as_mut().ok_or(RuntimeFailure::StreamDetached)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::memory()
    }
}

impl BodyStream for Stream {
    fn close(&mut self) {
        self.resource = None;
    }

    fn detach(&mut self) -> Option<Resource> {
        let resource = self.resource.take();
        if resource.is_some() {
            trace!("Detached stream {:?}", self.uri);
        }
        resource
    }

    fn size(&self) -> Option<u64> {
        match self.resource.as_ref()? {
            Resource::Memory(cursor) => Some(cursor.get_ref().len() as u64),
            Resource::File(file) => file.metadata().ok().map(|metadata| metadata.len()),
        }
    }

    fn tell(&mut self) -> Result<u64, Error> {
        let position = self.resource()?
            .stream_position()
            .map_err(RuntimeFailure::io("determining the stream position"))?;
        Ok(position)
    }

    fn eof(&self) -> bool {
        self.resource.is_none() || self.eof
    }

    fn is_seekable(&self) -> bool {
        self.resource.is_some()
    }

    fn seek(&mut self, position: SeekFrom) -> Result<u64, Error> {
        let position = self.resource()?
            .seek(position)
            .map_err(RuntimeFailure::io("seeking within the stream"))?;
        self.eof = false;
        Ok(position)
    }

    fn is_writable(&self) -> bool {
        self.resource.is_some() && self.mode.is_writable()
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        if !self.mode.is_writable() {
            self.resource()?;
            return Err(RuntimeFailure::StreamNotWritable.into());
        }

        self.resource()?
            .write_all(data)
            .map_err(RuntimeFailure::io("writing to the stream"))?;
        Ok(data.len())
    }

    fn is_readable(&self) -> bool {
        self.resource.is_some() && self.mode.is_readable()
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>, Error> {
        if !self.mode.is_readable() {
            self.resource()?;
            return Err(RuntimeFailure::StreamNotReadable.into());
        }

        let mut buffer = Vec::with_capacity(length.min(8192));
        self.resource()?
            .take(length as u64)
            .read_to_end(&mut buffer)
            .map_err(RuntimeFailure::io("reading from the stream"))?;

        if buffer.len() < length {
            self.eof = true;
        }
        Ok(buffer)
    }

    fn contents(&mut self) -> Result<Vec<u8>, Error> {
        if !self.mode.is_readable() {
            self.resource()?;
            return Err(RuntimeFailure::StreamNotReadable.into());
        }

        let mut buffer = Vec::new();
        self.resource()?
            .read_to_end(&mut buffer)
            .map_err(RuntimeFailure::io("reading the stream contents"))?;
        self.eof = true;
        Ok(buffer)
    }

    fn metadata(&self) -> StreamMetadata {
        StreamMetadata {
            mode: self.mode.to_string(),
            seekable: self.is_seekable(),
            uri: self.uri.clone(),
        }
    }
}

/// A shared, reference-counted handle to the body of a message.
///
/// Cloning a [`Body`] clones the handle, not the stream.
#[derive(Clone)]
pub struct Body {
    stream: Arc<Mutex<Box<dyn BodyStream>>>,
}

impl Body {
    pub fn new(stream: impl BodyStream + 'static) -> Self {
        Self {
            stream: Arc::new(Mutex::new(Box::new(stream))),
        }
    }

    /// A handle to a new, empty in-memory stream.
    pub fn empty() -> Self {
        Self::new(Stream::memory())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Stream::from_bytes(bytes))
    }

    /// Locks the stream for exclusive use. A stream poisoned by a panicking
    /// holder is still handed out, since every operation leaves it in a
    /// consistent state.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn BodyStream>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles refer to the same stream.
    #[must_use]
    pub fn ptr_eq(&self, other: &Body) -> bool {
        Arc::ptr_eq(&self.stream, &other.stream)
    }

    /// Reads the remainder of the stream.
    pub fn contents(&self) -> Result<Vec<u8>, Error> {
        self.lock().contents()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    /// Doesn't wait for the stream, so formatting a body whose stream is
    /// locked, e.g. by the current thread, can't deadlock.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Body");
        match self.stream.try_lock() {
            Ok(stream) => debug.field("stream", &*stream),
            Err(TryLockError::Poisoned(poisoned)) => debug.field("stream", &*poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => debug.field("stream", &format_args!("<locked>")),
        };
        debug.finish()
    }
}

impl fmt::Display for Body {
    /// Writes the entire stream, from the start, or nothing if it can't be
    /// read.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stream = self.lock();
        let contents = stream.rewind().and_then(|()| stream.contents());
        match contents {
            Ok(contents) => f.write_str(&String::from_utf8_lossy(&contents)),
            Err(_) => Ok(()),
        }
    }
}
