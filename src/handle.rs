//! Archive handles and their open/close lifecycle.
//!
//! An [`ArchiveHandle`] binds an archive to its backing file for the duration
//! of one operation. It moves through `Open(mode) -> Closed` exactly once:
//! [`ArchiveHandle::close`] is idempotent, [`with_archive`] closes on every
//! path, and dropping an unclosed handle closes it as a last resort.
//!
//! # Write strategy
//!
//! ZIP has no in-place deletion, so writes are staged. Entries added during
//! the session are compressed into a temporary archive next to the
//! destination, and deleted original entries are only marked. Nothing
//! touches the destination until close:
//!
//! - `Create` (or `Update` without an existing file): the staging archive is
//!   persisted over the destination.
//! - `Update` without deletions: staged entries are raw-copied onto the end
//!   of the existing archive. Existing entries are not rewritten.
//! - `Update` with deletions: surviving original entries and the staged
//!   entries are raw-copied into a fresh temporary archive, which then
//!   replaces the original.
//!
//! Raw copies move compressed bytes without recompressing them.

use std::collections::HashSet;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::archive_path::EntryName;
use crate::entry::{EntryInfo, method_name};
use crate::options::CompressionLevel;
use crate::timestamp::{from_zip_datetime, to_zip_datetime};
use crate::{Error, Result};

/// Entries at or above this size need ZIP64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

type SourceArchive = ZipArchive<BufReader<File>>;

/// How an archive is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read existing entries; writes are rejected.
    Read,
    /// Keep existing entries and allow adding or deleting entries.
    /// A missing archive starts out empty.
    Update,
    /// Start an empty archive that replaces any existing file on close.
    Create,
}

/// Location, size and entry count of an archive after it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    /// Path of the archive file.
    pub path: PathBuf,
    /// Size of the archive file in bytes.
    pub size: u64,
    /// Number of entries in the archive.
    pub entries: usize,
}

impl ArchiveDescriptor {
    /// Reads the descriptor of the archive at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        let archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        Ok(Self {
            path: path.to_path_buf(),
            size,
            entries: archive.len(),
        })
    }
}

/// Names in insertion order with constant-time lookup.
#[derive(Debug, Default)]
pub(crate) struct NameSet {
    order: Vec<String>,
    lookup: HashSet<String>,
}

impl NameSet {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }

    pub(crate) fn insert(&mut self, name: &str) {
        if self.lookup.insert(name.to_owned()) {
            self.order.push(name.to_owned());
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        if self.lookup.remove(name) {
            self.order.retain(|n| n != name);
            true
        } else {
            false
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

/// Temporary archive holding the entries written during a session.
struct Staging {
    writer: ZipWriter<NamedTempFile>,
    names: NameSet,
    temp_path: PathBuf,
}

impl Staging {
    fn new(dir: &Path) -> Result<Self> {
        let temp = temp_file_in(dir)?;
        Ok(Self {
            temp_path: temp.path().to_path_buf(),
            writer: ZipWriter::new(temp),
            names: NameSet::default(),
        })
    }

    /// Finishes the staging archive and reopens it for raw copying.
    fn into_archive(self) -> Result<ZipArchive<NamedTempFile>> {
        let file = self.writer.finish()?;
        Ok(ZipArchive::new(file)?)
    }
}

/// State of an open handle.
pub(crate) struct Session {
    source: Option<SourceArchive>,
    source_names: NameSet,
    removed: HashSet<String>,
    staging: Option<Staging>,
}

impl Session {
    fn new(source: Option<SourceArchive>) -> Self {
        let mut source_names = NameSet::default();
        if let Some(archive) = &source {
            for name in archive.file_names() {
                source_names.insert(name);
            }
        }
        Self {
            source,
            source_names,
            removed: HashSet::new(),
            staging: None,
        }
    }

    fn is_staged(&self, name: &str) -> bool {
        self.staging.as_ref().is_some_and(|s| s.names.contains(name))
    }

    fn is_live_source(&self, name: &str) -> bool {
        self.source_names.contains(name) && !self.removed.contains(name)
    }

    /// Returns true if `name` is a live entry of this session.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.is_live_source(name) || self.is_staged(name)
    }

    /// Returns live entry names: surviving original entries first, then
    /// entries written in this session.
    pub(crate) fn live_names(&self) -> Vec<String> {
        let original = self
            .source_names
            .iter()
            .filter(|n| !self.removed.contains(*n));
        let staged = self.staging.iter().flat_map(|s| s.names.iter());
        original.chain(staged).map(str::to_owned).collect()
    }

    pub(crate) fn live_count(&self) -> usize {
        let original = self.source_names.len() - self.removed.len();
        original + self.staging.as_ref().map_or(0, |s| s.names.len())
    }

    /// Removes a live entry. Returns whether anything was removed.
    fn remove(&mut self, name: &str, dir: &Path) -> Result<bool> {
        if self.is_staged(name) {
            self.unstage(name, dir)?;
            return Ok(true);
        }
        if self.is_live_source(name) {
            self.removed.insert(name.to_owned());
            return Ok(true);
        }
        Ok(false)
    }

    /// Rebuilds the staging archive without `name`.
    fn unstage(&mut self, name: &str, dir: &Path) -> Result<()> {
        let Some(staging) = self.staging.take() else {
            return Ok(());
        };
        let Staging {
            writer,
            mut names,
            ..
        } = staging;
        names.remove(name);

        let mut staged = ZipArchive::new(writer.finish()?)?;
        let mut rebuilt = Staging::new(dir)?;
        for i in 0..staged.len() {
            let file = staged.by_index_raw(i)?;
            if file.name() == name {
                continue;
            }
            rebuilt.writer.raw_copy_file(file)?;
        }
        rebuilt.names = names;
        log::debug!("rebuilt staging archive without '{}'", name);
        self.staging = Some(rebuilt);
        Ok(())
    }

    fn staging_mut(&mut self, dir: &Path) -> Result<&mut Staging> {
        if self.staging.is_none() {
            self.staging = Some(Staging::new(dir)?);
        }
        self.staging.as_mut().ok_or(Error::HandleClosed)
    }

    /// Lists metadata of the original entries that were not removed.
    pub(crate) fn original_entries(&mut self) -> Result<Vec<EntryInfo>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(Vec::new());
        };
        let mut entries = Vec::with_capacity(source.len());
        for i in 0..source.len() {
            let file = source.by_index_raw(i)?;
            if self.removed.contains(file.name()) {
                continue;
            }
            entries.push(EntryInfo {
                name: file.name().to_string(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                is_dir: file.is_dir(),
                crc32: file.crc32(),
                method: method_name(file.compression()),
            });
        }
        Ok(entries)
    }
}

/// An archive opened for reading, updating or creation.
///
/// The handle exclusively owns its file streams. Entry data is only
/// reachable through [`ArchiveHandle::read_entry`], whose reader cannot
/// outlive the call.
///
/// # Example
///
/// ```rust,no_run
/// use zipcraft::{ArchiveHandle, CompressionLevel, EntryName, OpenMode};
///
/// let mut handle = ArchiveHandle::open("notes.zip", OpenMode::Create)?;
/// let name = EntryName::new("hello.txt")?;
/// handle.add_bytes(&name, b"Hello, World!", CompressionLevel::Optimal)?;
/// let descriptor = handle.close()?;
/// println!("{:?}", descriptor);
/// # Ok::<(), zipcraft::Error>(())
/// ```
pub struct ArchiveHandle {
    path: PathBuf,
    mode: OpenMode,
    session: Option<Session>,
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("open", &self.is_open())
            .finish()
    }
}

impl ArchiveHandle {
    /// Opens the archive at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::ArchiveNotFound`] in `Read` mode when no file exists.
    /// - [`Error::Zip`] if an existing file is not a readable archive.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let source = match mode {
            OpenMode::Read => Some(open_source(&path)?),
            OpenMode::Update if path.exists() => Some(open_source(&path)?),
            OpenMode::Update | OpenMode::Create => None,
        };

        let session = Session::new(source);
        log::debug!(
            "opened archive {} ({:?}, {} entries)",
            path.display(),
            mode,
            session.live_count()
        );
        Ok(Self {
            path,
            mode,
            session: Some(session),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the mode the handle was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Returns true until the handle is closed.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Returns true if `path` is the backing file or the staging file of
    /// this handle. Walks use this to avoid adding an archive to itself.
    pub(crate) fn owns_path(&self, path: &Path) -> bool {
        let same = |other: &Path| {
            path.file_name() == other.file_name()
                && match (path.canonicalize(), other.canonicalize()) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => path == other,
                }
        };
        let staging = self
            .session
            .as_ref()
            .and_then(|s| s.staging.as_ref())
            .map(|s| s.temp_path.as_path());
        same(self.path.as_path()) || staging.is_some_and(same)
    }

    pub(crate) fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(Error::HandleClosed)
    }

    /// Returns the open session and the staging directory, or an error for
    /// closed and read-only handles.
    fn writable(&mut self) -> Result<(&mut Session, PathBuf)> {
        let session = self.session.as_mut().ok_or(Error::HandleClosed)?;
        if self.mode == OpenMode::Read {
            return Err(Error::ReadOnly {
                path: self.path.clone(),
            });
        }
        Ok((session, parent_dir(&self.path)))
    }

    /// Compresses the file at `source` into a new entry.
    ///
    /// The entry keeps the file's modification time and, on Unix, its
    /// permission bits. Returns the number of uncompressed bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryConflict`] if the name is already live; delete
    /// the entry first to replace it.
    pub fn add_file(
        &mut self,
        name: &EntryName,
        source: &Path,
        level: CompressionLevel,
    ) -> Result<u64> {
        let mut file = File::open(source)?;
        self.add_open_file(name, &mut file, level)
    }

    /// Compresses an already opened file into a new entry.
    pub(crate) fn add_open_file(
        &mut self,
        name: &EntryName,
        file: &mut File,
        level: CompressionLevel,
    ) -> Result<u64> {
        let metadata = file.metadata()?;

        let mut options = level
            .file_options()
            .large_file(metadata.len() >= ZIP64_THRESHOLD);
        if let Some(modified) = metadata.modified().ok().and_then(to_zip_datetime) {
            options = options.last_modified_time(modified);
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(metadata.permissions().mode());
        }

        self.write_entry(name, options, file)
    }

    /// Compresses `data` into a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryConflict`] if the name is already live.
    pub fn add_bytes(
        &mut self,
        name: &EntryName,
        data: &[u8],
        level: CompressionLevel,
    ) -> Result<u64> {
        let options = level
            .file_options()
            .large_file(data.len() as u64 >= ZIP64_THRESHOLD);
        self.write_entry(name, options, &mut &data[..])
    }

    fn write_entry(
        &mut self,
        name: &EntryName,
        options: SimpleFileOptions,
        reader: &mut dyn Read,
    ) -> Result<u64> {
        let (session, dir) = self.writable()?;
        if session.contains(name.as_str()) {
            return Err(Error::EntryConflict {
                name: name.to_string(),
            });
        }

        let staging = session.staging_mut(&dir)?;
        staging.writer.start_file(name.as_str(), options)?;
        match io::copy(reader, &mut staging.writer) {
            Ok(written) => {
                staging.names.insert(name.as_str());
                log::debug!("staged entry '{}' ({} bytes)", name, written);
                Ok(written)
            }
            Err(e) => {
                if let Err(abort) = staging.writer.abort_file() {
                    log::warn!("Failed to discard partial entry '{}': {}", name, abort);
                }
                Err(Error::Io(e))
            }
        }
    }

    /// Removes a live entry. Returns whether an entry was removed.
    pub(crate) fn remove_entry(&mut self, name: &str) -> Result<bool> {
        let (session, dir) = self.writable()?;
        session.remove(name, &dir)
    }

    /// Streams the data of an original entry through `f`.
    ///
    /// Entries written during the current session are not readable until
    /// the handle is closed and reopened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if no such original entry is live.
    pub fn read_entry<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn Read) -> Result<T>,
    ) -> Result<T> {
        self.read_entry_with_mtime(name, |reader, _| f(reader))
    }

    /// Like [`read_entry`](Self::read_entry), also passing the stored
    /// modification time when it is valid.
    pub(crate) fn read_entry_with_mtime<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn Read, Option<SystemTime>) -> Result<T>,
    ) -> Result<T> {
        let not_found = || Error::EntryNotFound {
            name: name.to_string(),
        };

        let session = self.session_mut()?;
        if !session.is_live_source(name) {
            return Err(not_found());
        }
        let source = session.source.as_mut().ok_or_else(not_found)?;
        let mut file = source.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => not_found(),
            other => Error::Zip(other),
        })?;
        let modified = file.last_modified().and_then(from_zip_datetime);
        f(&mut file, modified)
    }

    /// Closes the handle, committing staged changes for write modes.
    ///
    /// Returns the descriptor of the written archive for `Update` and
    /// `Create` handles and `None` for `Read` handles. Closing an already
    /// closed handle is a no-op that returns `None`.
    pub fn close(&mut self) -> Result<Option<ArchiveDescriptor>> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };

        match self.mode {
            OpenMode::Read => {
                log::debug!("closed archive {}", self.path.display());
                Ok(None)
            }
            OpenMode::Create | OpenMode::Update => {
                commit(&self.path, session)?;
                let descriptor = ArchiveDescriptor::read(&self.path)?;
                log::debug!(
                    "closed archive {} ({} entries, {} bytes)",
                    self.path.display(),
                    descriptor.entries,
                    descriptor.size
                );
                Ok(Some(descriptor))
            }
        }
    }
}

impl Drop for ArchiveHandle {
    fn drop(&mut self) {
        if self.session.is_some() {
            if let Err(e) = self.close() {
                log::warn!(
                    "Failed to close archive '{}': {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Opens the archive at `path`, runs `body` and closes the archive.
///
/// The handle is closed whether or not `body` succeeds. When both fail, the
/// error from `body` is returned and the close error is logged.
///
/// # Example
///
/// ```rust,no_run
/// use zipcraft::handle::{OpenMode, with_archive};
/// use zipcraft::EntryIndex;
///
/// let (count, _) = with_archive("notes.zip", OpenMode::Read, |handle| Ok(handle.len()))?;
/// println!("{count} entries");
/// # Ok::<(), zipcraft::Error>(())
/// ```
pub fn with_archive<T, F>(
    path: impl AsRef<Path>,
    mode: OpenMode,
    body: F,
) -> Result<(T, Option<ArchiveDescriptor>)>
where
    F: FnOnce(&mut ArchiveHandle) -> Result<T>,
{
    let mut handle = ArchiveHandle::open(path, mode)?;
    let outcome = body(&mut handle);
    let closed = handle.close();

    match outcome {
        Ok(value) => Ok((value, closed?)),
        Err(e) => {
            if let Err(close_err) = closed {
                log::warn!(
                    "Failed to close archive '{}' after error: {}",
                    handle.path().display(),
                    close_err
                );
            }
            Err(e)
        }
    }
}

fn open_source(path: &Path) -> Result<SourceArchive> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::ArchiveNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn temp_file_in(dir: &Path) -> Result<NamedTempFile> {
    Ok(tempfile::Builder::new()
        .prefix(".zipcraft-")
        .suffix(".tmp")
        .tempfile_in(dir)?)
}

/// Writes the session's changes to `path`.
fn commit(path: &Path, session: Session) -> Result<()> {
    let Session {
        source,
        removed,
        staging,
        ..
    } = session;

    match source {
        None => {
            let staging = match staging {
                Some(staging) => staging,
                None => Staging::new(&parent_dir(path))?,
            };
            log::debug!("persisting staged archive to {}", path.display());
            persist(staging.writer.finish()?, path)
        }
        Some(source) if removed.is_empty() => match staging {
            None => {
                log::debug!("no changes to {}", path.display());
                Ok(())
            }
            Some(staging) => {
                drop(source);
                append(path, staging)
            }
        },
        Some(source) => rewrite(path, source, &removed, staging),
    }
}

/// Raw-copies staged entries onto the end of the archive at `path`.
fn append(path: &Path, staging: Staging) -> Result<()> {
    let mut staged = staging.into_archive()?;
    log::debug!(
        "appending {} entries to {}",
        staged.len(),
        path.display()
    );

    let file = OpenOptions::new().read(true).write(true).open(path)?;
    let mut writer = ZipWriter::new_append(file)?;
    for i in 0..staged.len() {
        writer.raw_copy_file(staged.by_index_raw(i)?)?;
    }
    writer.finish()?;
    Ok(())
}

/// Rebuilds the archive at `path` without the removed entries.
fn rewrite(
    path: &Path,
    mut source: SourceArchive,
    removed: &HashSet<String>,
    staging: Option<Staging>,
) -> Result<()> {
    log::debug!(
        "rewriting {} without {} removed entries",
        path.display(),
        removed.len()
    );

    let mut writer = ZipWriter::new(temp_file_in(&parent_dir(path))?);
    for i in 0..source.len() {
        let file = source.by_index_raw(i)?;
        if removed.contains(file.name()) {
            continue;
        }
        writer.raw_copy_file(file)?;
    }
    if let Some(staging) = staging {
        let mut staged = staging.into_archive()?;
        for i in 0..staged.len() {
            writer.raw_copy_file(staged.by_index_raw(i)?)?;
        }
    }

    let temp = writer.finish()?;
    drop(source);
    persist(temp, path)
}

/// Atomically moves `temp` to `path`, keeping the permissions of a
/// replaced file.
fn persist(temp: NamedTempFile, path: &Path) -> Result<()> {
    let previous = std::fs::metadata(path).ok().map(|m| m.permissions());
    temp.persist(path)?;

    match previous {
        Some(permissions) => std::fs::set_permissions(path, permissions)?,
        None => set_default_permissions(path)?,
    }
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
