use memmap2::{Mmap, MmapMut, MmapOptions};
use std::{
    fs::{File, OpenOptions},
    io,
    path::Path,
};

/// Read-only view of a file that another process owns and writes.
pub struct MmapFile {
    _file: File,
    mmap: Mmap,
}

/// Read-write mapping, for the side that produces the data.
pub struct MmapFileMut {
    _file: File,
    mmap: MmapMut,
}

impl MmapFile {
    /// Open an existing file and map its first `len` bytes read-only.
    ///
    /// Fails with `UnexpectedEof` when the file is shorter than `len`, so a
    /// half-created region is never mapped.
    pub fn open_ro<P: AsRef<Path>>(path: P, len: usize) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;

        let file_len = file.metadata()?.len();
        if file_len < len as u64 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("region is {file_len} bytes, need {len}"),
            ));
        }

        let mmap = unsafe { MmapOptions::new().len(len).map(&file)? };
        Ok(Self { _file: file, mmap })
    }

    /// Return raw pointer to start of memory mapped file data
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.mmap.as_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl MmapFileMut {
    /// Create (or truncate) a file of `size_bytes` and map it read-write
    pub fn create_rw<P: AsRef<Path>>(path: P, size_bytes: u64) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size_bytes)?;

        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self { _file: file, mmap })
    }

    /// Return raw pointer to start of memory mapped file data
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.mmap.as_mut_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}
