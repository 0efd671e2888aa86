//! Opening the producer's named region.
//!
//! `RegionConnector` is the seam the reader retries through; `NamedRegion`
//! is the platform mapping behind it. On Windows the name is a file-mapping
//! object opened with `OpenFileMappingW`. On Unix it is a file of that name
//! under a shm directory (`/dev/shm` by default), mapped read-only.

use crate::shm_layout::SignalRecord;
use std::io;
#[cfg(unix)]
use std::path::PathBuf;

/// A live, read-only mapping of one `SignalRecord`.
pub trait SignalRegion: Send {
    fn load(&self) -> SignalRecord;
}

/// One connection attempt against the producer. Must not block beyond a
/// bounded local call.
pub trait RegionConnector: Send + Sync {
    type Region: SignalRegion;

    fn connect(&self) -> io::Result<Self::Region>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct NamedRegionConnector {
    name: String,
    #[cfg(unix)]
    dir: PathBuf,
}

impl NamedRegionConnector {
    #[cfg(unix)]
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// `dir` is accepted for signature parity and ignored: Windows names are global.
    #[cfg(windows)]
    pub fn new(name: impl Into<String>, _dir: impl Into<std::path::PathBuf>) -> Self {
        Self { name: name.into() }
    }
}

impl RegionConnector for NamedRegionConnector {
    type Region = NamedRegion;

    fn connect(&self) -> io::Result<NamedRegion> {
        #[cfg(unix)]
        {
            NamedRegion::open(&self.dir.join(&self.name))
        }
        #[cfg(windows)]
        {
            NamedRegion::open(&self.name)
        }
    }

    fn describe(&self) -> String {
        #[cfg(unix)]
        {
            self.dir.join(&self.name).display().to_string()
        }
        #[cfg(windows)]
        {
            self.name.clone()
        }
    }
}

#[cfg(unix)]
pub use unix::NamedRegion;
#[cfg(windows)]
pub use windows::NamedRegion;

#[cfg(unix)]
mod unix {
    use super::SignalRegion;
    use crate::shm_layout::{SIGNAL_RECORD_SIZE, SignalRecord};
    use std::io;
    use std::path::Path;
    use stride_mmap::MmapFile;

    pub struct NamedRegion {
        map: MmapFile,
    }

    impl NamedRegion {
        pub fn open(path: &Path) -> io::Result<Self> {
            let map = MmapFile::open_ro(path, SIGNAL_RECORD_SIZE)?;
            Ok(Self { map })
        }
    }

    impl SignalRegion for NamedRegion {
        #[inline]
        fn load(&self) -> SignalRecord {
            // SAFETY: open_ro mapped at least SIGNAL_RECORD_SIZE bytes.
            unsafe { SignalRecord::load(self.map.as_ptr()) }
        }
    }
}

#[cfg(windows)]
mod windows {
    use super::SignalRegion;
    use crate::shm_layout::{SIGNAL_RECORD_SIZE, SignalRecord};
    use std::{ffi::OsStr, io, os::windows::prelude::OsStrExt};
    use windows_sys::Win32::{
        Foundation::{CloseHandle, HANDLE},
        System::Memory::{
            FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, OpenFileMappingW,
            UnmapViewOfFile,
        },
    };

    /// RAII over an opened file mapping and its view; unmaps and closes on drop.
    pub struct NamedRegion {
        handle: HANDLE,
        view: MEMORY_MAPPED_VIEW_ADDRESS,
    }

    // The view is only ever read, and the handle is owned exclusively.
    unsafe impl Send for NamedRegion {}

    impl NamedRegion {
        pub fn open(name: &str) -> io::Result<Self> {
            let wide: Vec<u16> = OsStr::new(name).encode_wide().chain(Some(0)).collect();

            let handle = unsafe { OpenFileMappingW(FILE_MAP_READ, 0, wide.as_ptr()) };
            if handle.is_null() {
                return Err(io::Error::last_os_error());
            }

            let view = unsafe { MapViewOfFile(handle, FILE_MAP_READ, 0, 0, SIGNAL_RECORD_SIZE) };
            if view.Value.is_null() {
                let err = io::Error::last_os_error();
                unsafe { CloseHandle(handle) };
                return Err(err);
            }

            Ok(Self { handle, view })
        }
    }

    impl SignalRegion for NamedRegion {
        #[inline]
        fn load(&self) -> SignalRecord {
            // SAFETY: the view spans SIGNAL_RECORD_SIZE bytes.
            unsafe { SignalRecord::load(self.view.Value as *const u8) }
        }
    }

    impl Drop for NamedRegion {
        fn drop(&mut self) {
            unsafe {
                UnmapViewOfFile(self.view);
                CloseHandle(self.handle);
            }
        }
    }
}
