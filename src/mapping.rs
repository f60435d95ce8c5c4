//! `mmap`-backed address space providers.

use std::fs::{self, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::{self, NonNull};

use crate::error::MappingError;
use crate::space::AddressSpace;

/// PCI devices have six BARs at most.
const PCI_BAR_COUNT: u8 = 6;

fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as usize } else { 4096 }
}

/// A range of a file or device mapped into this process, unmapped on drop.
///
/// Implements [`AddressSpace`], so a [`RegisterSpace`](crate::RegisterSpace) can be built on
/// top of it.
#[derive(Debug)]
pub struct Mapping {
    ptr: NonNull<u8>,
    size: usize,
    page_offset: usize,
}

impl Mapping {
    /// Maps `size` bytes of the file at `path`, starting at byte `offset`.
    ///
    /// `offset` does not need to be page aligned.
    pub fn open(path: impl AsRef<Path>, offset: u64, size: usize) -> Result<Self, MappingError> {
        let path = path.as_ref();
        if size == 0 {
            return Err(MappingError::EmptyRegion(path.to_owned()));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => MappingError::NotFound(path.to_owned()),
                _ => MappingError::Open {
                    path: path.to_owned(),
                    source,
                },
            })?;

        let page_offset = (offset % page_size() as u64) as usize;
        let map_offset = offset - page_offset as u64;
        let map_size = size + page_offset;

        // SAFETY: we ask for a fresh mapping, the kernel picks the address
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                map_offset as libc::off_t,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(MappingError::Mmap {
                path: path.to_owned(),
                source: io::Error::last_os_error(),
            });
        }
        let Some(map_base) = NonNull::new(addr.cast::<u8>()) else {
            return Err(MappingError::Mmap {
                path: path.to_owned(),
                source: io::Error::other("mmap returned a null mapping"),
            });
        };

        log::debug!(
            "mapped {:#x} bytes of {} at offset {:#x} to {:p}",
            size,
            path.display(),
            offset,
            map_base
        );

        Ok(Self {
            // SAFETY: page_offset < map_size, the result stays inside the mapping
            ptr: unsafe { map_base.add(page_offset) },
            size,
            page_offset,
        })
    }

    /// Maps `size` bytes of physical address space starting at `addr`, through `/dev/mem`.
    pub fn phys(addr: u64, size: usize) -> Result<Self, MappingError> {
        Self::open("/dev/mem", addr, size)
    }

    /// Maps BAR `bar` of the PCI device whose sysfs directory is `device_dir`, e.g.
    /// `/sys/bus/pci/devices/0000:01:00.0`.
    ///
    /// The whole `resource<bar>` file is mapped.
    pub fn pci_resource(device_dir: impl AsRef<Path>, bar: u8) -> Result<Self, MappingError> {
        if bar >= PCI_BAR_COUNT {
            return Err(MappingError::InvalidBar(bar));
        }
        let path = device_dir.as_ref().join(format!("resource{bar}"));
        let size = match fs::metadata(&path) {
            Ok(meta) => usize::try_from(meta.len()).unwrap_or(usize::MAX),
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(MappingError::NotFound(path));
            }
            Err(source) => return Err(MappingError::Open { path, source }),
        };
        Self::open(&path, 0, size)
    }

    /// Size of the mapped range in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns a raw pointer to the start of the mapped range.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: undoes the adjustment made in `open`
        let map_base = unsafe { self.ptr.sub(self.page_offset) };
        // SAFETY: the range was mapped by `open` and nothing borrows it any more
        let ret = unsafe {
            libc::munmap(
                map_base.as_ptr().cast::<libc::c_void>(),
                self.size + self.page_offset,
            )
        };
        if ret != 0 {
            log::warn!(
                "munmap of {:p} failed: {}",
                map_base,
                io::Error::last_os_error()
            );
        }
    }
}

// SAFETY: the mapping is page aligned plus the caller's offset, readable and writable over
// `size` bytes until drop, which cannot happen while `self` is borrowed
unsafe impl AddressSpace for Mapping {
    #[inline]
    fn base(&self) -> NonNull<u8> {
        self.ptr
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }
}
