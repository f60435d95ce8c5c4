use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::error::{MappingError, Result};
use crate::reg::Register;
use crate::symbol::{FieldSymbol, RegisterSymbol};
use crate::table::AddressTable;

/// A hardware address range mapped into this process.
///
/// Implemented by [`Mapping`](crate::Mapping) when the `mmap` feature is enabled; other
/// providers (a UIO device, a VFIO region, a simulator) can implement it too.
///
/// # Safety
/// - [`base`](AddressSpace::base) must be 32-bit aligned and valid for volatile 32-bit reads and
///   writes over [`size`](AddressSpace::size) bytes for as long as `self` is borrowed;
/// - both methods must keep returning the same values for the lifetime of `self`.
pub unsafe trait AddressSpace {
    /// Base of the range in this process' address space.
    fn base(&self) -> NonNull<u8>;

    /// Size of the range in bytes.
    fn size(&self) -> usize;
}

/// A mapped address range together with the [`AddressTable`] describing it.
///
/// This is the context every [`Register`] handle borrows. It is built once, after the
/// definitions have been loaded, and lives as long as the mapping it points into.
///
/// Neither `Send` nor `Sync`: handles cache register values without synchronization, and
/// volatile accesses are not atomic.
pub struct RegisterSpace<'m, R, F> {
    base: NonNull<u8>,
    table: AddressTable<R, F>,
    _region: PhantomData<&'m mut [u8]>,
}
impl<'m, R: RegisterSymbol, F: FieldSymbol> RegisterSpace<'m, R, F> {
    /// Creates a space over the range mapped by `provider`.
    ///
    /// Fails if a register in `table` does not fit in the range.
    pub fn new<P: AddressSpace + ?Sized>(provider: &'m P, table: AddressTable<R, F>) -> Result<Self> {
        let base = provider.base();
        check_region(base, provider.size(), &table)?;
        Ok(Self {
            base,
            table,
            _region: PhantomData,
        })
    }

    /// Creates a space backed by ordinary memory, e.g. to simulate a device.
    ///
    /// Fails if a register in `table` does not fit in `region`.
    pub fn from_mut(region: &'m mut [u32], table: AddressTable<R, F>) -> Result<Self> {
        let size = core::mem::size_of_val(region);
        let base = NonNull::from(region).cast::<u8>();
        check_region(base, size, &table)?;
        Ok(Self {
            base,
            table,
            _region: PhantomData,
        })
    }

    /// Creates a space from a raw base pointer.
    ///
    /// # Safety
    /// - `base` must not be null and must be 32-bit aligned;
    /// - `base + offset` must be valid for volatile 32-bit reads and writes for every register
    ///   offset in `table`, for the whole lifetime `'m`.
    #[inline]
    pub unsafe fn from_ptr(base: *mut u8, table: AddressTable<R, F>) -> Self {
        Self {
            // SAFETY: the caller promises `base` is not null
            base: unsafe { NonNull::new_unchecked(base) },
            table,
            _region: PhantomData,
        }
    }

    /// Returns the base pointer all register offsets are added to.
    #[inline]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    /// The table register offsets are looked up in.
    #[inline]
    pub fn table(&self) -> &AddressTable<R, F> {
        &self.table
    }

    /// Creates a handle to register `symbol`. The offset is looked up on first use.
    #[inline]
    pub fn register(&self, symbol: R) -> Register<'_, R, F> {
        Register::new(self, symbol)
    }

    /// Perform a volatile read of the register at `offset`.
    ///
    /// `offset` must come from this space's table.
    #[inline]
    pub(crate) fn read(&self, offset: u32) -> u32 {
        let ptr = self.reg_ptr(offset);
        // SAFETY: every table offset was checked, or promised, to be in the mapped range
        let value = unsafe { ptr.read_volatile() };
        log::trace!("FPGA-REG READ  {:p} {:#010x}", ptr, value);
        value
    }

    /// Perform a volatile write of the register at `offset`.
    ///
    /// `offset` must come from this space's table.
    #[inline]
    pub(crate) fn write(&self, offset: u32, value: u32) {
        let ptr = self.reg_ptr(offset);
        log::trace!("FPGA-REG WRITE {:p} {:#010x}", ptr, value);
        // SAFETY: every table offset was checked, or promised, to be in the mapped range
        unsafe { ptr.write_volatile(value) }
    }

    #[inline]
    fn reg_ptr(&self, offset: u32) -> NonNull<u32> {
        debug_assert_eq!(offset % 4, 0);
        // SAFETY: `offset` lies inside the region `base` points into
        unsafe { self.base.add(offset as usize).cast::<u32>() }
    }
}

fn check_region<R: RegisterSymbol, F: FieldSymbol>(
    base: NonNull<u8>,
    size: usize,
    table: &AddressTable<R, F>,
) -> Result<(), MappingError> {
    let addr = base.as_ptr() as usize;
    if addr % 4 != 0 {
        return Err(MappingError::MisalignedBase(addr));
    }
    for (_, offset) in table.registers() {
        if size < 4 || offset as usize > size - 4 {
            return Err(MappingError::OutOfRange { offset, size });
        }
    }
    Ok(())
}
