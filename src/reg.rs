use crate::error::{Error, Result, SymbolKind};
use crate::space::RegisterSpace;
use crate::symbol::{FieldSymbol, RegisterSymbol};
use crate::table::FieldDesc;

/// A handle to one 32-bit register with volatile reads and writes.
///
/// The handle remembers the value of the last [`read`](Register::read) or
/// [`write`](Register::write). Field operations modify that cached value, so several fields can
/// be changed and then committed with a single [`flush`](Register::flush).
///
/// The register offset is looked up in the [`RegisterSpace`]'s table on first access and never
/// again.
///
/// Handles to the same hardware register do not share their cached value: read-modify-write
/// sequences on aliasing handles must be serialized by the caller.
pub struct Register<'a, R, F> {
    space: &'a RegisterSpace<'a, R, F>,
    symbol: R,
    offset: Option<u32>,
    value: u32,
}
impl<'a, R: RegisterSymbol, F: FieldSymbol> Register<'a, R, F> {
    /// Creates a new, unresolved handle to register `symbol`.
    #[inline]
    pub fn new(space: &'a RegisterSpace<'a, R, F>, symbol: R) -> Self {
        Self {
            space,
            symbol,
            offset: None,
            value: 0,
        }
    }

    /// The register this handle refers to.
    #[inline]
    pub fn symbol(&self) -> R {
        self.symbol
    }

    /// The value of the last read or write, including field changes not yet flushed.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Whether the offset has already been looked up.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.offset.is_some()
    }

    /// Looks up the absolute offset of this register, once.
    ///
    /// Fails with [`Error::UnresolvedSymbol`] if the table has no entry for the symbol.
    pub fn resolve(&mut self) -> Result<u32> {
        if let Some(offset) = self.offset {
            return Ok(offset);
        }
        let offset = self
            .space
            .table()
            .register_offset(self.symbol)
            .ok_or(Error::UnresolvedSymbol {
                kind: SymbolKind::Register,
                symbol: self.symbol.name(),
            })?;
        self.offset = Some(offset);
        Ok(offset)
    }

    /// Returns the absolute offset of this register, resolving it if needed.
    #[inline]
    pub fn hardware_offset(&mut self) -> Result<u32> {
        self.resolve()
    }

    /// Perform a volatile read and cache the value.
    pub fn read(&mut self) -> Result<u32> {
        let offset = self.resolve()?;
        self.value = self.space.read(offset);
        Ok(self.value)
    }

    /// Cache `value` and perform a volatile write.
    pub fn write(&mut self, value: u32) -> Result<()> {
        self.value = value;
        self.flush()
    }

    /// Write the cached value to the register.
    pub fn flush(&mut self) -> Result<()> {
        let offset = self.resolve()?;
        self.space.write(offset, self.value);
        Ok(())
    }

    /// Sets `field` to `value` in the cached register value, and writes the result to the
    /// register if `auto_flush` is set.
    ///
    /// Bits outside of the field are never modified. Bits of `value` that do not fit in the
    /// field are dropped.
    ///
    /// Fails with [`Error::FieldOwnership`] if `field` belongs to another register, in which
    /// case the cached value is left untouched.
    pub fn set_field(&mut self, field: F, value: u32, auto_flush: bool) -> Result<()> {
        let desc = self.owned_field(field)?;
        let before = self.value;
        self.value = desc.insert(before, value);
        log::trace!(
            "{}: {} = {:#x} ({:#010x} -> {:#010x})",
            self.symbol.name(),
            field.name(),
            value,
            before,
            self.value
        );
        if auto_flush {
            self.flush()?;
        }
        Ok(())
    }

    /// Returns the value of `field`, refreshing the cached register value first if `auto_read`
    /// is set.
    ///
    /// Fails with [`Error::FieldOwnership`] if `field` belongs to another register.
    pub fn get_field(&mut self, field: F, auto_read: bool) -> Result<u32> {
        let desc = self.owned_field(field)?;
        if auto_read {
            self.read()?;
        }
        Ok(desc.extract(self.value))
    }

    /// Sets `field` to `value` and writes the register, see [`set_field`](Register::set_field).
    #[inline]
    pub fn set(&mut self, field: F, value: u32) -> Result<()> {
        self.set_field(field, value, true)
    }

    /// Reads the register and returns `field`, see [`get_field`](Register::get_field).
    #[inline]
    pub fn get(&mut self, field: F) -> Result<u32> {
        self.get_field(field, true)
    }

    fn owned_field(&mut self, field: F) -> Result<FieldDesc> {
        let desc = self
            .space
            .table()
            .field(field)
            .ok_or(Error::UnresolvedSymbol {
                kind: SymbolKind::Field,
                symbol: field.name(),
            })?;
        let offset = self.resolve()?;
        if desc.register_offset() != offset {
            return Err(Error::FieldOwnership {
                field: field.name(),
                field_offset: desc.register_offset(),
                register: self.symbol.name(),
                register_offset: offset,
            });
        }
        Ok(desc)
    }
}
