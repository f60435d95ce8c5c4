use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::bits;
use crate::error::{Error, Result, SymbolKind};
use crate::parse;
use crate::symbol::{FieldSymbol, RegisterSymbol};

/// Location and geometry of a bit-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDesc {
    register: u32,
    bit_pos: u32,
    width: u32,
    mask: u32,
}
impl FieldDesc {
    /// Describes a field of `width` bits starting at bit `bit_pos` (counted from the least
    /// significant bit) of the register at absolute offset `register`.
    ///
    /// Returns `None` if the field is empty or does not fit in a 32-bit register.
    pub const fn new(register: u32, bit_pos: u32, width: u32) -> Option<Self> {
        if !bits::field_fits(bit_pos, width) {
            return None;
        }
        Some(Self {
            register,
            bit_pos,
            width,
            mask: bits::field_mask(bit_pos, width),
        })
    }
    /// Absolute offset of the register owning this field.
    #[inline]
    pub const fn register_offset(&self) -> u32 {
        self.register
    }
    /// Position of the field's least significant bit.
    #[inline]
    pub const fn bit_pos(&self) -> u32 {
        self.bit_pos
    }
    /// Width of the field in bits, 1 to 32.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }
    /// The field's bits in place, e.g. `0xff00_0000` for an 8-bit field at bit 24.
    #[inline]
    pub const fn mask(&self) -> u32 {
        self.mask
    }
    /// Extracts this field from a whole register value.
    #[inline]
    pub const fn extract(&self, register_value: u32) -> u32 {
        (register_value >> self.bit_pos) & bits::low_mask(self.width)
    }
    /// Replaces this field in `register_value` with `value`, leaving every other bit untouched.
    ///
    /// Bits of `value` that do not fit in the field are dropped.
    #[inline]
    pub const fn insert(&self, register_value: u32, value: u32) -> u32 {
        (register_value & !self.mask) | ((value << self.bit_pos) & self.mask)
    }
}

/// Maps register symbols to absolute offsets and field symbols to [`FieldDesc`]s.
///
/// A table can only be obtained from a successful load of a definitions source (see
/// [`crate::parse`]), which checks that every variant of `R` and `F` is defined. It is
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct AddressTable<R, F> {
    registers: HashMap<R, u32>,
    fields: HashMap<F, FieldDesc>,
}
impl<R: RegisterSymbol, F: FieldSymbol> AddressTable<R, F> {
    pub(crate) fn empty() -> Self {
        Self {
            registers: HashMap::with_capacity(R::ALL.len()),
            fields: HashMap::with_capacity(F::ALL.len()),
        }
    }

    /// Parses definitions from a string, `name` is used in error messages.
    pub fn parse(source: &str, name: &str) -> Result<Self> {
        parse::parse_str(source, name)
    }

    /// Parses definitions from a buffered reader, `name` is used in error messages.
    pub fn read(reader: impl BufRead, name: &str) -> Result<Self> {
        parse::parse_reader(reader, name)
    }

    /// Parses definitions from the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        parse::parse_file(path)
    }

    /// Absolute offset of register `reg`.
    #[inline]
    pub fn register_offset(&self, reg: R) -> Option<u32> {
        self.registers.get(&reg).copied()
    }

    /// Descriptor of field `field`.
    #[inline]
    pub fn field(&self, field: F) -> Option<FieldDesc> {
        self.fields.get(&field).copied()
    }

    /// Number of registers in the table.
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Number of fields in the table.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over all registers, in no particular order.
    pub fn registers(&self) -> impl ExactSizeIterator<Item = (R, u32)> + '_ {
        self.registers.iter().map(|(&reg, &offset)| (reg, offset))
    }

    /// Iterates over all fields, in no particular order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = (F, FieldDesc)> + '_ {
        self.fields.iter().map(|(&field, &desc)| (field, desc))
    }

    /// Records `reg`, returning the offset it previously had, if any.
    pub(crate) fn define_register(&mut self, reg: R, offset: u32) -> Option<u32> {
        self.registers.insert(reg, offset)
    }

    /// Records `field`, returning the descriptor it previously had, if any.
    pub(crate) fn define_field(&mut self, field: F, desc: FieldDesc) -> Option<FieldDesc> {
        self.fields.insert(field, desc)
    }

    /// Fails with the first symbol, in declaration order, that has no entry.
    pub(crate) fn check_complete(&self) -> Result<()> {
        if let Some(reg) = R::ALL.iter().find(|reg| !self.registers.contains_key(*reg)) {
            return Err(Error::IncompleteDefinition {
                kind: SymbolKind::Register,
                symbol: reg.name(),
            });
        }
        if let Some(field) = F::ALL.iter().find(|field| !self.fields.contains_key(*field)) {
            return Err(Error::IncompleteDefinition {
                kind: SymbolKind::Field,
                symbol: field.name(),
            });
        }
        Ok(())
    }
}
