//! Closed sets of register and field symbols.
//!
//! Symbol sets are plain field-less enums. The name lookup used by the definitions parser is
//! generated by the derive macros [`RegisterSymbol`](macro@crate::RegisterSymbol) and
//! [`FieldSymbol`](macro@crate::FieldSymbol), so every name the parser can accept is known at
//! compile time.

use core::fmt::Debug;
use core::hash::Hash;

/// Common behavior of register and field symbols.
pub trait Symbol: Debug + Copy + Eq + Hash + Sized + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// The fully qualified name, e.g. `PCIPROXY_ADDRH` or `PCIPROXY_ADDRH_top`.
    fn name(&self) -> &'static str;
}

/// A closed set of register symbols.
///
/// Implement with `#[derive(RegisterSymbol)]` and one `#[symbol(base = "...", name = "...")]`
/// attribute per variant.
pub trait RegisterSymbol: Symbol {
    /// Returns `true` if at least one register lives in the base region `base`.
    fn has_base(base: &str) -> bool;

    /// Returns the symbol of register `reg` in base region `base`.
    fn lookup(base: &str, reg: &str) -> Option<Self>;
}

/// A closed set of bit-field symbols.
///
/// Implement with `#[derive(FieldSymbol)]` and one
/// `#[symbol(base = "...", reg = "...", name = "...")]` attribute per variant.
pub trait FieldSymbol: Symbol {
    /// Returns the symbol of field `field` of register `reg` in base region `base`.
    fn lookup(base: &str, reg: &str, field: &str) -> Option<Self>;
}
