//! Access FPGA registers and bit-fields from user space, by name.
//!
//! This crate loads a small text file describing where the registers of a PCI-attached FPGA live
//! and which bit-fields they contain, checks it against closed sets of register and field
//! symbols known at compile time, and then provides volatile 32-bit access to those registers
//! through a mapped address range.
//!
//! **Table of contents**
//! - [Basic usage](#basic-usage)
//! - [Symbols](#symbols)
//! - [Definitions files](#definitions-files)
//! - [Address spaces](#address-spaces)
//! - [Cached values and fields](#cached-values-and-fields)
//! - [Thread safety](#thread-safety)
//! - [Crate features](#crate-features)
//!
//! # Basic usage
//!
//! ```rust
//! use fpga_reg::{AddressTable, FieldSymbol, RegisterSpace, RegisterSymbol};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, RegisterSymbol)]
//! enum Reg {
//!     #[symbol(base = "PCIPROXY", name = "ADDRH")]
//!     ProxyAddrH,
//! }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FieldSymbol)]
//! enum Field {
//!     #[symbol(base = "PCIPROXY", reg = "ADDRH", name = "top")]
//!     ProxyAddrHTop,
//!     #[symbol(base = "PCIPROXY", reg = "ADDRH", name = "btm")]
//!     ProxyAddrHBtm,
//! }
//!
//! let definitions = "\
//! base PCIPROXY 0x1000
//! reg ADDRH 0x00
//! field top 24 8
//! field btm 0 8
//! ";
//! let table = AddressTable::<Reg, Field>::parse(definitions, "proxy.def")?;
//!
//! // a real application would map a PCI BAR instead, see `Mapping`
//! let mut memory = vec![0u32; 0x2000 / 4];
//! let space = RegisterSpace::from_mut(&mut memory, table)?;
//!
//! let mut addrh = space.register(Reg::ProxyAddrH);
//! assert_eq!(addrh.hardware_offset()?, 0x1000);
//!
//! addrh.set(Field::ProxyAddrHTop, 0xab)?;
//! addrh.set(Field::ProxyAddrHBtm, 0xcd)?;
//! assert_eq!(addrh.read()?, 0xab00_00cd);
//! assert_eq!(addrh.get(Field::ProxyAddrHTop)?, 0xab);
//! # Ok::<(), fpga_reg::Error>(())
//! ```
//!
//! # Symbols
//!
//! Registers and fields are named by field-less enums deriving [`RegisterSymbol`] and
//! [`FieldSymbol`]. Every variant carries a `#[symbol(...)]` attribute with its path in the
//! definitions file:
//! - registers: `#[symbol(base = "PCIPROXY", name = "ADDRH")]`, known as `PCIPROXY_ADDRH`;
//! - fields: `#[symbol(base = "PCIPROXY", reg = "ADDRH", name = "top")]`, known as
//!   `PCIPROXY_ADDRH_top`.
//!
//! The derive macros generate the name lookup used by the loader, so a definitions file can
//! only mention names the program knows about, and the loader can check that the program's
//! every name was defined.
//!
//! # Definitions files
//!
//! See [`parse`] for the format. Loading is all or nothing: the result is either an
//! [`AddressTable`] with an entry for every variant of both enums, or an [`Error`] saying which
//! line or which symbol is at fault.
//!
//! # Address spaces
//!
//! A [`RegisterSpace`] pairs an [`AddressTable`] with the base pointer register offsets are
//! added to. It is built from:
//! - any [`AddressSpace`] provider, such as [`Mapping`] which maps a PCI BAR or a physical
//!   address range with `mmap` (feature `mmap`);
//! - a `&mut [u32]`, to simulate a device in ordinary memory;
//! - `unsafe`ly, a raw pointer.
//!
//! The safe constructors check once that every register in the table lies inside the range.
//! [`Register`] handles borrow the space, so the mapping outlives every access.
//!
//! # Cached values and fields
//!
//! Each [`Register`] caches the value of its last read or write. [`Register::set_field`]
//! modifies the cached value and only writes it back when asked to, so several fields can be
//! committed in one write:
//!
//! ```rust
//! # use fpga_reg::{AddressTable, FieldSymbol, RegisterSpace, RegisterSymbol};
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, RegisterSymbol)]
//! # enum Reg {
//! #     #[symbol(base = "DMA", name = "CTRL")]
//! #     Ctrl,
//! # }
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FieldSymbol)]
//! # enum Field {
//! #     #[symbol(base = "DMA", reg = "CTRL", name = "start")]
//! #     Start,
//! #     #[symbol(base = "DMA", reg = "CTRL", name = "len")]
//! #     Len,
//! # }
//! # let table = AddressTable::<Reg, Field>::parse(
//! #     "base DMA 0\nreg CTRL 0\nfield start 31 1\nfield len 0 16\n",
//! #     "dma.def",
//! # )?;
//! # let mut memory = [0u32; 4];
//! # let space = RegisterSpace::from_mut(&mut memory, table)?;
//! let mut ctrl = space.register(Reg::Ctrl);
//! ctrl.read()?;
//! ctrl.set_field(Field::Len, 512, false)?;
//! ctrl.set_field(Field::Start, 1, false)?;
//! ctrl.flush()?; // a single write
//! # assert_eq!(ctrl.read()?, 0x8000_0200);
//! # Ok::<(), fpga_reg::Error>(())
//! ```
//!
//! Two handles to the same register do not share their cached value.
//!
//! # Thread safety
//!
//! All register accesses are single volatile 32-bit loads or stores, which are not atomic with
//! respect to other threads. [`RegisterSpace`] and [`Register`] therefore implement neither
//! [`Send`] nor [`Sync`]. The [`AddressTable`] itself is plain immutable data once loaded.
//!
//! # Crate features
//!
//! - **mmap** (default) -
//!   Enables [`Mapping`], an [`AddressSpace`] built on `mmap` of `/dev/mem` or of a PCI
//!   `resource<N>` file. Unix only.
//!
//! All register accesses are logged at `trace` level through the [`log`] facade, e.g.
//! ```text
//! FPGA-REG WRITE 0x7f3a2c001000 0xab0000cd
//! FPGA-REG READ  0x7f3a2c001000 0xab0000cd
//! ```

extern crate self as fpga_reg;

/// Derive macro implementing [`RegisterSymbol`](trait@RegisterSymbol) and [`Symbol`] on a
/// field-less enum.
///
/// See the [top-level documentation](crate#symbols).
pub use fpga_reg_derive::RegisterSymbol;

/// Derive macro implementing [`FieldSymbol`](trait@FieldSymbol) and [`Symbol`] on a field-less
/// enum.
///
/// See the [top-level documentation](crate#symbols).
pub use fpga_reg_derive::FieldSymbol;

mod bits;

mod error;
pub use error::{Error, MappingError, Result, SymbolKind, SyntaxError};

#[cfg(all(unix, feature = "mmap"))]
mod mapping;
#[cfg(all(unix, feature = "mmap"))]
pub use mapping::Mapping;

pub mod parse;

mod reg;
pub use reg::Register;

mod space;
pub use space::{AddressSpace, RegisterSpace};

pub mod symbol;
pub use symbol::{FieldSymbol, RegisterSymbol, Symbol};

mod table;
pub use table::{AddressTable, FieldDesc};

pub mod token;
