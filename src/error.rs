//! Error types returned by the definitions loader, the register handles and the address-space
//! providers.

use core::fmt;
use std::io;
use std::path::PathBuf;

/// Result type used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// What kind of symbol an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A base region name (`base` directive).
    Base,
    /// A register symbol (`reg` directive, [`RegisterSymbol`](crate::RegisterSymbol)).
    Register,
    /// A field symbol (`field` directive, [`FieldSymbol`](crate::FieldSymbol)).
    Field,
}
impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Base => "base",
            SymbolKind::Register => "register",
            SymbolKind::Field => "field",
        })
    }
}

/// A malformed line in a definitions source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A directive has fewer arguments than it needs.
    MissingArguments {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },
    /// `reg` before any `base`.
    NoBase,
    /// `field` before any `reg` of the current base.
    NoRegister,
    /// The first token is not `base`, `reg` or `field`.
    UnknownKeyword(String),
    /// An integer literal that does not parse as a `u32`.
    InvalidNumber(String),
    /// `base + offset` does not fit in 32 bits.
    AddressOverflow { base: u32, offset: u32 },
    /// A register offset that is not 32-bit aligned.
    MisalignedOffset(u32),
    /// A field that is empty or does not fit in a 32-bit register.
    InvalidField { bit_pos: u32, width: u32 },
}
impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::MissingArguments {
                keyword,
                expected,
                found,
            } => write!(
                f,
                "syntax error: `{keyword}` expects {expected} arguments, found {found}"
            ),
            SyntaxError::NoBase => f.write_str("no base defined"),
            SyntaxError::NoRegister => f.write_str("field declared before any register"),
            SyntaxError::UnknownKeyword(keyword) => {
                write!(f, "syntax error: unknown keyword `{keyword}`")
            }
            SyntaxError::InvalidNumber(token) => write!(f, "invalid number `{token}`"),
            SyntaxError::AddressOverflow { base, offset } => {
                write!(f, "address {base:#x} + {offset:#x} overflows 32 bits")
            }
            SyntaxError::MisalignedOffset(address) => {
                write!(f, "register address {address:#x} is not 32-bit aligned")
            }
            SyntaxError::InvalidField { bit_pos, width } => write!(
                f,
                "field at bit {bit_pos} with width {width} does not fit in a 32-bit register"
            ),
        }
    }
}

/// Failure to map, or to use, a hardware address range.
#[derive(Debug)]
pub enum MappingError {
    /// The device or resource file does not exist.
    NotFound(PathBuf),
    /// The device or resource file exists but could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// `mmap` refused the range.
    Mmap { path: PathBuf, source: io::Error },
    /// A zero-sized range was requested.
    EmptyRegion(PathBuf),
    /// PCI devices have BARs 0 to 5.
    InvalidBar(u8),
    /// A register offset lies outside of the mapped range.
    OutOfRange { offset: u32, size: usize },
    /// The base pointer is not 32-bit aligned.
    MisalignedBase(usize),
}
impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::NotFound(path) => write!(f, "{} not found", path.display()),
            MappingError::Open { path, .. } => write!(f, "can't open {}", path.display()),
            MappingError::Mmap { path, .. } => write!(f, "mmap failed on {}", path.display()),
            MappingError::EmptyRegion(path) => {
                write!(f, "refusing to map an empty region of {}", path.display())
            }
            MappingError::InvalidBar(bar) => write!(f, "invalid BAR index {bar}"),
            MappingError::OutOfRange { offset, size } => write!(
                f,
                "register offset {offset:#x} lies outside of the {size:#x}-byte address space"
            ),
            MappingError::MisalignedBase(addr) => {
                write!(f, "base address {addr:#x} is not 32-bit aligned")
            }
        }
    }
}
impl std::error::Error for MappingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MappingError::Open { source, .. } | MappingError::Mmap { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Every way loading definitions or accessing a register can fail.
///
/// Each variant is fatal to the operation that returned it: no register access happens and no
/// partial table is ever handed out.
#[derive(Debug)]
pub enum Error {
    /// Malformed directive in a definitions source.
    DefinitionSyntax {
        file: String,
        line: usize,
        kind: SyntaxError,
    },
    /// A `reg`/`field` name (or the base it lives in) is not part of the closed symbol set.
    UnknownSymbol {
        file: String,
        line: usize,
        kind: SymbolKind,
        name: String,
    },
    /// The definitions source did not define every known symbol.
    IncompleteDefinition {
        kind: SymbolKind,
        symbol: &'static str,
    },
    /// A handle asked for a symbol that the table does not contain.
    UnresolvedSymbol {
        kind: SymbolKind,
        symbol: &'static str,
    },
    /// A field was used against a register it does not belong to, or a definitions source moved
    /// a register away from the fields defined in it.
    FieldOwnership {
        field: &'static str,
        field_offset: u32,
        register: &'static str,
        register_offset: u32,
    },
    /// The address space provider failed.
    AddressMapping(MappingError),
    /// The definitions file could not be opened or read.
    Io { file: String, source: io::Error },
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DefinitionSyntax { file, line, kind } => write!(f, "{file}, line {line}: {kind}"),
            Error::UnknownSymbol {
                file,
                line,
                kind,
                name,
            } => write!(f, "{file}, line {line}: unknown {kind} {name}"),
            Error::IncompleteDefinition { kind, symbol } => {
                write!(f, "missing {kind} definition for {symbol}")
            }
            Error::UnresolvedSymbol { kind, symbol } => {
                write!(f, "{kind} {symbol} is not in the address table")
            }
            Error::FieldOwnership {
                field,
                field_offset,
                register,
                register_offset,
            } => write!(
                f,
                "field {field} belongs to the register at {field_offset:#x}, \
                 not to {register} at {register_offset:#x}"
            ),
            Error::AddressMapping(err) => fmt::Display::fmt(err, f),
            Error::Io { file, source } => write!(f, "{file}: {source}"),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::AddressMapping(err) => Some(err),
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
impl From<MappingError> for Error {
    fn from(error: MappingError) -> Self {
        Self::AddressMapping(error)
    }
}
