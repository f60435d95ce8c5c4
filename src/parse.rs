//! Loader for register definition sources.
//!
//! A definitions source is line oriented. Blank lines and lines starting with `#` or `//` are
//! ignored, every other line is one of these directives:
//!
//! ```text
//! base  <BASE_NAME>  <base_address>
//! reg   <REG_NAME>   <offset_from_base_address>
//! field <FIELD_NAME> <rightmost_bit_number> <width_in_bits>
//! ```
//!
//! `base` selects the base region for the `reg` lines that follow it, and `field` lines apply to
//! the most recent `reg`. A register is looked up as `<BASE_NAME>_<REG_NAME>` and a field as
//! `<BASE_NAME>_<REG_NAME>_<FIELD_NAME>` in the closed symbol sets `R` and `F`. Tokens are split
//! by [`tokenize`](crate::token::tokenize). Numbers accept the C radix prefixes: `0x` for
//! hexadecimal, a leading `0` for octal, decimal otherwise.
//!
//! Loading is all or nothing: any error aborts the load, and a source that leaves a symbol of
//! `R` or `F` undefined fails with [`Error::IncompleteDefinition`]. A register redefined at a
//! new offset after its `field` lines fails with [`Error::FieldOwnership`] unless the fields
//! are redefined too.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result, SymbolKind, SyntaxError};
use crate::symbol::{FieldSymbol, RegisterSymbol};
use crate::table::{AddressTable, FieldDesc};
use crate::token::tokenize;

/// Parses a definitions source held in memory. `name` is used in error messages.
pub fn parse_str<R, F>(source: &str, name: &str) -> Result<AddressTable<R, F>>
where
    R: RegisterSymbol,
    F: FieldSymbol,
{
    let mut parser = Parser::new(name);
    for line in source.lines() {
        parser.feed(line)?;
    }
    parser.finish()
}

/// Parses a definitions source from a buffered reader. `name` is used in error messages.
pub fn parse_reader<R, F>(reader: impl BufRead, name: &str) -> Result<AddressTable<R, F>>
where
    R: RegisterSymbol,
    F: FieldSymbol,
{
    let mut parser = Parser::new(name);
    for line in reader.lines() {
        let line = line.map_err(|source| Error::Io {
            file: name.to_owned(),
            source,
        })?;
        parser.feed(&line)?;
    }
    parser.finish()
}

/// Parses the definitions file at `path`.
pub fn parse_file<R, F>(path: impl AsRef<Path>) -> Result<AddressTable<R, F>>
where
    R: RegisterSymbol,
    F: FieldSymbol,
{
    let path = path.as_ref();
    let name = path.display().to_string();
    let file = File::open(path).map_err(|source| Error::Io {
        file: name.clone(),
        source,
    })?;
    parse_reader(BufReader::new(file), &name)
}

/// Parses an integer literal the way `strtoul(token, NULL, 0)` would, but rejects trailing
/// garbage, signs and values that do not fit in a `u32`.
pub(crate) fn parse_number(token: &str) -> Option<u32> {
    let (digits, radix) = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        (hex, 16)
    } else if token.len() > 1 && token.starts_with('0') {
        (&token[1..], 8)
    } else {
        (token, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

struct Base {
    name: String,
    address: u32,
}

struct CurrentReg<R> {
    symbol: R,
    name: String,
    offset: u32,
}

struct Parser<'n, R, F> {
    file: &'n str,
    line: usize,
    base: Option<Base>,
    reg: Option<CurrentReg<R>>,
    table: AddressTable<R, F>,
    owners: HashMap<F, R>,
}

impl<'n, R: RegisterSymbol, F: FieldSymbol> Parser<'n, R, F> {
    fn new(file: &'n str) -> Self {
        Self {
            file,
            line: 0,
            base: None,
            reg: None,
            table: AddressTable::empty(),
            owners: HashMap::with_capacity(F::ALL.len()),
        }
    }

    fn feed(&mut self, text: &str) -> Result<()> {
        self.line += 1;

        let tokens = tokenize(text);
        let Some((keyword, args)) = tokens.split_first() else {
            return Ok(());
        };
        match keyword.as_str() {
            "base" => self.base(args),
            "reg" => self.reg(args),
            "field" => self.field(args),
            _ => Err(self.syntax(SyntaxError::UnknownKeyword(keyword.clone()))),
        }
    }

    fn finish(self) -> Result<AddressTable<R, F>> {
        self.table.check_complete()?;
        self.check_owners()?;
        log::debug!(
            "{}: loaded {} registers and {} fields",
            self.file,
            self.table.register_count(),
            self.table.field_count()
        );
        Ok(self.table)
    }

    // base <NAME> <address>
    fn base(&mut self, args: &[String]) -> Result<()> {
        self.expect_args("base", args, 2)?;
        let address = self.number(&args[1])?;
        self.base = Some(Base {
            name: args[0].clone(),
            address,
        });
        self.reg = None;
        Ok(())
    }

    // reg <NAME> <offset>
    fn reg(&mut self, args: &[String]) -> Result<()> {
        self.expect_args("reg", args, 2)?;
        let Some(base) = &self.base else {
            return Err(self.syntax(SyntaxError::NoBase));
        };
        let name = &args[0];
        let relative = self.number(&args[1])?;

        let Some(offset) = base.address.checked_add(relative) else {
            return Err(self.syntax(SyntaxError::AddressOverflow {
                base: base.address,
                offset: relative,
            }));
        };
        if offset % 4 != 0 {
            return Err(self.syntax(SyntaxError::MisalignedOffset(offset)));
        }

        if !R::has_base(&base.name) {
            return Err(self.unknown(SymbolKind::Base, base.name.clone()));
        }
        let Some(symbol) = R::lookup(&base.name, name) else {
            return Err(self.unknown(SymbolKind::Register, format!("{}_{}", base.name, name)));
        };

        if let Some(previous) = self.table.define_register(symbol, offset) {
            log::warn!(
                "{}, line {}: register {} redefined ({:#x} -> {:#x})",
                self.file,
                self.line,
                symbol.name(),
                previous,
                offset
            );
        }
        self.reg = Some(CurrentReg {
            symbol,
            name: name.clone(),
            offset,
        });
        Ok(())
    }

    // field <NAME> <bit position> <bit width>
    fn field(&mut self, args: &[String]) -> Result<()> {
        self.expect_args("field", args, 3)?;
        let (Some(base), Some(reg)) = (&self.base, &self.reg) else {
            return Err(self.syntax(SyntaxError::NoRegister));
        };
        let name = &args[0];
        let bit_pos = self.number(&args[1])?;
        let width = self.number(&args[2])?;

        let Some(desc) = FieldDesc::new(reg.offset, bit_pos, width) else {
            return Err(self.syntax(SyntaxError::InvalidField { bit_pos, width }));
        };
        let Some(symbol) = F::lookup(&base.name, &reg.name, name) else {
            return Err(self.unknown(
                SymbolKind::Field,
                format!("{}_{}_{}", base.name, reg.name, name),
            ));
        };

        self.owners.insert(symbol, reg.symbol);
        if self.table.define_field(symbol, desc).is_some() {
            log::warn!(
                "{}, line {}: field {} redefined",
                self.file,
                self.line,
                symbol.name()
            );
        }
        Ok(())
    }

    // every field must still sit in the register it was defined under
    fn check_owners(&self) -> Result<()> {
        for &field in F::ALL {
            let (Some(desc), Some(&owner)) = (self.table.field(field), self.owners.get(&field))
            else {
                continue;
            };
            let Some(register_offset) = self.table.register_offset(owner) else {
                continue;
            };
            if desc.register_offset() != register_offset {
                return Err(Error::FieldOwnership {
                    field: field.name(),
                    field_offset: desc.register_offset(),
                    register: owner.name(),
                    register_offset,
                });
            }
        }
        Ok(())
    }

    fn expect_args(&self, keyword: &'static str, args: &[String], expected: usize) -> Result<()> {
        if args.len() < expected {
            return Err(self.syntax(SyntaxError::MissingArguments {
                keyword,
                expected,
                found: args.len(),
            }));
        }
        if args.len() > expected {
            log::debug!(
                "{}, line {}: ignoring {} extra arguments to `{}`",
                self.file,
                self.line,
                args.len() - expected,
                keyword
            );
        }
        Ok(())
    }

    fn number(&self, token: &str) -> Result<u32> {
        parse_number(token).ok_or_else(|| self.syntax(SyntaxError::InvalidNumber(token.to_owned())))
    }

    fn syntax(&self, kind: SyntaxError) -> Error {
        Error::DefinitionSyntax {
            file: self.file.to_owned(),
            line: self.line,
            kind,
        }
    }

    fn unknown(&self, kind: SymbolKind, name: String) -> Error {
        Error::UnknownSymbol {
            file: self.file.to_owned(),
            line: self.line,
            kind,
            name,
        }
    }
}
