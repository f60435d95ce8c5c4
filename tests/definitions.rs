mod common;

use common::{DEFINITIONS, Field, Reg};
use fpga_reg::token::tokenize;
use fpga_reg::{
    AddressTable, Error, FieldDesc, FieldSymbol, RegisterSymbol, Symbol, SymbolKind, SyntaxError,
};

fn parse(source: &str) -> fpga_reg::Result<AddressTable<Reg, Field>> {
    AddressTable::parse(source, "proxy.def")
}

#[track_caller]
fn syntax_error(source: &str) -> (usize, SyntaxError) {
    match parse(source) {
        Err(Error::DefinitionSyntax { file, line, kind }) => {
            assert_eq!(file, "proxy.def");
            (line, kind)
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[track_caller]
fn unknown_symbol(source: &str) -> (usize, SymbolKind, String) {
    match parse(source) {
        Err(Error::UnknownSymbol {
            line, kind, name, ..
        }) => (line, kind, name),
        other => panic!("expected an unknown symbol, got {other:?}"),
    }
}

#[track_caller]
fn incomplete(source: &str) -> (SymbolKind, &'static str) {
    match parse(source) {
        Err(Error::IncompleteDefinition { kind, symbol }) => (kind, symbol),
        other => panic!("expected an incomplete definition, got {other:?}"),
    }
}

#[test]
fn tokenizer() {
    assert_eq!(
        tokenize("reg ADDRH, 0x04  # trailing"),
        ["reg", "ADDRH", "0x04"]
    );
    assert_eq!(
        tokenize("field \"my field\" 0 8"),
        ["field", "my field", "0", "8"]
    );
    assert_eq!(tokenize("\tbase 'A B',0x10\r\n"), ["base", "A B", "0x10"]);
    assert_eq!(tokenize("a,,b"), ["a", "", "b"]);
    assert_eq!(tokenize("reg X 4 // note"), ["reg", "X", "4"]);
    assert_eq!(tokenize("field \"#1\" 0 1"), ["field", "#1", "0", "1"]);
    assert!(tokenize("").is_empty());
    assert!(tokenize("  \t ").is_empty());
    assert!(tokenize("# comment").is_empty());
    assert!(tokenize("  // comment").is_empty());
}

#[test]
fn full_definitions() {
    let table = parse(DEFINITIONS).unwrap();

    assert_eq!(table.register_count(), Reg::ALL.len());
    assert_eq!(table.field_count(), Field::ALL.len());

    assert_eq!(table.register_offset(Reg::ProxyAddrH), Some(0x1000));
    assert_eq!(table.register_offset(Reg::ProxyAddrL), Some(0x1004));
    assert_eq!(table.register_offset(Reg::ProxyData), Some(0x1008));

    let top = table.field(Field::ProxyAddrHTop).unwrap();
    assert_eq!(top, FieldDesc::new(0x1000, 24, 8).unwrap());
    assert_eq!(top.mask(), 0xff00_0000);
    let mid = table.field(Field::ProxyAddrHMid).unwrap();
    assert_eq!(mid.mask(), 0x00ff_ff00);
    assert_eq!(mid.register_offset(), 0x1000);
    let btm = table.field(Field::ProxyAddrHBtm).unwrap();
    assert_eq!(btm.mask(), 0x0000_00ff);
}

#[test]
fn reader_and_line_endings() {
    let crlf = DEFINITIONS.replace('\n', "\r\n");
    let table = AddressTable::<Reg, Field>::read(crlf.as_bytes(), "crlf.def").unwrap();
    assert_eq!(table.register_offset(Reg::ProxyData), Some(0x1008));
    assert_eq!(table.fields().count(), 3);
}

#[test]
fn file_on_disk() {
    let path = std::env::temp_dir().join(format!("fpga-reg-defs-{}.def", std::process::id()));
    std::fs::write(&path, DEFINITIONS).unwrap();
    let table = AddressTable::<Reg, Field>::load(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(table.unwrap().register_offset(Reg::ProxyAddrL), Some(0x1004));
}

#[test]
fn missing_file() {
    let path = std::env::temp_dir().join("fpga-reg-this-file-does-not-exist.def");
    let err = AddressTable::<Reg, Field>::load(&path).unwrap_err();
    assert!(matches!(&err, Error::Io { file, .. } if file.ends_with("does-not-exist.def")));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn symbols_and_names() {
    assert_eq!(
        Reg::ALL,
        [Reg::ProxyAddrH, Reg::ProxyAddrL, Reg::ProxyData]
    );
    assert_eq!(Reg::ProxyAddrL.name(), "PCIPROXY_ADDRL");
    assert_eq!(Field::ProxyAddrHMid.name(), "PCIPROXY_ADDRH_mid");

    assert!(Reg::has_base("PCIPROXY"));
    assert!(!Reg::has_base("pciproxy"));
    assert_eq!(
        <Reg as RegisterSymbol>::lookup("PCIPROXY", "DATA"),
        Some(Reg::ProxyData)
    );
    assert_eq!(<Reg as RegisterSymbol>::lookup("PCIPROXY", "top"), None);
    assert_eq!(
        <Field as FieldSymbol>::lookup("PCIPROXY", "ADDRH", "btm"),
        Some(Field::ProxyAddrHBtm)
    );
    assert_eq!(<Field as FieldSymbol>::lookup("PCIPROXY", "ADDRL", "btm"), None);
}

#[test]
fn missing_register() {
    let source = "\
base PCIPROXY 0x1000
reg ADDRH 0x00
field top 24 8
field mid 8 16
field btm 0 8
reg DATA 0x08
";
    assert_eq!(
        incomplete(source),
        (SymbolKind::Register, "PCIPROXY_ADDRL")
    );
}

#[test]
fn missing_field() {
    let source = "\
base PCIPROXY 0x1000
reg ADDRH 0x00
field top 24 8
field mid 8 16
reg ADDRL 0x04
reg DATA 0x08
";
    assert_eq!(
        incomplete(source),
        (SymbolKind::Field, "PCIPROXY_ADDRH_btm")
    );
}

#[test]
fn empty_source() {
    assert_eq!(incomplete(""), (SymbolKind::Register, "PCIPROXY_ADDRH"));
    assert_eq!(
        incomplete("# nothing\n\n// at all\n"),
        (SymbolKind::Register, "PCIPROXY_ADDRH")
    );
}

#[test]
fn unknown_register() {
    let source = "base PCIPROXY 0x1000\nreg FOO 0x10\n";
    assert_eq!(
        unknown_symbol(source),
        (2, SymbolKind::Register, "PCIPROXY_FOO".to_owned())
    );
}

#[test]
fn unknown_base() {
    let source = "base ELSEWHERE 0x1000\nreg ADDRH 0x00\n";
    assert_eq!(
        unknown_symbol(source),
        (2, SymbolKind::Base, "ELSEWHERE".to_owned())
    );
}

#[test]
fn unknown_field() {
    let source = "base PCIPROXY 0x1000\nreg ADDRH 0x00\nfield top 24 8\nfield low 0 4\n";
    assert_eq!(
        unknown_symbol(source),
        (4, SymbolKind::Field, "PCIPROXY_ADDRH_low".to_owned())
    );

    // a known field name under the wrong register
    let source = "base PCIPROXY 0x1000\nreg ADDRL 0x04\nfield top 24 8\n";
    assert_eq!(
        unknown_symbol(source),
        (3, SymbolKind::Field, "PCIPROXY_ADDRL_top".to_owned())
    );
}

#[test]
fn field_before_register() {
    assert_eq!(
        syntax_error("field top 24 8\n"),
        (1, SyntaxError::NoRegister)
    );
    assert_eq!(
        syntax_error("base PCIPROXY 0x1000\n\nfield top 24 8\n"),
        (3, SyntaxError::NoRegister)
    );
    // a new base starts without a current register
    assert_eq!(
        syntax_error("base PCIPROXY 0x1000\nreg ADDRH 0\nbase PCIPROXY 0x2000\nfield top 24 8\n"),
        (4, SyntaxError::NoRegister)
    );
}

#[test]
fn register_before_base() {
    assert_eq!(
        syntax_error("# header\nreg ADDRH 0x00\n"),
        (2, SyntaxError::NoBase)
    );
}

#[test]
fn missing_arguments() {
    assert_eq!(
        syntax_error("base PCIPROXY\n"),
        (
            1,
            SyntaxError::MissingArguments {
                keyword: "base",
                expected: 2,
                found: 1,
            }
        )
    );
    assert_eq!(
        syntax_error("base PCIPROXY 0\nreg ADDRH\n"),
        (
            2,
            SyntaxError::MissingArguments {
                keyword: "reg",
                expected: 2,
                found: 1,
            }
        )
    );
    assert_eq!(
        syntax_error("base PCIPROXY 0\nreg ADDRH 0\nfield top 24\n"),
        (
            3,
            SyntaxError::MissingArguments {
                keyword: "field",
                expected: 3,
                found: 2,
            }
        )
    );
}

#[test]
fn unknown_keyword() {
    assert_eq!(
        syntax_error("base PCIPROXY 0\nregister ADDRH 0\n"),
        (2, SyntaxError::UnknownKeyword("register".to_owned()))
    );
}

#[test]
fn bad_numbers() {
    assert_eq!(
        syntax_error("base PCIPROXY 0x10zz\n"),
        (1, SyntaxError::InvalidNumber("0x10zz".to_owned()))
    );
    assert_eq!(
        syntax_error("base PCIPROXY 0\nreg ADDRH -4\n"),
        (2, SyntaxError::InvalidNumber("-4".to_owned()))
    );
    assert_eq!(
        syntax_error("base PCIPROXY 0xffffffff\nreg ADDRH 0x04\n"),
        (
            2,
            SyntaxError::AddressOverflow {
                base: 0xffff_ffff,
                offset: 4,
            }
        )
    );
}

#[test]
fn register_geometry() {
    assert_eq!(
        syntax_error("base PCIPROXY 0x1000\nreg ADDRH 0x02\n"),
        (2, SyntaxError::MisalignedOffset(0x1002))
    );
    assert_eq!(
        syntax_error("base PCIPROXY 0\nreg ADDRH 0\nfield top 30 8\n"),
        (
            3,
            SyntaxError::InvalidField {
                bit_pos: 30,
                width: 8,
            }
        )
    );
    assert_eq!(
        syntax_error("base PCIPROXY 0\nreg ADDRH 0\nfield top 4 0\n"),
        (
            3,
            SyntaxError::InvalidField {
                bit_pos: 4,
                width: 0,
            }
        )
    );
}

#[test]
fn redefinition_keeps_the_last() {
    let source = format!("{DEFINITIONS}base PCIPROXY 0x3000\nreg DATA 0x08\n");
    let table = parse(&source).unwrap();
    assert_eq!(table.register_offset(Reg::ProxyData), Some(0x3008));
    assert_eq!(table.register_count(), 3);
}

#[test]
fn moving_a_register_away_from_its_fields() {
    let source = format!("{DEFINITIONS}base PCIPROXY 0x1800\nreg ADDRH 0x00\n");
    let err = parse(&source).unwrap_err();
    assert!(matches!(
        err,
        Error::FieldOwnership {
            field: "PCIPROXY_ADDRH_top",
            field_offset: 0x1000,
            register: "PCIPROXY_ADDRH",
            register_offset: 0x1800,
        }
    ));

    // fields redefined under the moved register follow it
    let source = format!(
        "{DEFINITIONS}base PCIPROXY 0x1800\nreg ADDRH 0x00\n\
         field top 24 8\nfield mid 8 16\nfield btm 0 8\n"
    );
    let table = parse(&source).unwrap();
    assert_eq!(table.register_offset(Reg::ProxyAddrH), Some(0x1800));
    assert_eq!(
        table.field(Field::ProxyAddrHBtm).unwrap().register_offset(),
        0x1800
    );

    // same offset, nothing to move
    let source = format!("{DEFINITIONS}base PCIPROXY 0x1000\nreg ADDRH 0x00\n");
    assert!(parse(&source).is_ok());
}

#[test]
fn extra_arguments_are_ignored() {
    let source = DEFINITIONS.replace("reg DATA,  0x08", "reg DATA 0x08 read-only");
    let table = parse(&source).unwrap();
    assert_eq!(table.register_offset(Reg::ProxyData), Some(0x1008));
}

#[test]
fn quoted_names() {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, RegisterSymbol)]
    enum Spaced {
        #[symbol(base = "MY BLOCK", name = "STATUS WORD")]
        Status,
    }
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FieldSymbol)]
    enum SpacedField {
        #[symbol(base = "MY BLOCK", reg = "STATUS WORD", name = "my field")]
        MyField,
    }

    let source = "base \"MY BLOCK\" 0x40\nreg 'STATUS WORD', 0x4\nfield \"my field\" 0 8\n";
    let table = AddressTable::<Spaced, SpacedField>::parse(source, "spaced.def").unwrap();
    assert_eq!(table.register_offset(Spaced::Status), Some(0x44));
    assert_eq!(
        table.field(SpacedField::MyField).unwrap().register_offset(),
        0x44
    );
}

#[test]
fn error_messages_name_the_location() {
    let err = parse("base PCIPROXY 0x1000\nreg FOO 0x10\n").unwrap_err();
    assert_eq!(err.to_string(), "proxy.def, line 2: unknown register PCIPROXY_FOO");

    let err = parse("base PCIPROXY 0x1000\nbogus\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "proxy.def, line 2: syntax error: unknown keyword `bogus`"
    );

    let err = parse("").unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing register definition for PCIPROXY_ADDRH"
    );
}
