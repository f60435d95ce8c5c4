use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Fields, Ident, LitStr, Result, Variant};

macro_rules! bail {
    ($msg:expr) => {
        return ::core::result::Result::Err(::syn::Error::new(
            ::proc_macro2::Span::call_site(),
            $msg,
        ))
    };
    ($span:expr, $msg:expr) => {
        return ::core::result::Result::Err(::syn::Error::new_spanned($span, $msg))
    };
}

#[proc_macro_derive(RegisterSymbol, attributes(symbol))]
pub fn register_symbol_derive(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input);

    impl_register(&input).unwrap_or_else(|err| err.into_compile_error().into())
}

#[proc_macro_derive(FieldSymbol, attributes(symbol))]
pub fn field_symbol_derive(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input);

    impl_field(&input).unwrap_or_else(|err| err.into_compile_error().into())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    Register,
    Field,
}
impl SymbolKind {
    fn derive_name(self) -> &'static str {
        match self {
            SymbolKind::Register => "RegisterSymbol",
            SymbolKind::Field => "FieldSymbol",
        }
    }
}

/// The `#[symbol(...)]` attribute of one enum variant.
struct SymbolPath<'a> {
    ident: &'a Ident,
    base: LitStr,
    reg: Option<LitStr>,
    name: LitStr,
}
impl SymbolPath<'_> {
    /// The joined path, e.g. `PCIPROXY_ADDRH` or `PCIPROXY_ADDRH_top`.
    fn joined(&self) -> String {
        match &self.reg {
            Some(reg) => format!(
                "{}_{}_{}",
                self.base.value(),
                reg.value(),
                self.name.value()
            ),
            None => format!("{}_{}", self.base.value(), self.name.value()),
        }
    }
}

fn impl_register(ast: &DeriveInput) -> Result<TokenStream> {
    let name = &ast.ident;
    let paths = parse_variants(ast, SymbolKind::Register)?;

    let idents: Vec<_> = paths.iter().map(|p| p.ident).collect();
    let joined: Vec<_> = paths.iter().map(SymbolPath::joined).collect();
    let bases: Vec<_> = paths.iter().map(|p| &p.base).collect();
    let regs: Vec<_> = paths.iter().map(|p| &p.name).collect();

    let mut known_bases: Vec<String> = paths.iter().map(|p| p.base.value()).collect();
    known_bases.sort();
    known_bases.dedup();

    let all = quote!(
        impl ::fpga_reg::Symbol for #name {
            const ALL: &'static [Self] = &[#(#name::#idents),*];

            #[inline]
            fn name(&self) -> &'static str {
                match self {
                    #(#name::#idents => #joined,)*
                }
            }
        }
        impl ::fpga_reg::RegisterSymbol for #name {
            #[inline]
            fn has_base(base: &str) -> bool {
                ::core::matches!(base, #(#known_bases)|*)
            }

            fn lookup(base: &str, reg: &str) -> ::core::option::Option<Self> {
                match (base, reg) {
                    #((#bases, #regs) => ::core::option::Option::Some(#name::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    );
    Ok(all.into())
}

fn impl_field(ast: &DeriveInput) -> Result<TokenStream> {
    let name = &ast.ident;
    let paths = parse_variants(ast, SymbolKind::Field)?;

    let idents: Vec<_> = paths.iter().map(|p| p.ident).collect();
    let joined: Vec<_> = paths.iter().map(SymbolPath::joined).collect();
    let bases: Vec<_> = paths.iter().map(|p| &p.base).collect();
    let regs: Vec<_> = paths.iter().filter_map(|p| p.reg.as_ref()).collect();
    let fields: Vec<_> = paths.iter().map(|p| &p.name).collect();

    let all = quote!(
        impl ::fpga_reg::Symbol for #name {
            const ALL: &'static [Self] = &[#(#name::#idents),*];

            #[inline]
            fn name(&self) -> &'static str {
                match self {
                    #(#name::#idents => #joined,)*
                }
            }
        }
        impl ::fpga_reg::FieldSymbol for #name {
            fn lookup(base: &str, reg: &str, field: &str) -> ::core::option::Option<Self> {
                match (base, reg, field) {
                    #((#bases, #regs, #fields) => ::core::option::Option::Some(#name::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    );
    Ok(all.into())
}

fn parse_variants(ast: &DeriveInput, kind: SymbolKind) -> Result<Vec<SymbolPath<'_>>> {
    let derive = kind.derive_name();

    if !ast.generics.params.is_empty() {
        bail!(
            &ast.generics,
            format!("{derive} derive does not support generic enums")
        );
    }
    let Data::Enum(DataEnum { variants, .. }) = &ast.data else {
        bail!(ast, format!("{derive} derive supports only enums"));
    };
    if variants.is_empty() {
        bail!(
            ast,
            format!("{derive} derive requires at least one variant")
        );
    }

    let mut paths: Vec<SymbolPath<'_>> = Vec::with_capacity(variants.len());
    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            bail!(
                variant,
                format!("{derive} derive supports only field-less variants")
            );
        }
        let path = parse_symbol_attr(variant, kind)?;
        let joined = path.joined();
        if let Some(other) = paths.iter().find(|p| p.joined() == joined) {
            bail!(
                variant,
                format!("symbol `{joined}` is already bound to variant `{}`", other.ident)
            );
        }
        paths.push(path);
    }
    Ok(paths)
}

fn parse_symbol_attr(variant: &Variant, kind: SymbolKind) -> Result<SymbolPath<'_>> {
    let mut base = None::<LitStr>;
    let mut reg = None::<LitStr>;
    let mut name = None::<LitStr>;
    let mut found = false;

    for attr in &variant.attrs {
        if !attr.path().is_ident("symbol") {
            continue;
        }
        found = true;
        attr.parse_nested_meta(|meta| {
            // #[symbol(base = "...")]
            if meta.path.is_ident("base") {
                base = Some(non_empty(meta.value()?.parse()?)?);
                return Ok(());
            }

            // #[symbol(reg = "...")], fields only
            if meta.path.is_ident("reg") {
                if kind == SymbolKind::Register {
                    return Err(meta.error("`reg` is only valid on FieldSymbol variants"));
                }
                reg = Some(non_empty(meta.value()?.parse()?)?);
                return Ok(());
            }

            // #[symbol(name = "...")]
            if meta.path.is_ident("name") {
                name = Some(non_empty(meta.value()?.parse()?)?);
                return Ok(());
            }

            Err(meta.error("unrecognized key in #[symbol(...)], expected `base`, `reg` or `name`"))
        })?;
    }

    if !found {
        bail!(
            variant,
            format!(
                "{} derive requires a #[symbol(...)] attribute on every variant",
                kind.derive_name()
            )
        );
    }
    let Some(base) = base else {
        bail!(variant, "#[symbol(...)] is missing `base = \"...\"`");
    };
    let Some(name) = name else {
        bail!(variant, "#[symbol(...)] is missing `name = \"...\"`");
    };
    if kind == SymbolKind::Field && reg.is_none() {
        bail!(variant, "#[symbol(...)] is missing `reg = \"...\"`");
    }

    Ok(SymbolPath {
        ident: &variant.ident,
        base,
        reg,
        name,
    })
}

fn non_empty(lit: LitStr) -> Result<LitStr> {
    if lit.value().is_empty() {
        bail!(&lit, "symbol names cannot be empty");
    }
    Ok(lit)
}
