//! Symbols and definitions shared by the integration tests.
#![allow(dead_code)]

use fpga_reg::{FieldSymbol, RegisterSymbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, RegisterSymbol)]
pub enum Reg {
    #[symbol(base = "PCIPROXY", name = "ADDRH")]
    ProxyAddrH,
    #[symbol(base = "PCIPROXY", name = "ADDRL")]
    ProxyAddrL,
    #[symbol(base = "PCIPROXY", name = "DATA")]
    ProxyData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FieldSymbol)]
pub enum Field {
    #[symbol(base = "PCIPROXY", reg = "ADDRH", name = "top")]
    ProxyAddrHTop,
    #[symbol(base = "PCIPROXY", reg = "ADDRH", name = "btm")]
    ProxyAddrHBtm,
    #[symbol(base = "PCIPROXY", reg = "ADDRH", name = "mid")]
    ProxyAddrHMid,
}

/// Defines every symbol of [`Reg`] and [`Field`].
pub const DEFINITIONS: &str = "\
# PCI proxy registers
base PCIPROXY 0x1000

reg ADDRH 0x00
    field top 24 8
    field mid 8 16
    field btm 0 8

// the low half of the address, and the data port
reg ADDRL, 0x04
reg DATA,  0x08
";

/// Enough simulated memory to hold every register of [`DEFINITIONS`].
pub fn memory() -> Vec<u32> {
    vec![0u32; 0x2000 / 4]
}

/// Index of the register at byte `offset` in [`memory`].
pub fn word(offset: u32) -> usize {
    offset as usize / 4
}
