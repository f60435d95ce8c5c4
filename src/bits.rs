/// Returns `true` if a field of `width` bits starting at `bit_pos` fits in a `u32`.
#[inline]
pub(crate) const fn field_fits(bit_pos: u32, width: u32) -> bool {
    width >= 1 && width <= u32::BITS && bit_pos < u32::BITS && bit_pos + width <= u32::BITS
}

/// A mask with the low `width` bits set.
///
/// # Panics
///
/// If `width` is not in `1..=32`.
#[inline]
pub(crate) const fn low_mask(width: u32) -> u32 {
    u32::MAX >> (u32::BITS - width)
}

/// The mask of a field of `width` bits starting at `bit_pos`.
///
/// # Panics
///
/// If the field does not fit in a `u32`, see [`field_fits`].
#[inline]
pub(crate) const fn field_mask(bit_pos: u32, width: u32) -> u32 {
    low_mask(width) << bit_pos
}
