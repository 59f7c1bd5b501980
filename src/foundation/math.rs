pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// `max(lo, min(v, hi))`: unlike `clamp`, tolerates `hi < lo` by pinning to `lo`.
pub(crate) fn clamp_to_margin(v: i64, lo: i64, hi: i64) -> i64 {
    lo.max(v.min(hi))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
