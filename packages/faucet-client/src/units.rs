//! Human-readable token amounts.

/// Render base units as a decimal string, always keeping one fractional digit
/// (`100000000000000000000` with 18 decimals is `"100.0"`).
pub fn format_units(amount: u128, decimals: u8) -> String {
    let unit = 10u128.pow(decimals as u32);
    let whole = amount / unit;
    let frac = amount % unit;

    if decimals == 0 {
        return format!("{}.0", whole);
    }

    let frac = format!("{:0width$}", frac, width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}
