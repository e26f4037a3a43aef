/// Default number of decimals for non-integral numbers.
pub const DEFAULT_DECIMALS: usize = 2;

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    format_number_with(n, DEFAULT_DECIMALS)
}

/// Format a number for display with the given number of decimals.
/// Integral values below 1e10 are shown without a fraction.
pub fn format_number_with(n: f64, decimals: usize) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        format!("{:.*}", decimals, n)
    }
}
