/// Renders a number the way both a computed member's lowered string key
/// and emitted numeric literals want to see it: integral values print
/// without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_have_no_decimal() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.0), "-2");
    }

    #[test]
    fn fractional_values_keep_decimal() {
        assert_eq!(format_number(1.5), "1.5");
    }
}
