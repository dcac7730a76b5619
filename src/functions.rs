pub fn mean(xs: impl Iterator<Item = f64>) -> f64 {
    let mut count = 0;
    let mut total = 0.0;
    for x in xs {
        count += 1;
        total += x;
    }
    assert_ne!(count, 0);
    total / count as f64
}

pub fn mean_and_stddev(xs: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = xs.clone().count() as f64;
    let m = mean(xs.clone());
    let s = (xs.map(|x| (x - m).powi(2)).sum::<f64>() / n).sqrt();
    (m, s)
}

pub fn mse(xs: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = xs.clone().count() as f64;
    let m = mean(xs.clone());
    xs.map(|x| (x - m).powi(2)).sum::<f64>() / n
}

/// Formats `value` in scientific notation with a signed, zero-padded
/// two-digit exponent (e.g. `5.50e+00`), the way `printf`-style `%e` does.
pub fn format_exp(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision, value);
    if let Some((mantissa, exponent)) = formatted.split_once('e') {
        let exponent: i32 = exponent.parse().expect("never fails");
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_stddev_are_population_statistics() {
        let xs = [-1.0, -2.0, -3.0, -4.0, -5.0, -6.0, -7.0, -8.0, -9.0, -10.0];
        let (m, s) = mean_and_stddev(xs.iter().copied());
        assert_eq!(m, -5.5);
        assert!((s - 8.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn format_exp_works() {
        assert_eq!(format_exp(5.5, 2), "5.50e+00");
        assert_eq!(format_exp(-5.5, 2), "-5.50e+00");
        assert_eq!(format_exp(123456.0, 2), "1.23e+05");
        assert_eq!(format_exp(0.00123, 2), "1.23e-03");
        assert_eq!(format_exp(0.0, 2), "0.00e+00");
    }
}
