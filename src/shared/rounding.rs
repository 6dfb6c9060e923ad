/// Round `value` to `places` decimal digits (half away from zero).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Money amounts are kept at cent precision.
pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Energy figures are reported to one decimal place.
pub fn round_energy(value: f64) -> f64 {
    round_to(value, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_money(10.499), 10.5);
        assert_eq!(round_energy(12.96), 13.0);
        assert_eq!(round_to(-1.25, 1), -1.3);
    }
}
