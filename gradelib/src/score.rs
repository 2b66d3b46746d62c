/// Maps a miss count onto `[0, full_score]`, falling linearly between `lower` and `upper`
///
/// Counts at or below `lower` earn everything, counts at or above `upper` earn nothing. Between
/// the two the score is interpolated and rounded to one decimal place. Both boundary checks run
/// before the division, so `lower == upper` never divides by zero.
///
/// # Arguments
///
/// * `miss`: The miss count reported by the transpose tester
/// * `lower`: Miss count at which full credit stops
/// * `upper`: Miss count at which credit reaches zero, assumed greater than `lower`
/// * `full_score`: Points awarded at or below `lower`
///
/// returns: f64
///
/// # Examples
///
/// ```
/// use gradelib::score::compute_miss_score;
/// assert_eq!(compute_miss_score(450, 300, 600, 8.0), 4.0);
/// assert_eq!(compute_miss_score(250, 300, 600, 8.0), 8.0);
/// assert_eq!(compute_miss_score(i32::MAX as u64, 2000, 3000, 10.0), 0.0);
/// ```
pub fn compute_miss_score(miss: u64, lower: u64, upper: u64, full_score: f64) -> f64 {
    if miss <= lower {
        return full_score;
    }
    if miss >= upper {
        return 0.0;
    }
    let over = (miss - lower) as f64;
    let range = (upper - lower) as f64;
    round_tenths((1.0 - over / range) * full_score)
}

/// Rounds to one decimal place on the exact binary value, so 9.95 (stored as 9.9499..) gives 9.9
///
/// # Examples
///
/// ```
/// use gradelib::score::round_tenths;
/// assert_eq!(round_tenths(9.95), 9.9);
/// assert_eq!(round_tenths(5.714), 5.7);
/// ```
pub fn round_tenths(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}
