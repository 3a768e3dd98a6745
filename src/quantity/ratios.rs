quantity!(Percentage, via: f64, suffix: "%", precision: 1);

impl Percentage {
    pub const HUNDRED: Self = Self(100.0);

    /// Convert `0.0..=1.0` into the percentage.
    pub const fn from_ratio(ratio: f64) -> Self {
        Self(ratio * 100.0)
    }

    /// Share of `count` items in `total`, `None` when there is nothing to share.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn of_count(count: usize, total: usize) -> Option<Self> {
        (total != 0).then(|| Self::from_ratio(count as f64 / total as f64))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_of_count() {
        assert_abs_diff_eq!(Percentage::of_count(1, 2).unwrap().0, 50.0);
        assert_abs_diff_eq!(Percentage::of_count(3, 3).unwrap().0, 100.0);
        assert!(Percentage::of_count(0, 0).is_none());
    }
}
