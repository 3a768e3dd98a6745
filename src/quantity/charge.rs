use crate::quantity::ratios::Percentage;

quantity!(AmpHours, via: f64, suffix: "Ah", precision: 1);

impl AmpHours {
    /// Express the charge as a percentage of the `capacity`.
    pub fn percentage_of(self, capacity: Self) -> Percentage {
        Percentage::from_ratio(self / capacity)
    }
}
