/// Threshold table mapping a numeric metric onto a categorical label.
///
/// Tiers are checked in order; the first whose threshold the metric strictly
/// exceeds wins, otherwise `floor` applies. Keep tiers sorted descending.
#[derive(Debug, Clone, Copy)]
pub struct BucketScale {
    pub tiers: &'static [(f64, &'static str)],
    pub floor: &'static str,
}

impl BucketScale {
    pub const fn new(tiers: &'static [(f64, &'static str)], floor: &'static str) -> Self {
        Self { tiers, floor }
    }

    pub fn label(&self, metric: f64) -> &'static str {
        self.tiers
            .iter()
            .find(|(threshold, _)| metric > *threshold)
            .map(|(_, label)| *label)
            .unwrap_or(self.floor)
    }
}
