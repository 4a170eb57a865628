/// Running mean of a numeric stream in O(1) memory.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RollingAverage {
    count: u64,
    value: f64,
}

impl RollingAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.count = self.count.saturating_add(1);
        self.value += (value - self.value) / self.count as f64;
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
