/// Logical time in milliseconds.
///
/// The host advances the clock explicitly, so deferred work stays
/// deterministic and replayable in tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u64);

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn after(self, delay_ms: u64) -> Self {
        Time(self.0.saturating_add(delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn after_saturates() {
        assert_eq!(Time(10).after(5), Time(15));
        assert_eq!(Time(u64::MAX).after(1), Time(u64::MAX));
    }
}
