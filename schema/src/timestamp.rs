use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// An absolute instant stored as signed nanoseconds since the Unix epoch.
/// No timezone is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const UNIX_EPOCH: Timestamp = Timestamp(0);

    pub const fn from_unix_nanos(nanos: i64) -> Timestamp {
        Timestamp(nanos)
    }

    pub const fn unix_nanos(self) -> i64 {
        self.0
    }

    pub fn now() -> Timestamp {
        SystemTime::now().into()
    }

    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_nanos(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_nanos(self.0.unsigned_abs())
        }
    }
}

/// Instants outside the `i64` nanosecond range saturate.
impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Timestamp {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp(i64::try_from(after.as_nanos()).unwrap_or(i64::MAX)),
            Err(before) => {
                let nanos = before.duration().as_nanos();
                Timestamp(i64::try_from(nanos).map(|n| -n).unwrap_or(i64::MIN))
            }
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(timestamp: Timestamp) -> SystemTime {
        timestamp.to_system_time()
    }
}

#[test]
fn system_time_round_trip() {
    let later = Timestamp::from_unix_nanos(1_700_000_000_123_456_789);
    assert_eq!(Timestamp::from(later.to_system_time()), later);

    let earlier = Timestamp::from_unix_nanos(-86_400_000_000_001);
    assert_eq!(Timestamp::from(earlier.to_system_time()), earlier);

    assert_eq!(Timestamp::from(UNIX_EPOCH), Timestamp::UNIX_EPOCH);
    assert_eq!(Timestamp::default(), Timestamp::UNIX_EPOCH);
}
