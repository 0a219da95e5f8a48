use std::time::SystemTime;

use bittrickle_primitives::DurationSinceUnixEpoch;

use crate::clock;

/// Marker type for the production clock that follows the system time.
#[allow(clippy::module_name_repetitions)]
pub struct WorkingClock;

impl clock::Time for clock::Working {
    fn now() -> DurationSinceUnixEpoch {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("the system time should be set after the Unix Epoch")
    }
}
