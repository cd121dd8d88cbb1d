//! Default per-engine poll intervals (spec.md §4.9). Safety nets, not the
//! primary driver - the wake chain is what keeps end-to-end latency low.

use std::time::Duration;

pub const SCANNER_DEFAULT: Duration = Duration::from_secs(3600);
pub const COLLECTOR_DEFAULT: Duration = Duration::from_secs(600);
pub const CLASSIFIER_DEFAULT: Duration = Duration::from_secs(60);
pub const ANALYZER_DEFAULT: Duration = Duration::from_secs(60);
pub const IMPACT_DEFAULT: Duration = Duration::from_secs(60);
pub const REACHABILITY_DEFAULT: Duration = Duration::from_secs(120);
pub const NOTIFICATION_DEFAULT: Duration = Duration::from_secs(60);
