// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar-derived ledger keys.

use chrono::{DateTime, Utc};
use freeloader_core::BudgetPeriod;

/// Daily (`YYYY-MM-DD`) and monthly (`YYYY-MM`) keys taken from the same
/// UTC instant, so both windows always agree about which period an event
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodKeys {
    pub daily: String,
    pub monthly: String,
}

impl PeriodKeys {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            daily: timestamp.format("%Y-%m-%d").to_string(),
            monthly: timestamp.format("%Y-%m").to_string(),
        }
    }

    pub fn key(&self, period: BudgetPeriod) -> &str {
        match period {
            BudgetPeriod::Daily => &self.daily,
            BudgetPeriod::Monthly => &self.monthly,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn keys_share_one_instant() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let keys = PeriodKeys::at(ts);
        assert_eq!(keys.daily, "2026-01-31");
        assert_eq!(keys.monthly, "2026-01");
        assert_eq!(keys.key(BudgetPeriod::Daily), "2026-01-31");
        assert_eq!(keys.key(BudgetPeriod::Monthly), "2026-01");
    }

    #[test]
    fn keys_are_zero_padded() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(PeriodKeys::at(ts).daily, "2026-03-04");
    }
}
