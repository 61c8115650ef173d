// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Donor eligibility windows.
//!
//! Two windows are in use and they disagree: donation history screens wait
//! 90 days after a donation, while donor management and export wait four
//! months counted as 30-day months. Both are kept as separate policies until
//! product settles on one.

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::model::Donor;

const DONATION_HISTORY_WINDOW_DAYS: i64 = 90;
const DONOR_EXPORT_WINDOW_MONTHS: i64 = 4;
const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityPolicy {
    DonationHistory,
    DonorExport,
}

impl EligibilityPolicy {
    pub const fn window_days(self) -> i64 {
        match self {
            Self::DonationHistory => DONATION_HISTORY_WINDOW_DAYS,
            Self::DonorExport => DONOR_EXPORT_WINDOW_MONTHS * DAYS_PER_MONTH,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DonationHistory => "90 days",
            Self::DonorExport => "4 months",
        }
    }

    pub fn next_eligible_date(self, last_donation: Date) -> Option<Date> {
        last_donation.checked_add(Duration::days(self.window_days()))
    }

    /// A donor who never donated is eligible.
    pub fn is_eligible(self, last_donation: Option<Date>, today: Date) -> bool {
        self.days_remaining(last_donation, today) == 0
    }

    pub fn days_remaining(self, last_donation: Option<Date>, today: Date) -> i64 {
        let Some(last_donation) = last_donation else {
            return 0;
        };
        let elapsed = (today - last_donation).whole_days();
        (self.window_days() - elapsed).max(0)
    }

    pub fn eligible_donors<'a>(
        self,
        donors: &'a [Donor],
        today: Date,
    ) -> impl Iterator<Item = &'a Donor> + 'a {
        donors
            .iter()
            .filter(move |donor| self.is_eligible(donor.last_donation, today))
    }
}
