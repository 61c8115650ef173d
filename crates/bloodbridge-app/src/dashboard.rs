// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;
use crate::model::{BloodGroup, BloodRequest, Donation, Donor, Hospital, RequestStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardCounts {
    pub donors: usize,
    pub hospitals: usize,
    pub donations: usize,
    pub pending_requests: usize,
    pub accepted_requests: usize,
    pub declined_requests: usize,
    pub total_units: u64,
}

impl DashboardCounts {
    pub fn from_lists(
        donors: &[Donor],
        hospitals: &[Hospital],
        donations: &[Donation],
        requests: &[BloodRequest],
        inventory: &Inventory,
    ) -> Self {
        let count_status = |status: RequestStatus| {
            requests
                .iter()
                .filter(|request| request.status == status)
                .count()
        };
        Self {
            donors: donors.len(),
            hospitals: hospitals.len(),
            donations: donations.len(),
            pending_requests: count_status(RequestStatus::Pending),
            accepted_requests: count_status(RequestStatus::Accepted),
            declined_requests: count_status(RequestStatus::Declined),
            total_units: inventory.total(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub group: BloodGroup,
    pub units: u32,
    pub start_degrees: f64,
    pub sweep_degrees: f64,
}

impl PieSlice {
    pub fn end_degrees(&self) -> f64 {
        self.start_degrees + self.sweep_degrees
    }

    pub fn percent(&self) -> f64 {
        self.sweep_degrees / 360.0 * 100.0
    }
}

/// Stock share per blood group as pie slices, skipping empty groups. The last
/// slice closes the circle so rounding never leaves a gap.
pub fn pie_slices(inventory: &Inventory) -> Vec<PieSlice> {
    let total = inventory.total();
    if total == 0 {
        return Vec::new();
    }

    let stocked: Vec<(BloodGroup, u32)> = BloodGroup::ALL
        .into_iter()
        .map(|group| (group, inventory.get(group)))
        .filter(|(_, units)| *units > 0)
        .collect();

    let mut slices = Vec::with_capacity(stocked.len());
    let mut start = 0.0;
    for (position, (group, units)) in stocked.iter().copied().enumerate() {
        let sweep = if position + 1 == stocked.len() {
            360.0 - start
        } else {
            f64::from(units) / total as f64 * 360.0
        };
        slices.push(PieSlice {
            group,
            units,
            start_degrees: start,
            sweep_degrees: sweep,
        });
        start += sweep;
    }
    slices
}
