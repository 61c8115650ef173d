// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::list::ListRow;
use crate::model::{BloodGroup, BloodRequest, Donation, RequestStatus};
use crate::requests::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub blood_group: BloodGroup,
    pub units: u32,
}

impl InventoryEntry {
    pub const COLUMNS: [&'static str; 2] = ["Blood group", "Units"];
}

impl ListRow for InventoryEntry {
    fn cells(&self) -> Vec<String> {
        vec![self.blood_group.as_str().to_owned(), self.units.to_string()]
    }
}

/// Units in stock for every blood group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<InventoryEntry>", into = "Vec<InventoryEntry>")]
pub struct Inventory {
    units: [u32; BloodGroup::ALL.len()],
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted donations minus accepted requests. Requests that were served
    /// from stock predating the donation list floor at zero.
    pub fn tally<'a>(
        donations: impl IntoIterator<Item = &'a Donation>,
        requests: impl IntoIterator<Item = &'a BloodRequest>,
    ) -> Self {
        let mut inventory = Self::new();
        for donation in donations {
            if donation.status == RequestStatus::Accepted {
                let slot = &mut inventory.units[donation.blood_group.index()];
                *slot = slot.saturating_add(donation.units);
            }
        }
        for request in requests {
            if request.status == RequestStatus::Accepted {
                let slot = &mut inventory.units[request.blood_group.index()];
                *slot = slot.saturating_sub(request.units);
            }
        }
        inventory
    }

    pub fn get(&self, group: BloodGroup) -> u32 {
        self.units[group.index()]
    }

    pub fn total(&self) -> u64 {
        self.units.iter().map(|units| u64::from(*units)).sum()
    }

    pub fn entries(&self) -> Vec<InventoryEntry> {
        BloodGroup::ALL
            .into_iter()
            .map(|blood_group| InventoryEntry {
                blood_group,
                units: self.get(blood_group),
            })
            .collect()
    }

    pub fn add(&mut self, group: BloodGroup, units: u32) -> Result<()> {
        if units == 0 {
            bail!("units must be positive -- enter at least 1 unit and retry");
        }
        let slot = &mut self.units[group.index()];
        *slot = slot
            .checked_add(units)
            .ok_or_else(|| anyhow!("{} stock would overflow", group.as_str()))?;
        Ok(())
    }

    pub fn withdraw(&mut self, group: BloodGroup, units: u32) -> Result<()> {
        if units == 0 {
            bail!("units must be positive -- enter at least 1 unit and retry");
        }
        let available = self.get(group);
        if available < units {
            bail!(
                "insufficient {} stock: requested {units} units, {available} available",
                group.as_str()
            );
        }
        self.units[group.index()] = available - units;
        Ok(())
    }

    /// Decides a hospital request. Accepting draws the units from stock; when
    /// stock is short the request stays pending and nothing changes.
    pub fn fulfil_request(&mut self, request: &mut BloodRequest, decision: Decision) -> Result<()> {
        let next = request.status.apply(decision)?;
        if decision == Decision::Accept {
            self.withdraw(request.blood_group, request.units)?;
        }
        request.status = next;
        Ok(())
    }

    /// Decides a donor's donation. Accepting adds the units to stock.
    pub fn record_donation(&mut self, donation: &mut Donation, decision: Decision) -> Result<()> {
        let next = donation.status.apply(decision)?;
        if decision == Decision::Accept {
            self.add(donation.blood_group, donation.units)?;
        }
        donation.status = next;
        Ok(())
    }
}

impl From<Vec<InventoryEntry>> for Inventory {
    fn from(entries: Vec<InventoryEntry>) -> Self {
        let mut inventory = Self::new();
        for entry in entries {
            inventory.units[entry.blood_group.index()] = entry.units;
        }
        inventory
    }
}

impl From<Inventory> for Vec<InventoryEntry> {
    fn from(inventory: Inventory) -> Self {
        inventory.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::{Inventory, InventoryEntry};
    use crate::ids::{DonationId, DonorId, HospitalId, RequestId};
    use crate::model::{BloodGroup, BloodRequest, Donation, RequestStatus};
    use crate::requests::Decision;
    use anyhow::Result;
    use time::{Date, Month};

    fn day() -> Date {
        Date::from_calendar_date(2026, Month::April, 12).expect("valid date")
    }

    fn request(group: BloodGroup, units: u32) -> BloodRequest {
        BloodRequest {
            id: RequestId::new(1),
            hospital_id: HospitalId::new(1),
            hospital_name: "City General".to_owned(),
            patient_name: "Robin Foster".to_owned(),
            blood_group: group,
            units,
            reason: "trauma".to_owned(),
            requested_on: day(),
            status: RequestStatus::Pending,
        }
    }

    fn donation(group: BloodGroup, units: u32, status: RequestStatus) -> Donation {
        Donation {
            id: DonationId::new(1),
            donor_id: DonorId::new(1),
            donor_name: "Casey Lopez".to_owned(),
            blood_group: group,
            units,
            location: "Camp".to_owned(),
            donated_on: day(),
            status,
        }
    }

    #[test]
    fn add_and_withdraw_track_per_group_counts() -> Result<()> {
        let mut inventory = Inventory::new();
        inventory.add(BloodGroup::OPositive, 5)?;
        inventory.add(BloodGroup::ANegative, 2)?;
        inventory.withdraw(BloodGroup::OPositive, 3)?;
        assert_eq!(inventory.get(BloodGroup::OPositive), 2);
        assert_eq!(inventory.get(BloodGroup::ANegative), 2);
        assert_eq!(inventory.total(), 4);
        Ok(())
    }

    #[test]
    fn withdraw_rejects_insufficient_stock() -> Result<()> {
        let mut inventory = Inventory::new();
        inventory.add(BloodGroup::BPositive, 1)?;
        let error = inventory
            .withdraw(BloodGroup::BPositive, 2)
            .expect_err("not enough stock");
        assert!(error.to_string().contains("insufficient B+ stock"));
        assert_eq!(inventory.get(BloodGroup::BPositive), 1);
        assert!(inventory.add(BloodGroup::BPositive, 0).is_err());
        Ok(())
    }

    #[test]
    fn accepting_request_consumes_stock() -> Result<()> {
        let mut inventory = Inventory::new();
        inventory.add(BloodGroup::AbPositive, 4)?;
        let mut pending = request(BloodGroup::AbPositive, 3);
        inventory.fulfil_request(&mut pending, Decision::Accept)?;
        assert_eq!(pending.status, RequestStatus::Accepted);
        assert_eq!(inventory.get(BloodGroup::AbPositive), 1);
        Ok(())
    }

    #[test]
    fn short_stock_leaves_request_pending() {
        let mut inventory = Inventory::new();
        let mut pending = request(BloodGroup::ONegative, 2);
        assert!(
            inventory
                .fulfil_request(&mut pending, Decision::Accept)
                .is_err()
        );
        assert_eq!(pending.status, RequestStatus::Pending);
        assert_eq!(inventory.total(), 0);
    }

    #[test]
    fn declining_request_keeps_stock() -> Result<()> {
        let mut inventory = Inventory::new();
        let mut pending = request(BloodGroup::ONegative, 2);
        inventory.fulfil_request(&mut pending, Decision::Decline)?;
        assert_eq!(pending.status, RequestStatus::Declined);
        assert!(
            inventory
                .fulfil_request(&mut pending, Decision::Accept)
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn accepted_donation_adds_stock() -> Result<()> {
        let mut inventory = Inventory::new();
        let mut entry = donation(BloodGroup::BNegative, 1, RequestStatus::Pending);
        inventory.record_donation(&mut entry, Decision::Accept)?;
        assert_eq!(entry.status, RequestStatus::Accepted);
        assert_eq!(inventory.get(BloodGroup::BNegative), 1);
        Ok(())
    }

    #[test]
    fn tally_counts_only_accepted_entries() {
        let donations = vec![
            donation(BloodGroup::APositive, 3, RequestStatus::Accepted),
            donation(BloodGroup::APositive, 2, RequestStatus::Pending),
            donation(BloodGroup::OPositive, 1, RequestStatus::Accepted),
        ];
        let mut served = request(BloodGroup::APositive, 1);
        served.status = RequestStatus::Accepted;
        let mut over = request(BloodGroup::OPositive, 5);
        over.status = RequestStatus::Accepted;

        let inventory = Inventory::tally(&donations, &[served, over]);
        assert_eq!(inventory.get(BloodGroup::APositive), 2);
        assert_eq!(inventory.get(BloodGroup::OPositive), 0);
    }

    #[test]
    fn serializes_as_entry_list() -> Result<()> {
        let mut inventory = Inventory::new();
        inventory.add(BloodGroup::OPositive, 7)?;
        let json = serde_json::to_value(&inventory)?;
        let entries = json.as_array().expect("entry list");
        assert_eq!(entries.len(), BloodGroup::ALL.len());
        assert_eq!(entries[6]["bloodGroup"], "O+");
        assert_eq!(entries[6]["units"], 7);

        let parsed: Inventory =
            serde_json::from_str(r#"[{"bloodGroup":"AB-","units":4}]"#)?;
        assert_eq!(parsed.get(BloodGroup::AbNegative), 4);
        assert_eq!(parsed.total(), 4);

        let listed: Vec<InventoryEntry> = parsed.entries();
        assert_eq!(listed[5].units, 4);
        Ok(())
    }
}
