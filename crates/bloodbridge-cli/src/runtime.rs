// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use bloodbridge_api::{Client, Resource};
use bloodbridge_app::{
    BloodGroup, BloodRequest, Decision, Donation, DonationId, Donor, DonorId, FormPayload,
    Hospital, HospitalId, Inventory, RequestId, RequestStatus, ScreenKind,
};
use bloodbridge_testkit::{DemoData, REFERENCE_DATE};
use time::Date;

/// One-shot changes made from the command line.
pub trait Submitter {
    /// Submits an already validated form and describes what was created.
    fn submit(&mut self, payload: &FormPayload) -> Result<String>;
    fn remove(&mut self, screen: ScreenKind, id: i64) -> Result<()>;
}

/// Lists backed by the REST service.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl bloodbridge_tui::ListRuntime for ApiRuntime {
    fn load_donors(&mut self) -> Result<Vec<Donor>> {
        self.client.list(Resource::Donors)
    }

    fn load_hospitals(&mut self) -> Result<Vec<Hospital>> {
        self.client.list(Resource::Hospitals)
    }

    fn load_requests(&mut self) -> Result<Vec<BloodRequest>> {
        self.client.list(Resource::Requests)
    }

    fn load_donations(&mut self) -> Result<Vec<Donation>> {
        self.client.list(Resource::Donations)
    }

    fn load_inventory(&mut self) -> Result<Inventory> {
        self.client.inventory()
    }

    fn decide_request(&mut self, id: RequestId, decision: Decision) -> Result<()> {
        self.client.decide_request(id, decision)
    }
}

impl Submitter for ApiRuntime {
    fn submit(&mut self, payload: &FormPayload) -> Result<String> {
        match payload {
            FormPayload::Login(_) => Err(login_not_submittable()),
            FormPayload::DonorRegistration(form) => {
                let donor: Donor = self.client.create(Resource::Donors, &**form)?;
                Ok(format!("registered donor {} ({})", donor.id, donor.name))
            }
            FormPayload::HospitalRegistration(form) => {
                let hospital: Hospital = self.client.create(Resource::Hospitals, form)?;
                Ok(format!("registered hospital {} ({})", hospital.id, hospital.name))
            }
            FormPayload::BloodRequest(form) => {
                let request: BloodRequest = self.client.create(Resource::Requests, form)?;
                Ok(format!("created request {} for {}", request.id, request.patient_name))
            }
            FormPayload::Donation(form) => {
                let donation: Donation = self.client.create(Resource::Donations, form)?;
                Ok(format!("recorded donation {}", donation.id))
            }
        }
    }

    fn remove(&mut self, screen: ScreenKind, id: i64) -> Result<()> {
        let resource = match Resource::for_screen(screen) {
            Some(Resource::Inventory) | None => bail!(
                "{} entries cannot be deleted; use donors, hospitals, requests, or donations",
                screen.label()
            ),
            Some(resource) => resource,
        };
        self.client.delete(resource, id)
    }
}

/// In-memory lists seeded from the testkit faker. Decisions update the local
/// stock the same way the service would.
pub struct DemoRuntime {
    data: DemoData,
    inventory: Inventory,
}

impl DemoRuntime {
    pub fn new(data: DemoData) -> Self {
        let inventory = data.inventory();
        Self { data, inventory }
    }
}

impl bloodbridge_tui::ListRuntime for DemoRuntime {
    fn load_donors(&mut self) -> Result<Vec<Donor>> {
        Ok(self.data.donors.clone())
    }

    fn load_hospitals(&mut self) -> Result<Vec<Hospital>> {
        Ok(self.data.hospitals.clone())
    }

    fn load_requests(&mut self) -> Result<Vec<BloodRequest>> {
        Ok(self.data.requests.clone())
    }

    fn load_donations(&mut self) -> Result<Vec<Donation>> {
        Ok(self.data.donations.clone())
    }

    fn load_inventory(&mut self) -> Result<Inventory> {
        Ok(self.inventory.clone())
    }

    fn decide_request(&mut self, id: RequestId, decision: Decision) -> Result<()> {
        let request = self
            .data
            .requests
            .iter_mut()
            .find(|request| request.id == id)
            .ok_or_else(|| anyhow!("request {id} not found -- reload with ctrl+r"))?;
        self.inventory.fulfil_request(request, decision)
    }

    fn today(&self) -> Date {
        REFERENCE_DATE
    }
}

impl Submitter for DemoRuntime {
    fn submit(&mut self, payload: &FormPayload) -> Result<String> {
        let data = &mut self.data;
        match payload {
            FormPayload::Login(_) => Err(login_not_submittable()),
            FormPayload::DonorRegistration(form) => {
                let id = DonorId::new(next_id(data.donors.iter().map(|d| d.id.get())));
                data.donors.push(Donor {
                    id,
                    name: form.name.trim().to_owned(),
                    email: form.email.trim().to_owned(),
                    phone: form.phone.clone(),
                    blood_group: required_group(form.blood_group)?,
                    age: form.age,
                    city: form.city.trim().to_owned(),
                    last_donation: form.last_donation,
                });
                Ok(format!("registered donor {id} ({})", form.name.trim()))
            }
            FormPayload::HospitalRegistration(form) => {
                let id = HospitalId::new(next_id(data.hospitals.iter().map(|h| h.id.get())));
                data.hospitals.push(Hospital {
                    id,
                    name: form.name.trim().to_owned(),
                    email: form.email.trim().to_owned(),
                    phone: form.phone.clone(),
                    city: form.city.trim().to_owned(),
                    contact_person: form.contact_person.trim().to_owned(),
                });
                Ok(format!("registered hospital {id} ({})", form.name.trim()))
            }
            FormPayload::BloodRequest(form) => {
                let hospital = data
                    .hospitals
                    .first()
                    .ok_or_else(|| anyhow!("no hospital to file the request under"))?;
                let id = RequestId::new(next_id(data.requests.iter().map(|r| r.id.get())));
                let request = BloodRequest {
                    id,
                    hospital_id: hospital.id,
                    hospital_name: hospital.name.clone(),
                    patient_name: form.patient_name.trim().to_owned(),
                    blood_group: required_group(form.blood_group)?,
                    units: form.units,
                    reason: form.reason.trim().to_owned(),
                    requested_on: REFERENCE_DATE,
                    status: RequestStatus::Pending,
                };
                data.requests.push(request);
                Ok(format!("created request {id} for {}", form.patient_name.trim()))
            }
            FormPayload::Donation(form) => {
                let group = required_group(form.blood_group)?;
                let donor = data
                    .donors
                    .iter()
                    .find(|donor| donor.blood_group == group)
                    .ok_or_else(|| anyhow!("no donor with blood group {}", group.as_str()))?;
                let id = DonationId::new(next_id(data.donations.iter().map(|d| d.id.get())));
                let donation = Donation {
                    id,
                    donor_id: donor.id,
                    donor_name: donor.name.clone(),
                    blood_group: group,
                    units: form.units,
                    location: form.location.trim().to_owned(),
                    donated_on: form.donated_on.unwrap_or(REFERENCE_DATE),
                    status: RequestStatus::Pending,
                };
                data.donations.push(donation);
                Ok(format!("recorded donation {id}"))
            }
        }
    }

    fn remove(&mut self, screen: ScreenKind, id: i64) -> Result<()> {
        let data = &mut self.data;
        let removed = match screen {
            ScreenKind::Donors => remove_by_id(&mut data.donors, |row| row.id.get() == id),
            ScreenKind::Hospitals => remove_by_id(&mut data.hospitals, |row| row.id.get() == id),
            ScreenKind::Requests => remove_by_id(&mut data.requests, |row| row.id.get() == id),
            ScreenKind::Donations => remove_by_id(&mut data.donations, |row| row.id.get() == id),
            ScreenKind::Dashboard | ScreenKind::Inventory => bail!(
                "{} entries cannot be deleted; use donors, hospitals, requests, or donations",
                screen.label()
            ),
        };
        if !removed {
            bail!(
                "{} entry {id} not found -- check the id and retry",
                screen.label()
            );
        }
        Ok(())
    }
}

fn login_not_submittable() -> anyhow::Error {
    anyhow!("login is not a submission -- set BLOODBRIDGE_EMAIL and BLOODBRIDGE_PASSWORD instead")
}

fn required_group(group: Option<BloodGroup>) -> Result<BloodGroup> {
    group.ok_or_else(|| anyhow!("blood group is required -- choose a blood group and retry"))
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

fn remove_by_id<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|row| !matches(row));
    rows.len() != before
}

#[cfg(test)]
mod tests {
    use super::{DemoRuntime, Submitter};
    use anyhow::Result;
    use bloodbridge_app::{Decision, FormKind, FormPayload, RequestStatus, ScreenKind};
    use bloodbridge_testkit::{BloodFaker, demo_data};
    use bloodbridge_tui::ListRuntime;

    fn filled(kind: FormKind, fields: &[(&str, &str)]) -> Result<FormPayload> {
        let mut payload = FormPayload::blank_for(kind);
        for (name, value) in fields {
            payload.set_field(name, value)?;
        }
        payload.validate()?;
        Ok(payload)
    }

    #[test]
    fn demo_runtime_serves_seeded_lists() -> Result<()> {
        let data = demo_data();
        let donors = data.donors.len();
        let mut runtime = DemoRuntime::new(data);
        assert_eq!(runtime.load_donors()?.len(), donors);
        assert!(!runtime.load_hospitals()?.is_empty());
        Ok(())
    }

    #[test]
    fn declining_updates_request_without_touching_stock() -> Result<()> {
        let mut data = BloodFaker::new(4).dataset(6, 2);
        data.requests[0].status = RequestStatus::Pending;
        let id = data.requests[0].id;
        let mut runtime = DemoRuntime::new(data);
        let before = runtime.load_inventory()?;

        runtime.decide_request(id, Decision::Decline)?;
        let requests = runtime.load_requests()?;
        assert_eq!(requests[0].status, RequestStatus::Declined);
        assert_eq!(runtime.load_inventory()?, before);

        let error = runtime
            .decide_request(id, Decision::Accept)
            .expect_err("already declined");
        assert!(error.to_string().contains("already declined"));
        Ok(())
    }

    #[test]
    fn accepting_without_stock_keeps_request_pending() -> Result<()> {
        let mut data = BloodFaker::new(4).dataset(0, 1);
        data.requests[0].status = RequestStatus::Pending;
        let id = data.requests[0].id;
        let mut runtime = DemoRuntime::new(data);

        let error = runtime
            .decide_request(id, Decision::Accept)
            .expect_err("no stock");
        assert!(error.to_string().contains("insufficient"));
        assert_eq!(runtime.load_requests()?[0].status, RequestStatus::Pending);
        Ok(())
    }

    #[test]
    fn unknown_request_is_reported() {
        let mut runtime = DemoRuntime::new(demo_data());
        let error = runtime
            .decide_request(bloodbridge_app::RequestId::new(9_999), Decision::Accept)
            .expect_err("missing request");
        assert!(error.to_string().contains("not found"));
    }

    #[test]
    fn demo_request_submission_appends_pending_request() -> Result<()> {
        let data = BloodFaker::new(5).dataset(4, 2);
        let last_id = data.requests.iter().map(|r| r.id.get()).max().unwrap_or(0);
        let hospital = data.hospitals[0].name.clone();
        let mut runtime = DemoRuntime::new(data);

        let payload = filled(
            FormKind::BloodRequest,
            &[
                ("patient_name", "Elliot Gray"),
                ("blood_group", "A-"),
                ("units", "2"),
                ("reason", "surgery"),
            ],
        )?;
        let message = runtime.submit(&payload)?;
        assert_eq!(message, format!("created request {} for Elliot Gray", last_id + 1));

        let requests = runtime.load_requests()?;
        let created = requests.last().expect("submitted request");
        assert_eq!(created.id.get(), last_id + 1);
        assert_eq!(created.status, RequestStatus::Pending);
        assert_eq!(created.hospital_name, hospital);
        Ok(())
    }

    #[test]
    fn demo_donor_registration_is_listed() -> Result<()> {
        let mut runtime = DemoRuntime::new(BloodFaker::new(6).dataset(3, 1));
        let payload = filled(
            FormKind::DonorRegistration,
            &[
                ("name", "Parker Young"),
                ("email", "parker@example.org"),
                ("phone", "555 010 9999"),
                ("password", "secret1"),
                ("confirm_password", "secret1"),
                ("blood_group", "ab+"),
                ("age", "31"),
                ("city", "Omaha"),
            ],
        )?;
        assert_eq!(runtime.submit(&payload)?, "registered donor 4 (Parker Young)");
        let donors = runtime.load_donors()?;
        assert_eq!(donors.len(), 4);
        assert_eq!(donors[3].email, "parker@example.org");
        assert_eq!(donors[3].last_donation, None);
        Ok(())
    }

    #[test]
    fn login_is_not_submitted() {
        let mut runtime = DemoRuntime::new(demo_data());
        let error = runtime
            .submit(&FormPayload::blank_for(FormKind::Login))
            .expect_err("login has no submission");
        assert!(error.to_string().contains("BLOODBRIDGE_EMAIL"));
    }

    #[test]
    fn demo_remove_deletes_by_id() -> Result<()> {
        let mut runtime = DemoRuntime::new(BloodFaker::new(8).dataset(3, 2));
        runtime.remove(ScreenKind::Hospitals, 2)?;
        let hospitals = runtime.load_hospitals()?;
        assert_eq!(hospitals.len(), 1);
        assert_eq!(hospitals[0].id.get(), 1);

        let error = runtime
            .remove(ScreenKind::Hospitals, 2)
            .expect_err("already removed");
        assert!(error.to_string().contains("hospitals entry 2 not found"));

        let error = runtime
            .remove(ScreenKind::Inventory, 1)
            .expect_err("inventory rows are derived");
        assert!(error.to_string().contains("cannot be deleted"));
        Ok(())
    }
}
