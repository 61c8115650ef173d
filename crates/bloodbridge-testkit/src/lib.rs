// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use bloodbridge_app::{
    BloodGroup, BloodRequest, Donation, DonationId, Donor, DonorId, Hospital, HospitalId,
    Inventory, RequestId, RequestStatus,
};
use std::path::PathBuf;
use time::macros::date;
use time::{Date, Duration};

/// Fixed "today" for generated data so eligibility checks are reproducible.
pub const REFERENCE_DATE: Date = date!(2026 - 06 - 01);

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const CITIES: [&str; 10] = [
    "Austin",
    "Seattle",
    "Denver",
    "Madison",
    "Raleigh",
    "Portland",
    "Boise",
    "Phoenix",
    "Nashville",
    "Omaha",
];

const HOSPITAL_PREFIXES: [&str; 8] = [
    "Mercy",
    "St. Luke's",
    "Northview",
    "Lakeside",
    "Summit",
    "Riverside",
    "Hillcrest",
    "Valley",
];
const HOSPITAL_SUFFIXES: [&str; 4] = [
    "General Hospital",
    "Medical Center",
    "Clinic",
    "Children's Hospital",
];

const REQUEST_REASONS: [&str; 8] = [
    "scheduled surgery",
    "trauma",
    "anemia",
    "childbirth complication",
    "chemotherapy support",
    "burn treatment",
    "dialysis",
    "organ transplant",
];

const DONATION_SITES: [&str; 6] = [
    "Red Cross camp",
    "City blood bank",
    "University drive",
    "Community center",
    "Mobile van",
    "Hospital ward",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoData {
    pub donors: Vec<Donor>,
    pub hospitals: Vec<Hospital>,
    pub requests: Vec<BloodRequest>,
    pub donations: Vec<Donation>,
}

impl DemoData {
    pub fn inventory(&self) -> Inventory {
        Inventory::tally(&self.donations, &self.requests)
    }
}

/// Seeded generator for donors, hospitals, requests, and donations. Ids are
/// assigned sequentially per entity starting at 1.
#[derive(Debug, Clone)]
pub struct BloodFaker {
    rng: DeterministicRng,
    seed: u64,
    donor_seq: i64,
    hospital_seq: i64,
    request_seq: i64,
    donation_seq: i64,
}

impl BloodFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            donor_seq: 0,
            hospital_seq: 0,
            request_seq: 0,
            donation_seq: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn donor(&mut self) -> Donor {
        self.donor_seq += 1;
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let last_donation = if self.rng.int_n(4) == 0 {
            None
        } else {
            Some(self.date_within(200))
        };
        Donor {
            id: DonorId::new(self.donor_seq),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}{}@example.org",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase(),
                self.donor_seq
            ),
            phone: self.phone(),
            blood_group: self.blood_group(),
            age: self.int_range(18, 65) as u8,
            city: self.pick(&CITIES).to_owned(),
            last_donation,
        }
    }

    pub fn hospital(&mut self) -> Hospital {
        self.hospital_seq += 1;
        let name = format!(
            "{} {}",
            self.pick(&HOSPITAL_PREFIXES),
            self.pick(&HOSPITAL_SUFFIXES)
        );
        let slug: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        Hospital {
            id: HospitalId::new(self.hospital_seq),
            email: format!("desk{}@{slug}.org", self.hospital_seq),
            name,
            phone: self.phone(),
            city: self.pick(&CITIES).to_owned(),
            contact_person: self.person_name(),
        }
    }

    pub fn blood_request(&mut self, hospital: &Hospital) -> BloodRequest {
        self.request_seq += 1;
        BloodRequest {
            id: RequestId::new(self.request_seq),
            hospital_id: hospital.id,
            hospital_name: hospital.name.clone(),
            patient_name: self.person_name(),
            blood_group: self.blood_group(),
            units: self.int_range(1, 4),
            reason: self.pick(&REQUEST_REASONS).to_owned(),
            requested_on: self.date_within(60),
            status: self.status(),
        }
    }

    pub fn donation(&mut self, donor: &Donor) -> Donation {
        self.donation_seq += 1;
        Donation {
            id: DonationId::new(self.donation_seq),
            donor_id: donor.id,
            donor_name: donor.name.clone(),
            blood_group: donor.blood_group,
            units: self.int_range(1, 2),
            location: self.pick(&DONATION_SITES).to_owned(),
            donated_on: self.date_within(180),
            status: self.status(),
        }
    }

    /// A connected dataset: every request names a generated hospital and every
    /// donation names a generated donor.
    pub fn dataset(&mut self, donors: usize, hospitals: usize) -> DemoData {
        let donors: Vec<Donor> = (0..donors).map(|_| self.donor()).collect();
        let hospitals: Vec<Hospital> = (0..hospitals).map(|_| self.hospital()).collect();

        let mut requests = Vec::new();
        for hospital in &hospitals {
            for _ in 0..self.int_range(1, 4) {
                requests.push(self.blood_request(hospital));
            }
        }

        let mut donations = Vec::new();
        for donor in &donors {
            for _ in 0..self.int_range(0, 2) {
                donations.push(self.donation(donor));
            }
        }

        DemoData {
            donors,
            hospitals,
            requests,
            donations,
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = u64::from(max - min) + 1;
        min + (self.rng.next_u64() % span) as u32
    }

    fn blood_group(&mut self) -> BloodGroup {
        BloodGroup::ALL[self.rng.int_n(BloodGroup::ALL.len())]
    }

    fn status(&mut self) -> RequestStatus {
        match self.rng.int_n(4) {
            0 | 1 => RequestStatus::Pending,
            2 => RequestStatus::Accepted,
            _ => RequestStatus::Declined,
        }
    }

    fn person_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    fn phone(&mut self) -> String {
        format!(
            "(555) {:03}-{:04}",
            self.int_range(100, 999),
            self.int_range(0, 9999)
        )
    }

    fn date_within(&mut self, max_days_back: u32) -> Date {
        let back = self.int_range(0, max_days_back);
        REFERENCE_DATE
            .checked_sub(Duration::days(i64::from(back)))
            .unwrap_or(REFERENCE_DATE)
    }
}

pub fn demo_data() -> DemoData {
    BloodFaker::new(7).dataset(24, 6)
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let config_path = dir.path().join("config.toml");
    Ok((dir, config_path))
}
