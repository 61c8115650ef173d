// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;
use crate::list::{ListRow, format_date};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == normalized)
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Hospital,
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Hospital => "hospital",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "donor" => Some(Self::Donor),
            "hospital" => Some(Self::Hospital),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Declined => "Declined",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenKind {
    Dashboard,
    Donors,
    Hospitals,
    Requests,
    Donations,
    Inventory,
}

impl ScreenKind {
    pub const ALL: [Self; 6] = [
        Self::Dashboard,
        Self::Donors,
        Self::Hospitals,
        Self::Requests,
        Self::Donations,
        Self::Inventory,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Donors => "donors",
            Self::Hospitals => "hospitals",
            Self::Requests => "requests",
            Self::Donations => "donations",
            Self::Inventory => "inventory",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|screen| screen.label() == value)
    }

    /// Screens reachable for a signed-in role, in navigation order.
    pub const fn for_role(role: Role) -> &'static [Self] {
        match role {
            Role::Admin => &Self::ALL,
            Role::Hospital => &[Self::Dashboard, Self::Requests, Self::Inventory],
            Role::Donor => &[Self::Dashboard, Self::Donations],
        }
    }

    pub const fn is_list(self) -> bool {
        !matches!(self, Self::Dashboard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: DonorId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub age: u8,
    pub city: String,
    #[serde(with = "iso_date::option", default)]
    pub last_donation: Option<Date>,
}

impl Donor {
    pub const COLUMNS: [&'static str; 7] = [
        "Name",
        "Email",
        "Phone",
        "Blood group",
        "Age",
        "City",
        "Last donation",
    ];
}

impl ListRow for Donor {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.blood_group.as_str().to_owned(),
            self.age.to_string(),
            self.city.clone(),
            self.last_donation.map(format_date).unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub contact_person: String,
}

impl Hospital {
    pub const COLUMNS: [&'static str; 5] = ["Name", "Email", "Phone", "City", "Contact"];
}

impl ListRow for Hospital {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.city.clone(),
            self.contact_person.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: RequestId,
    pub hospital_id: HospitalId,
    pub hospital_name: String,
    pub patient_name: String,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub reason: String,
    #[serde(with = "iso_date")]
    pub requested_on: Date,
    pub status: RequestStatus,
}

impl BloodRequest {
    pub const COLUMNS: [&'static str; 7] = [
        "Hospital",
        "Patient",
        "Blood group",
        "Units",
        "Reason",
        "Requested",
        "Status",
    ];
}

impl ListRow for BloodRequest {
    fn cells(&self) -> Vec<String> {
        vec![
            self.hospital_name.clone(),
            self.patient_name.clone(),
            self.blood_group.as_str().to_owned(),
            self.units.to_string(),
            self.reason.clone(),
            format_date(self.requested_on),
            self.status.as_str().to_owned(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: DonationId,
    pub donor_id: DonorId,
    pub donor_name: String,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub location: String,
    #[serde(with = "iso_date")]
    pub donated_on: Date,
    pub status: RequestStatus,
}

impl Donation {
    pub const COLUMNS: [&'static str; 6] = [
        "Donor",
        "Blood group",
        "Units",
        "Location",
        "Date",
        "Status",
    ];
}

impl ListRow for Donation {
    fn cells(&self) -> Vec<String> {
        vec![
            self.donor_name.clone(),
            self.blood_group.as_str().to_owned(),
            self.units.to_string(),
            self.location.clone(),
            format_date(self.donated_on),
            self.status.as_str().to_owned(),
        ]
    }
}
