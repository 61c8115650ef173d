// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use crate::model::BloodGroup;

time::serde::format_description!(form_date, Date, "[year]-[month]-[day]");

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_DONOR_AGE: u8 = 18;
pub const MAX_DONOR_AGE: u8 = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    Login,
    DonorRegistration,
    HospitalRegistration,
    BloodRequest,
    Donation,
}

impl FormKind {
    pub const ALL: [Self; 5] = [
        Self::Login,
        Self::DonorRegistration,
        Self::HospitalRegistration,
        Self::BloodRequest,
        Self::Donation,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::DonorRegistration => "donor",
            Self::HospitalRegistration => "hospital",
            Self::BloodRequest => "request",
            Self::Donation => "donation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }

    pub const fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::Login => &["email", "password"],
            Self::DonorRegistration => &[
                "name",
                "email",
                "phone",
                "password",
                "confirm_password",
                "blood_group",
                "age",
                "city",
                "last_donation",
            ],
            Self::HospitalRegistration => &[
                "name",
                "email",
                "phone",
                "password",
                "confirm_password",
                "city",
                "contact_person",
            ],
            Self::BloodRequest => &["patient_name", "blood_group", "units", "reason"],
            Self::Donation => &["blood_group", "units", "location", "donated_on"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration and submission forms serialize as the service's request
/// bodies; the password confirmation never leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub blood_group: Option<BloodGroup>,
    pub age: u8,
    pub city: String,
    #[serde(with = "form_date::option", default)]
    pub last_donation: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub city: String,
    pub contact_person: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestForm {
    pub patient_name: String,
    pub blood_group: Option<BloodGroup>,
    pub units: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationForm {
    pub blood_group: Option<BloodGroup>,
    pub units: u32,
    pub location: String,
    #[serde(with = "form_date::option", default)]
    pub donated_on: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Login(LoginForm),
    DonorRegistration(Box<DonorRegistrationForm>),
    HospitalRegistration(HospitalRegistrationForm),
    BloodRequest(BloodRequestForm),
    Donation(DonationForm),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Login(_) => FormKind::Login,
            Self::DonorRegistration(_) => FormKind::DonorRegistration,
            Self::HospitalRegistration(_) => FormKind::HospitalRegistration,
            Self::BloodRequest(_) => FormKind::BloodRequest,
            Self::Donation(_) => FormKind::Donation,
        }
    }

    pub fn blank_for(kind: FormKind) -> Self {
        match kind {
            FormKind::Login => Self::Login(LoginForm {
                email: String::new(),
                password: String::new(),
            }),
            FormKind::DonorRegistration => {
                Self::DonorRegistration(Box::new(DonorRegistrationForm {
                    name: String::new(),
                    email: String::new(),
                    phone: String::new(),
                    password: String::new(),
                    confirm_password: String::new(),
                    blood_group: None,
                    age: MIN_DONOR_AGE,
                    city: String::new(),
                    last_donation: None,
                }))
            }
            FormKind::HospitalRegistration => Self::HospitalRegistration(HospitalRegistrationForm {
                name: String::new(),
                email: String::new(),
                phone: String::new(),
                password: String::new(),
                confirm_password: String::new(),
                city: String::new(),
                contact_person: String::new(),
            }),
            FormKind::BloodRequest => Self::BloodRequest(BloodRequestForm {
                patient_name: String::new(),
                blood_group: None,
                units: 1,
                reason: String::new(),
            }),
            FormKind::Donation => Self::Donation(DonationForm {
                blood_group: None,
                units: 1,
                location: String::new(),
                donated_on: None,
            }),
        }
    }

    /// Sets one field from its text form, as typed on the command line.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        let kind = self.kind();
        let value = value.trim();
        let text = || value.to_owned();
        match self {
            Self::Login(form) => match name {
                "email" => form.email = text(),
                "password" => form.password = text(),
                _ => return Err(unknown_field(kind, name)),
            },
            Self::DonorRegistration(form) => match name {
                "name" => form.name = text(),
                "email" => form.email = text(),
                "phone" => form.phone = text(),
                "password" => form.password = text(),
                "confirm_password" => form.confirm_password = text(),
                "blood_group" => form.blood_group = Some(parse_blood_group(value)?),
                "age" => form.age = parse_number(name, value)?,
                "city" => form.city = text(),
                "last_donation" => form.last_donation = parse_optional_date(name, value)?,
                _ => return Err(unknown_field(kind, name)),
            },
            Self::HospitalRegistration(form) => match name {
                "name" => form.name = text(),
                "email" => form.email = text(),
                "phone" => form.phone = text(),
                "password" => form.password = text(),
                "confirm_password" => form.confirm_password = text(),
                "city" => form.city = text(),
                "contact_person" => form.contact_person = text(),
                _ => return Err(unknown_field(kind, name)),
            },
            Self::BloodRequest(form) => match name {
                "patient_name" => form.patient_name = text(),
                "blood_group" => form.blood_group = Some(parse_blood_group(value)?),
                "units" => form.units = parse_number(name, value)?,
                "reason" => form.reason = text(),
                _ => return Err(unknown_field(kind, name)),
            },
            Self::Donation(form) => match name {
                "blood_group" => form.blood_group = Some(parse_blood_group(value)?),
                "units" => form.units = parse_number(name, value)?,
                "location" => form.location = text(),
                "donated_on" => form.donated_on = parse_optional_date(name, value)?,
                _ => return Err(unknown_field(kind, name)),
            },
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Login(form) => form.validate(),
            Self::DonorRegistration(form) => form.validate(),
            Self::HospitalRegistration(form) => form.validate(),
            Self::BloodRequest(form) => form.validate(),
            Self::Donation(form) => form.validate(),
        }
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            bail!("password is required -- enter your password and retry");
        }
        Ok(())
    }
}

impl DonorRegistrationForm {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("donor name is required -- enter a name and retry");
        }
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        validate_new_password(&self.password, &self.confirm_password)?;
        if self.blood_group.is_none() {
            bail!("blood group is required -- choose a blood group and retry");
        }
        if !(MIN_DONOR_AGE..=MAX_DONOR_AGE).contains(&self.age) {
            bail!(
                "donor age must be between {MIN_DONOR_AGE} and {MAX_DONOR_AGE}, got {}",
                self.age
            );
        }
        if self.city.trim().is_empty() {
            bail!("city is required -- enter a city and retry");
        }
        Ok(())
    }
}

impl HospitalRegistrationForm {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("hospital name is required -- enter a name and retry");
        }
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        validate_new_password(&self.password, &self.confirm_password)?;
        if self.city.trim().is_empty() {
            bail!("city is required -- enter a city and retry");
        }
        if self.contact_person.trim().is_empty() {
            bail!("contact person is required -- enter a contact name and retry");
        }
        Ok(())
    }
}

impl BloodRequestForm {
    pub fn validate(&self) -> Result<()> {
        if self.patient_name.trim().is_empty() {
            bail!("patient name is required -- enter a name and retry");
        }
        if self.blood_group.is_none() {
            bail!("blood group is required -- choose a blood group and retry");
        }
        if self.units == 0 {
            bail!("requested units must be at least 1");
        }
        Ok(())
    }
}

impl DonationForm {
    pub fn validate(&self) -> Result<()> {
        if self.blood_group.is_none() {
            bail!("blood group is required -- choose a blood group and retry");
        }
        if self.units == 0 {
            bail!("donated units must be at least 1");
        }
        if self.location.trim().is_empty() {
            bail!("donation location is required -- enter a hospital or camp and retry");
        }
        if self.donated_on.is_none() {
            bail!("donation date is required -- pick a date and retry");
        }
        Ok(())
    }
}

fn unknown_field(kind: FormKind, name: &str) -> anyhow::Error {
    anyhow!(
        "{} form has no field {name:?}; use one of: {}",
        kind.label(),
        kind.field_names().join(", ")
    )
}

fn parse_blood_group(value: &str) -> Result<BloodGroup> {
    BloodGroup::parse(value).ok_or_else(|| {
        anyhow!("unknown blood group {value:?}; use A+, A-, B+, B-, AB+, AB-, O+, or O-")
    })
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("{name} expects a whole number, got {value:?}"))
}

fn parse_optional_date(name: &str, value: &str) -> Result<Option<Date>> {
    if value.is_empty() {
        return Ok(None);
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .with_context(|| format!("{name} expects YYYY-MM-DD, got {value:?}"))
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        bail!("email is required -- enter an email address and retry");
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        bail!("email {email:?} is not a valid address");
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<()> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    if !allowed || !(7..=15).contains(&digits) {
        bail!("phone number {phone:?} must contain 7 to 15 digits");
    }
    Ok(())
}

fn validate_new_password(password: &str, confirm: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }
    if password != confirm {
        bail!("passwords do not match -- retype the confirmation and retry");
    }
    Ok(())
}
