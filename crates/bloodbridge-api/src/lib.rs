// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use bloodbridge_app::{Decision, Inventory, LoginForm, RequestId, Role, ScreenKind};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Donors,
    Hospitals,
    Requests,
    Donations,
    Inventory,
}

impl Resource {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Donors => "donors",
            Self::Hospitals => "hospitals",
            Self::Requests => "requests",
            Self::Donations => "donations",
            Self::Inventory => "inventory",
        }
    }

    pub const fn for_screen(screen: ScreenKind) -> Option<Self> {
        match screen {
            ScreenKind::Dashboard => None,
            ScreenKind::Donors => Some(Self::Donors),
            ScreenKind::Hospitals => Some(Self::Hospitals),
            ScreenKind::Requests => Some(Self::Requests),
            ScreenKind::Donations => Some(Self::Donations),
            ScreenKind::Inventory => Some(Self::Inventory),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
    session: Option<Session>,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed =
            Url::parse(&base_url).with_context(|| format!("parse api.base_url {base_url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url {base_url:?} must use http or https, got {}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
            session: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Session> {
        LoginForm {
            email: email.to_owned(),
            password: password.to_owned(),
        }
        .validate()?;

        let response = self.send(
            self.http
                .post(self.url("auth/login"))
                .json(&LoginRequest { email, password }),
        )?;
        let session: Session = response.json().context("decode login response")?;
        log::info!("signed in as {}", session.role.as_str());
        self.session = Some(session.clone());
        Ok(session)
    }

    pub fn list<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>> {
        let response = self.send(self.http.get(self.url(resource.path())))?;
        let rows: Vec<T> = response
            .json()
            .with_context(|| format!("decode {} list", resource.path()))?;
        log::debug!("loaded {} {}", rows.len(), resource.path());
        Ok(rows)
    }

    pub fn inventory(&self) -> Result<Inventory> {
        let response = self.send(self.http.get(self.url(Resource::Inventory.path())))?;
        response.json().context("decode inventory")
    }

    pub fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<T> {
        let response = self.send(self.http.post(self.url(resource.path())).json(body))?;
        response
            .json()
            .with_context(|| format!("decode created {}", resource.path()))
    }

    pub fn update<B: Serialize>(&self, resource: Resource, id: i64, body: &B) -> Result<()> {
        let path = format!("{}/{id}", resource.path());
        self.send(self.http.patch(self.url(&path)).json(body))?;
        Ok(())
    }

    pub fn delete(&self, resource: Resource, id: i64) -> Result<()> {
        let path = format!("{}/{id}", resource.path());
        self.send(self.http.delete(self.url(&path)))?;
        Ok(())
    }

    pub fn decide_request(&self, id: RequestId, decision: Decision) -> Result<()> {
        self.update(
            Resource::Requests,
            id.get(),
            &StatusUpdate {
                status: decision.outcome().as_str(),
            },
        )
        .with_context(|| format!("{} request {id}", decision.verb()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.session {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::warn!("{} answered {}", self.base_url, status.as_u16());
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check api.base_url and that the server is running ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if status == StatusCode::UNAUTHORIZED {
        return anyhow!("not authorized (401) -- log in again");
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}
