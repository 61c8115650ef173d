// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Role, ScreenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub role: Role,
    pub active_screen: ScreenKind,
    pub status_line: Option<String>,
}

impl AppState {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            active_screen: ScreenKind::Dashboard,
            status_line: None,
        }
    }

    pub fn screens(&self) -> &'static [ScreenKind] {
        ScreenKind::for_role(self.role)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::for_role(Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextScreen,
    PrevScreen,
    OpenScreen(ScreenKind),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ScreenChanged(ScreenKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextScreen => self.rotate_screen(1),
            AppCommand::PrevScreen => self.rotate_screen(-1),
            AppCommand::OpenScreen(screen) => {
                if !self.screens().contains(&screen) {
                    let message = format!(
                        "{} is not available for {}",
                        screen.label(),
                        self.role.as_str()
                    );
                    return vec![self.set_status(&message)];
                }
                self.active_screen = screen;
                vec![AppEvent::ScreenChanged(screen)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<AppEvent> {
        let screens = self.screens();
        let current = screens
            .iter()
            .position(|screen| *screen == self.active_screen)
            .unwrap_or(0) as isize;
        let len = screens.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_screen = screens[next];
        vec![AppEvent::ScreenChanged(self.active_screen)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
