//! Output ports of the domain: persistence slots, user-visible notices, the explicit
//! confirmation step and the per-view render callbacks.

use crate::contract::model::{Account, Collections, Request};

/// Persistent string slots keyed by name (browser local storage or its stand-in).
pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    /// Overwrites the previous value as one unit.
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// A transient user-visible message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }
}

/// Output port: show a notice (no knowledge of the widget library).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Explicit confirmation step in front of destructive operations.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Read-only state handed to render callbacks.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub collections: &'a Collections,
    pub current: Option<&'a Account>,
    pub pending_verification: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    /// Requests submitted by the current identity, in submission order.
    pub fn my_requests(&self) -> Vec<&'a Request> {
        match self.current {
            Some(account) => self
                .collections
                .requests
                .iter()
                .filter(|r| r.employee_email == account.email)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Presentation layer capability: one callback per view. Invoked by the router only
/// after the authorization gate has passed.
pub trait Renderer {
    fn render_home(&mut self, ctx: &RenderContext<'_>);
    fn render_login(&mut self, ctx: &RenderContext<'_>);
    fn render_register(&mut self, ctx: &RenderContext<'_>);
    fn render_verify_email(&mut self, ctx: &RenderContext<'_>);
    fn render_profile(&mut self, ctx: &RenderContext<'_>);
    fn render_requests(&mut self, ctx: &RenderContext<'_>);
    fn render_employees(&mut self, ctx: &RenderContext<'_>);
    fn render_departments(&mut self, ctx: &RenderContext<'_>);
    fn render_accounts(&mut self, ctx: &RenderContext<'_>);
}
