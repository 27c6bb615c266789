use std::fmt::Write;

use hr_portal::model::RequestStatus;
use hr_portal::{RenderContext, Renderer};

/// Plain-text rendering of each view into a buffer.
#[derive(Debug, Default)]
pub struct TextRenderer {
    out: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn heading(&mut self, title: &str) {
        let _ = writeln!(self.out, "== {title} ==");
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }
}

impl Renderer for TextRenderer {
    fn render_home(&mut self, ctx: &RenderContext<'_>) {
        self.heading("Home");
        match ctx.current {
            Some(account) => self.line(format!(
                "Welcome, {} ({})",
                account.display_name(),
                account.role
            )),
            None => self.line("Welcome to the HR portal. Log in or register to continue."),
        }
    }

    fn render_login(&mut self, _ctx: &RenderContext<'_>) {
        self.heading("Login");
        self.line("hr-portal login --email <email> --password <password>");
    }

    fn render_register(&mut self, _ctx: &RenderContext<'_>) {
        self.heading("Register");
        self.line(
            "hr-portal register --first-name <first> --last-name <last> \
             --email <email> --password <password>",
        );
    }

    fn render_verify_email(&mut self, ctx: &RenderContext<'_>) {
        self.heading("Verify Email");
        match ctx.pending_verification {
            Some(email) => {
                self.line(format!("A verification link was sent to {email}."));
                self.line("Run `hr-portal verify` to simulate clicking it.");
            }
            None => self.line("No email is awaiting verification."),
        }
    }

    fn render_profile(&mut self, ctx: &RenderContext<'_>) {
        self.heading("Profile");
        if let Some(account) = ctx.current {
            self.line(format!("Name:     {}", account.display_name()));
            self.line(format!("Email:    {}", account.email));
            self.line(format!("Role:     {}", account.role));
            self.line(format!(
                "Verified: {}",
                if account.verified { "yes" } else { "no" }
            ));
        }
    }

    fn render_requests(&mut self, ctx: &RenderContext<'_>) {
        self.heading("My Requests");
        let requests = ctx.my_requests();
        if requests.is_empty() {
            self.line("No requests yet.");
            return;
        }
        for r in requests {
            let items = r
                .items
                .iter()
                .map(|i| format!("{} x{}", i.name, i.qty))
                .collect::<Vec<_>>()
                .join(", ");
            let marker = match r.status {
                RequestStatus::Pending => "…",
                RequestStatus::Approved => "✓",
                RequestStatus::Rejected => "✗",
            };
            self.line(format!(
                "{}  {}  {:<12} {marker} {:<8}  {items}",
                r.id, r.date, r.kind, r.status.as_str()
            ));
        }
    }

    fn render_employees(&mut self, ctx: &RenderContext<'_>) {
        self.heading("Employees");
        let rows = ctx.collections.employee_rows();
        if rows.is_empty() {
            self.line("No employees.");
        }
        for row in rows {
            self.line(format!(
                "{:<10} {:<24} {:<16} {}",
                row.employee_id, row.name, row.position, row.department
            ));
        }
    }

    fn render_departments(&mut self, ctx: &RenderContext<'_>) {
        self.heading("Departments");
        for d in &ctx.collections.departments {
            self.line(format!("{:>3}  {:<16} {}", d.id, d.name, d.description));
        }
    }

    fn render_accounts(&mut self, ctx: &RenderContext<'_>) {
        self.heading("Accounts");
        for a in &ctx.collections.accounts {
            self.line(format!(
                "{:<24} {:<28} {:<6} {}",
                a.display_name(),
                a.email,
                a.role.as_str(),
                if a.verified { "verified" } else { "unverified" }
            ));
        }
    }
}
