#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use hr_portal::model::{AccountForm, EmployeeForm, Registration, RequestForm, RequestItem, Role};
use hr_portal::{
    InMemoryStorage, RecordingNotifier, RenderContext, Renderer, Service, ServiceConfig, Store,
    StoreKeys, View,
};

/// Start a service over `storage` the way a fresh process would.
pub fn start(storage: &InMemoryStorage) -> (Service, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Store::open(
        Box::new(storage.clone()),
        StoreKeys::default(),
        notifier.clone(),
    );
    (Service::start(store, ServiceConfig::default()), notifier)
}

pub fn start_fresh() -> (Service, Arc<RecordingNotifier>, InMemoryStorage) {
    let storage = InMemoryStorage::new();
    let (service, notifier) = start(&storage);
    (service, notifier, storage)
}

pub fn login_admin(service: &mut Service) {
    service
        .login("admin@example.com", "Password123!")
        .expect("seed admin must log in");
}

pub fn registration(email: &str, password: &str) -> Registration {
    Registration {
        first_name: "Bob".to_string(),
        last_name: "Stone".to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn account_form(email: &str, role: Role, verified: bool) -> AccountForm {
    AccountForm {
        first_name: "Carol".to_string(),
        last_name: "Diaz".to_string(),
        email: email.to_string(),
        password: "carolpw1".to_string(),
        role,
        verified,
    }
}

pub fn employee_form(employee_id: &str, user_email: &str) -> EmployeeForm {
    EmployeeForm {
        employee_id: employee_id.to_string(),
        user_email: user_email.to_string(),
        position: "Engineer".to_string(),
        department_id: 1,
        hire_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    }
}

pub fn request_form(items: &[(&str, u32)]) -> RequestForm {
    RequestForm {
        kind: "Equipment".to_string(),
        items: items
            .iter()
            .map(|(name, qty)| RequestItem::new(*name, *qty))
            .collect(),
    }
}

pub fn yes(_: &str) -> bool {
    true
}

pub fn no(_: &str) -> bool {
    false
}

/// Renderer that records which views were rendered.
#[derive(Default)]
pub struct RecordingRenderer {
    pub rendered: Vec<View>,
    pub request_counts: Vec<usize>,
}

impl Renderer for RecordingRenderer {
    fn render_home(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::Home);
    }
    fn render_login(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::Login);
    }
    fn render_register(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::Register);
    }
    fn render_verify_email(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::VerifyEmail);
    }
    fn render_profile(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::Profile);
    }
    fn render_requests(&mut self, ctx: &RenderContext<'_>) {
        self.rendered.push(View::Requests);
        self.request_counts.push(ctx.my_requests().len());
    }
    fn render_employees(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::Employees);
    }
    fn render_departments(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::Departments);
    }
    fn render_accounts(&mut self, _ctx: &RenderContext<'_>) {
        self.rendered.push(View::Accounts);
    }
}
