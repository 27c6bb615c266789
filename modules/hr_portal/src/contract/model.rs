use chrono::NaiveDate;
use std::fmt;

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }

    /// Case-insensitive parse of `Admin` / `User`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A login identity. `email` is the natural key and is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub verified: bool,
}

impl Account {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Employment record linked to an account by `user_email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub employee_id: String,
    pub user_email: String,
    pub position: String,
    pub department_id: i64,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Pending" => Some(RequestStatus::Pending),
            "Approved" => Some(RequestStatus::Approved),
            "Rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestItem {
    pub name: String,
    pub qty: u32,
}

impl RequestItem {
    pub fn new(name: impl Into<String>, qty: u32) -> Self {
        Self {
            name: name.into(),
            qty,
        }
    }
}

/// Supply request submitted by an employee for themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: i64,
    pub kind: String,
    pub items: Vec<RequestItem>,
    pub status: RequestStatus,
    pub date: NaiveDate,
    pub employee_email: String,
}

/// The four canonical collections, always persisted together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Collections {
    pub accounts: Vec<Account>,
    pub departments: Vec<Department>,
    pub employees: Vec<Employee>,
    pub requests: Vec<Request>,
}

impl Collections {
    /// Case-insensitive lookup by email.
    pub fn account(&self, email: &str) -> Option<&Account> {
        let email = email.trim().to_lowercase();
        self.accounts.iter().find(|a| a.email.to_lowercase() == email)
    }

    pub fn department(&self, id: i64) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    /// Employees joined with account and department names.
    pub fn employee_rows(&self) -> Vec<EmployeeRow> {
        self.employees
            .iter()
            .map(|e| EmployeeRow {
                employee_id: e.employee_id.clone(),
                name: self
                    .account(&e.user_email)
                    .map(Account::display_name)
                    .unwrap_or_else(|| e.user_email.clone()),
                position: e.position.clone(),
                department: self
                    .department(e.department_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect()
    }
}

// --- form records produced by the presentation layer ---

/// Self-service sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Admin account editor form; every field is replaced on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeForm {
    pub employee_id: String,
    pub user_email: String,
    pub position: String,
    pub department_id: i64,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestForm {
    pub kind: String,
    pub items: Vec<RequestItem>,
}

/// Employee joined with its account and department for directory listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub employee_id: String,
    /// Account display name, or the raw email when the account is gone.
    pub name: String,
    pub position: String,
    /// Department name, or `Unknown`.
    pub department: String,
}
