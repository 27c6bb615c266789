use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::contract::model::{
    Account, AccountForm, Department, Employee, EmployeeForm, EmployeeRow, Registration, Request,
    RequestForm, RequestStatus, Role,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{Confirmer, Notice};
use crate::domain::session::Session;
use crate::infra::storage::snapshot::Store;

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
        }
    }
}

/// Domain operations over the store, on behalf of the current session.
///
/// Every mutating operation validates first, mutates the collections, then saves the
/// whole snapshot. A failed save is reported by the store as a notice and does not
/// undo the mutation.
pub struct Service {
    store: Store,
    session: Session,
    config: ServiceConfig,
    last_request_id: i64,
}

impl Service {
    /// Create a service from explicitly constructed parts.
    pub fn new(store: Store, session: Session, config: ServiceConfig) -> Self {
        Self {
            store,
            session,
            config,
            last_request_id: 0,
        }
    }

    /// Process start: restore the remembered identity from the store.
    pub fn start(mut store: Store, config: ServiceConfig) -> Self {
        let session = Session::restore(&mut store);
        Self::new(store, session, config)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_account(&self) -> Option<&Account> {
        self.session.current(&self.store)
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin(&self.store)
    }

    /// `firstName lastName` of the current identity, for the shell header.
    pub fn display_name(&self) -> Option<String> {
        self.current_account().map(Account::display_name)
    }

    /// Email awaiting verification, if any.
    pub fn pending_verification(&self) -> Option<String> {
        self.store.pending_verification()
    }

    // --- registration and login ---

    #[instrument(name = "hr_portal.service.register", skip(self, form), fields(email = %form.email))]
    pub fn register(&mut self, form: Registration) -> Result<Account, DomainError> {
        let email = normalize_email(&form.email);
        let first_name = required("firstName", &form.first_name)?;
        let last_name = required("lastName", &form.last_name)?;
        validate_email(&email)?;
        self.validate_password(&form.password)?;

        if self.store.collections().account(&email).is_some() {
            return Err(DomainError::email_already_exists(email));
        }

        let account = Account {
            first_name,
            last_name,
            email,
            password: form.password,
            role: Role::User,
            verified: false,
        };
        self.store.collections_mut().accounts.push(account.clone());
        self.store.save();
        self.store.set_pending_verification(&account.email);

        info!("Registration successful, awaiting verification");
        self.store
            .notify(Notice::success("Registration successful! Please verify your email."));
        Ok(account)
    }

    #[instrument(name = "hr_portal.service.verify_email", skip(self))]
    pub fn verify_email(&mut self, email: &str) -> Result<(), DomainError> {
        let email = normalize_email(email);
        let account = self
            .store
            .collections_mut()
            .accounts
            .iter_mut()
            .find(|a| a.email.to_lowercase() == email)
            .ok_or_else(|| DomainError::account_not_found(email.clone()))?;
        account.verified = true;
        self.store.save();

        if self
            .store
            .pending_verification()
            .is_some_and(|p| p.eq_ignore_ascii_case(&email))
        {
            self.store.clear_pending_verification();
        }
        info!("Email verified");
        self.store.notify(Notice::success("Email verified successfully!"));
        Ok(())
    }

    /// Verify the most recent registration and consume the marker.
    pub fn verify_pending(&mut self) -> Result<String, DomainError> {
        let email = self
            .store
            .pending_verification()
            .ok_or(DomainError::NoPendingVerification)?;
        self.verify_email(&email)?;
        self.store.clear_pending_verification();
        Ok(email)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Account, DomainError> {
        let account = self.session.authenticate(&mut self.store, email, password)?;
        self.store.notify(Notice::success("Login successful!"));
        Ok(account)
    }

    #[instrument(name = "hr_portal.service.logout", skip(self))]
    pub fn logout(&mut self) {
        self.session.clear(&mut self.store);
        info!("Logged out");
        self.store.notify(Notice::info("Logged out successfully"));
    }

    // --- accounts (admin) ---

    pub fn list_accounts(&self) -> Result<&[Account], DomainError> {
        self.require_admin()?;
        Ok(&self.store.collections().accounts)
    }

    #[instrument(name = "hr_portal.service.create_account", skip(self, form), fields(email = %form.email))]
    pub fn create_account(&mut self, form: AccountForm) -> Result<Account, DomainError> {
        self.require_admin()?;
        let account = self.account_from_form(form)?;

        if self.store.collections().account(&account.email).is_some() {
            return Err(DomainError::email_already_exists(account.email));
        }

        self.store.collections_mut().accounts.push(account.clone());
        self.store.save();
        info!("Account created");
        self.store.notify(Notice::success("Account created"));
        Ok(account)
    }

    /// Replace every field of the account found under `original_email`.
    ///
    /// The new email is not checked against other accounts, and employees or
    /// requests keyed by the old email are left as they are. `Ok(None)` means no
    /// account matched and nothing changed.
    #[instrument(
        name = "hr_portal.service.update_account",
        skip(self, form),
        fields(original_email = %original_email, email = %form.email)
    )]
    pub fn update_account(
        &mut self,
        original_email: &str,
        form: AccountForm,
    ) -> Result<Option<Account>, DomainError> {
        self.require_admin()?;
        let updated = self.account_from_form(form)?;
        let original = normalize_email(original_email);

        let Some(slot) = self
            .store
            .collections_mut()
            .accounts
            .iter_mut()
            .find(|a| a.email.to_lowercase() == original)
        else {
            debug!("no account under original email, nothing to update");
            return Ok(None);
        };
        *slot = updated.clone();

        self.session.rekey(&original, &updated.email);
        self.store.save();
        info!("Account updated");
        self.store.notify(Notice::success("Account updated"));
        Ok(Some(updated))
    }

    /// Set a new password. Admins may reset any account, users only their own.
    #[instrument(name = "hr_portal.service.reset_password", skip(self, new_password))]
    pub fn reset_password(&mut self, email: &str, new_password: &str) -> Result<(), DomainError> {
        let caller = self.require_user()?;
        let email = normalize_email(email);
        if !caller.is_admin() && caller.email.to_lowercase() != email {
            return Err(DomainError::AdminRequired);
        }
        self.validate_password(new_password)?;

        let Some(account) = self
            .store
            .collections_mut()
            .accounts
            .iter_mut()
            .find(|a| a.email.to_lowercase() == email)
        else {
            debug!("no account under email, nothing to reset");
            return Ok(());
        };
        account.password = new_password.to_string();
        self.store.save();
        info!("Password reset successful");
        self.store.notify(Notice::success("Password reset successful"));
        Ok(())
    }

    #[instrument(name = "hr_portal.service.delete_account", skip(self, confirm))]
    pub fn delete_account(
        &mut self,
        email: &str,
        confirm: &dyn Confirmer,
    ) -> Result<(), DomainError> {
        let caller = self.require_admin()?;
        let email = normalize_email(email);
        if caller.email.to_lowercase() == email {
            return Err(DomainError::CannotDeleteSelf);
        }
        if !confirm.confirm("Delete this account?") {
            return Err(DomainError::Cancelled);
        }

        let accounts = &mut self.store.collections_mut().accounts;
        let before = accounts.len();
        accounts.retain(|a| a.email.to_lowercase() != email);
        if accounts.len() == before {
            debug!("no account under email, nothing to delete");
            return Ok(());
        }
        self.store.save();
        info!("Account deleted");
        self.store.notify(Notice::info("Account deleted"));
        Ok(())
    }

    // --- employees (admin) ---

    pub fn list_employees(&self) -> Result<Vec<EmployeeRow>, DomainError> {
        self.require_admin()?;
        Ok(self.store.collections().employee_rows())
    }

    /// Add an employee record. `employeeId` uniqueness is not enforced.
    #[instrument(
        name = "hr_portal.service.create_employee",
        skip(self, form),
        fields(employee_id = %form.employee_id, user_email = %form.user_email)
    )]
    pub fn create_employee(&mut self, form: EmployeeForm) -> Result<Employee, DomainError> {
        self.require_admin()?;
        let employee = self.employee_from_form(form)?;

        self.store.collections_mut().employees.push(employee.clone());
        self.store.save();
        info!("Employee added");
        self.store.notify(Notice::success("Employee added"));
        Ok(employee)
    }

    /// Replace the employee found under `original_id`; `Ok(None)` when none matched.
    #[instrument(
        name = "hr_portal.service.update_employee",
        skip(self, form),
        fields(original_id = %original_id, employee_id = %form.employee_id)
    )]
    pub fn update_employee(
        &mut self,
        original_id: &str,
        form: EmployeeForm,
    ) -> Result<Option<Employee>, DomainError> {
        self.require_admin()?;
        let updated = self.employee_from_form(form)?;

        let Some(slot) = self
            .store
            .collections_mut()
            .employees
            .iter_mut()
            .find(|e| e.employee_id == original_id)
        else {
            debug!("no employee under original id, nothing to update");
            return Ok(None);
        };
        *slot = updated.clone();

        self.store.save();
        info!("Employee updated");
        self.store.notify(Notice::success("Employee updated"));
        Ok(Some(updated))
    }

    /// Remove every employee carrying `employee_id`.
    #[instrument(name = "hr_portal.service.delete_employee", skip(self, confirm))]
    pub fn delete_employee(
        &mut self,
        employee_id: &str,
        confirm: &dyn Confirmer,
    ) -> Result<(), DomainError> {
        self.require_admin()?;
        if !confirm.confirm("Delete this employee?") {
            return Err(DomainError::Cancelled);
        }

        let employees = &mut self.store.collections_mut().employees;
        let before = employees.len();
        employees.retain(|e| e.employee_id != employee_id);
        if employees.len() == before {
            debug!("no employee under id, nothing to delete");
            return Ok(());
        }
        self.store.save();
        info!("Employee deleted");
        self.store.notify(Notice::info("Employee deleted"));
        Ok(())
    }

    // --- departments (admin, read-only) ---

    pub fn list_departments(&self) -> Result<&[Department], DomainError> {
        self.require_admin()?;
        Ok(&self.store.collections().departments)
    }

    pub fn create_department(
        &mut self,
        _name: &str,
        _description: &str,
    ) -> Result<Department, DomainError> {
        self.require_admin()?;
        Err(DomainError::not_implemented("Add department"))
    }

    pub fn update_department(
        &mut self,
        _id: i64,
        _name: &str,
        _description: &str,
    ) -> Result<Department, DomainError> {
        self.require_admin()?;
        Err(DomainError::not_implemented("Edit"))
    }

    pub fn delete_department(&mut self, _id: i64) -> Result<(), DomainError> {
        self.require_admin()?;
        Err(DomainError::not_implemented("Delete"))
    }

    // --- requests ---

    /// Submit a request for the current identity.
    #[instrument(name = "hr_portal.service.create_request", skip(self, form), fields(kind = %form.kind))]
    pub fn create_request(&mut self, form: RequestForm) -> Result<Request, DomainError> {
        let employee_email = self.require_user()?.email.clone();
        let kind = required("type", &form.kind)?;

        if form.items.is_empty() {
            return Err(DomainError::EmptyRequest);
        }
        let mut items = Vec::with_capacity(form.items.len());
        for (i, mut item) in form.items.into_iter().enumerate() {
            item.name = item.name.trim().to_string();
            if item.name.is_empty() {
                return Err(DomainError::invalid_item(i + 1, "name is required"));
            }
            if item.qty < 1 {
                return Err(DomainError::invalid_item(i + 1, "quantity must be at least 1"));
            }
            items.push(item);
        }

        let request = Request {
            id: self.next_request_id(),
            kind,
            items,
            status: RequestStatus::Pending,
            date: Utc::now().date_naive(),
            employee_email,
        };
        self.store.collections_mut().requests.push(request.clone());
        self.store.save();
        info!(request_id = request.id, "Request submitted");
        self.store.notify(Notice::success("Request submitted"));
        Ok(request)
    }

    /// The current identity's requests, in submission order.
    pub fn my_requests(&self) -> Result<Vec<&Request>, DomainError> {
        let email = &self.require_user()?.email;
        Ok(self
            .store
            .collections()
            .requests
            .iter()
            .filter(|r| &r.employee_email == email)
            .collect())
    }

    // --- helpers ---

    fn require_user(&self) -> Result<&Account, DomainError> {
        self.current_account().ok_or(DomainError::NotAuthenticated)
    }

    fn require_admin(&self) -> Result<&Account, DomainError> {
        let account = self.require_user()?;
        if !account.is_admin() {
            return Err(DomainError::AdminRequired);
        }
        Ok(account)
    }

    /// Creation timestamp in milliseconds, bumped past the newest id already issued.
    fn next_request_id(&mut self) -> i64 {
        let newest = self
            .store
            .collections()
            .requests
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(0)
            .max(self.last_request_id);
        let now = Utc::now().timestamp_millis();
        let id = if now > newest { now } else { newest + 1 };
        self.last_request_id = id;
        id
    }

    fn account_from_form(&self, form: AccountForm) -> Result<Account, DomainError> {
        let email = normalize_email(&form.email);
        let first_name = required("firstName", &form.first_name)?;
        let last_name = required("lastName", &form.last_name)?;
        validate_email(&email)?;
        self.validate_password(&form.password)?;
        Ok(Account {
            first_name,
            last_name,
            email,
            password: form.password,
            role: form.role,
            verified: form.verified,
        })
    }

    fn employee_from_form(&self, form: EmployeeForm) -> Result<Employee, DomainError> {
        let employee_id = required("employeeId", &form.employee_id)?;
        let position = required("position", &form.position)?;
        let user_email = normalize_email(&form.user_email);
        if self.store.collections().account(&user_email).is_none() {
            return Err(DomainError::unknown_user_email(user_email));
        }
        Ok(Employee {
            employee_id,
            user_email,
            position,
            department_id: form.department_id,
            hire_date: form.hire_date,
        })
    }

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        let len = password.chars().count();
        if len < self.config.min_password_length {
            return Err(DomainError::password_too_short(
                len,
                self.config.min_password_length,
            ));
        }
        Ok(())
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() || !email.contains('@') || !email.contains('.') {
        return Err(DomainError::invalid_email(email));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    Ok(value.to_string())
}
