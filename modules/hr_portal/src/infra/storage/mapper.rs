use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use crate::contract::model::{
    Account, Collections, Department, Employee, Request, RequestItem, RequestStatus, Role,
};
use crate::infra::storage::entity::{
    AccountRecord, DepartmentRecord, EmployeeRecord, ItemRecord, RequestRecord, SnapshotDocument,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert a decoded snapshot into domain collections.
pub fn document_to_collections(doc: SnapshotDocument) -> Result<Collections> {
    let accounts = doc
        .accounts
        .into_iter()
        .map(account_from_record)
        .collect::<Result<Vec<_>>>()?;
    let departments = doc
        .departments
        .into_iter()
        .map(|d| Department {
            id: d.id,
            name: d.name,
            description: d.description,
        })
        .collect();
    let employees = doc
        .employees
        .into_iter()
        .map(employee_from_record)
        .collect::<Result<Vec<_>>>()?;
    let requests = doc
        .requests
        .into_iter()
        .map(request_from_record)
        .collect::<Result<Vec<_>>>()?;

    Ok(Collections {
        accounts,
        departments,
        employees,
        requests,
    })
}

/// Convert domain collections into the persisted shape.
pub fn collections_to_document(c: &Collections) -> SnapshotDocument {
    SnapshotDocument {
        accounts: c
            .accounts
            .iter()
            .map(|a| AccountRecord {
                first_name: a.first_name.clone(),
                last_name: a.last_name.clone(),
                email: a.email.clone(),
                password: a.password.clone(),
                role: a.role.as_str().to_string(),
                verified: a.verified,
            })
            .collect(),
        departments: c
            .departments
            .iter()
            .map(|d| DepartmentRecord {
                id: d.id,
                name: d.name.clone(),
                description: d.description.clone(),
            })
            .collect(),
        employees: c
            .employees
            .iter()
            .map(|e| EmployeeRecord {
                employee_id: e.employee_id.clone(),
                user_email: e.user_email.clone(),
                position: e.position.clone(),
                department_id: e.department_id,
                hire_date: e.hire_date.format(DATE_FORMAT).to_string(),
            })
            .collect(),
        requests: c
            .requests
            .iter()
            .map(|r| RequestRecord {
                id: r.id,
                kind: r.kind.clone(),
                items: r
                    .items
                    .iter()
                    .map(|i| ItemRecord {
                        name: i.name.clone(),
                        qty: i.qty,
                    })
                    .collect(),
                status: r.status.as_str().to_string(),
                date: r.date.format(DATE_FORMAT).to_string(),
                employee_email: r.employee_email.clone(),
            })
            .collect(),
    }
}

fn account_from_record(r: AccountRecord) -> Result<Account> {
    let role =
        Role::parse(&r.role).ok_or_else(|| anyhow!("account {}: unknown role '{}'", r.email, r.role))?;
    Ok(Account {
        first_name: r.first_name,
        last_name: r.last_name,
        email: r.email,
        password: r.password,
        role,
        verified: r.verified,
    })
}

fn employee_from_record(r: EmployeeRecord) -> Result<Employee> {
    let hire_date = parse_date(&r.hire_date)
        .with_context(|| format!("employee {}: bad hireDate", r.employee_id))?;
    Ok(Employee {
        employee_id: r.employee_id,
        user_email: r.user_email,
        position: r.position,
        department_id: r.department_id,
        hire_date,
    })
}

fn request_from_record(r: RequestRecord) -> Result<Request> {
    let status = RequestStatus::parse(&r.status)
        .ok_or_else(|| anyhow!("request {}: unknown status '{}'", r.id, r.status))?;
    let date = parse_date(&r.date).with_context(|| format!("request {}: bad date", r.id))?;
    Ok(Request {
        id: r.id,
        kind: r.kind,
        items: r
            .items
            .into_iter()
            .map(|i| RequestItem::new(i.name, i.qty))
            .collect(),
        status,
        date,
        employee_email: r.employee_email,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).with_context(|| format!("'{raw}' is not YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_persisted_document_shape() {
        let raw = r#"{
            "accounts": [{"firstName":"Admin","lastName":"User","email":"admin@example.com",
                          "password":"Password123!","role":"Admin","verified":true}],
            "departments": [{"id":1,"name":"Engineering","description":"Software team"}],
            "employees": [{"employeeId":"E-1","userEmail":"admin@example.com",
                           "position":"Lead","departmentId":1,"hireDate":"2024-02-01"}],
            "requests": [{"id":1700000000000,"type":"Equipment","items":[{"name":"Laptop","qty":1}],
                          "status":"Approved","date":"2024-02-02","employeeEmail":"admin@example.com"}]
        }"#;
        let doc: SnapshotDocument = serde_json::from_str(raw).unwrap();
        let c = document_to_collections(doc.clone()).unwrap();

        assert_eq!(c.accounts[0].role, Role::Admin);
        assert_eq!(c.employees[0].hire_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(c.requests[0].status, RequestStatus::Approved);
        assert_eq!(c.requests[0].kind, "Equipment");

        assert_eq!(collections_to_document(&c), doc);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: SnapshotDocument = serde_json::from_str(r#"{"accounts": []}"#).unwrap();
        let c = document_to_collections(doc).unwrap();
        assert!(c.departments.is_empty());
        assert!(c.requests.is_empty());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let doc = SnapshotDocument {
            accounts: vec![AccountRecord {
                first_name: "A".into(),
                last_name: "B".into(),
                email: "a@b.c".into(),
                password: "secret1".into(),
                role: "Owner".into(),
                verified: true,
            }],
            ..SnapshotDocument::default()
        };
        let err = document_to_collections(doc).unwrap_err();
        assert!(err.to_string().contains("unknown role"));
    }
}
