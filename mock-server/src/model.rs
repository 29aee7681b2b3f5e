//! In-memory records and the JSON views the handlers return.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Hr,
    Faculty,
    Student,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "HR" => Some(Role::Hr),
            "FACULTY" => Some(Role::Faculty),
            "STUDENT" => Some(Role::Student),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Hr => "HR",
            Role::Faculty => "FACULTY",
            Role::Student => "STUDENT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pending,
    #[serde(rename = "Under Review")]
    UnderReview,
    Shortlisted,
    Interview,
    Accepted,
    Rejected,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::UnderReview => "Under Review",
            Status::Shortlisted => "Shortlisted",
            Status::Interview => "Interview",
            Status::Accepted => "Accepted",
            Status::Rejected => "Rejected",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Account {
    pub id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub mobile_no: Option<String>,
    pub location: Option<String>,
    pub role: Role,
    pub is_active: bool,
    /// Signed up through `/auth/register` while this server was running.
    pub self_registered: bool,
}

impl Account {
    pub fn user_info(&self) -> Value {
        json!({
            "id": self.id,
            "firstName": self.first_name,
            "lastName": self.last_name.clone().unwrap_or_default(),
            "email": self.email,
            "userType": self.role,
            "mobileNo": self.mobile_no,
        })
    }

    pub fn staff_view(&self) -> Value {
        json!({
            "id": self.id,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "mobileNo": self.mobile_no,
            "role": self.role.as_str(),
            "isActive": self.is_active,
            "status": if self.is_active { "Active" } else { "Inactive" },
        })
    }

    pub fn student_view(&self) -> Value {
        json!({
            "id": self.id,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "mobileNo": self.mobile_no,
            "location": self.location,
            "isActive": self.is_active,
        })
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.full_name().to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    #[serde(default)]
    pub id: u64,
    pub code: String,
    pub title: String,
    pub duration: u32,
    pub work_mode: String,
    #[serde(default)]
    pub prerequisites: Option<String>,
    pub description: String,
    pub status: String,
}

impl Posting {
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.code.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    pub fn is_open(&self) -> bool {
        self.status.eq_ignore_ascii_case("Posted")
    }
}

#[derive(Clone, Debug)]
pub struct Application {
    pub id: u64,
    pub student_id: u64,
    pub posting_id: u64,
    pub status: Status,
    pub hr_notes: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    #[serde(skip)]
    pub student_id: u64,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub related_entity_id: Option<u64>,
    pub is_read: bool,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    pub tokens: HashMap<String, u64>,
    pub accounts: BTreeMap<u64, Account>,
    pub postings: BTreeMap<u64, Posting>,
    pub applications: BTreeMap<u64, Application>,
    pub notifications: BTreeMap<u64, Notification>,
}

pub const ADMIN_EMAIL: &str = "admin@trackerpro.test";
pub const HR_EMAIL: &str = "hr@trackerpro.test";
pub const FACULTY_EMAIL: &str = "faculty@trackerpro.test";
pub const STUDENT_EMAIL: &str = "student@trackerpro.test";

impl Store {
    /// One account per role, one open and one draft posting, and a welcome
    /// notification for the student. Passwords are the role name plus `123`.
    pub fn seeded() -> Self {
        let mut store = Self::default();
        let seed = [
            ("Asha", "Admin", ADMIN_EMAIL, "admin123", Role::Admin),
            ("Priya", "Sharma", HR_EMAIL, "hr123", Role::Hr),
            ("Vikram", "Rao", FACULTY_EMAIL, "faculty123", Role::Faculty),
            ("Ravi", "Kumar", STUDENT_EMAIL, "student123", Role::Student),
        ];
        let mut student_id = 0;
        for (first, last, email, password, role) in seed {
            let id = store.next_id();
            store.accounts.insert(
                id,
                Account {
                    id,
                    first_name: first.to_string(),
                    last_name: Some(last.to_string()),
                    email: email.to_string(),
                    password: password.to_string(),
                    mobile_no: Some("9876543210".to_string()),
                    location: None,
                    role,
                    is_active: true,
                    self_registered: false,
                },
            );
            if role == Role::Student {
                student_id = id;
            }
        }
        store.insert_posting(Posting {
            id: 0,
            code: "WEB-01".to_string(),
            title: "Web Development Intern".to_string(),
            duration: 3,
            work_mode: "Remote".to_string(),
            prerequisites: Some("HTML, CSS, JavaScript".to_string()),
            description: "Build and maintain internal dashboards.".to_string(),
            status: "Posted".to_string(),
        });
        store.insert_posting(Posting {
            id: 0,
            code: "DS-01".to_string(),
            title: "Data Science Intern".to_string(),
            duration: 6,
            work_mode: "Onsite".to_string(),
            prerequisites: None,
            description: "Analyse placement data.".to_string(),
            status: "Draft".to_string(),
        });
        store.notify(
            student_id,
            "Welcome",
            "Welcome to TrackerPro".to_string(),
            "SYSTEM",
            None,
        );
        store
    }

    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn issue_token(&mut self, account_id: u64) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), account_id);
        token
    }

    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }

    pub fn accounts_with_role(&self, roles: &[Role]) -> impl Iterator<Item = &Account> + '_ {
        let roles = roles.to_vec();
        self.accounts.values().filter(move |a| roles.contains(&a.role))
    }

    pub fn students(&self, search: Option<&str>) -> Vec<&Account> {
        self.accounts_with_role(&[Role::Student])
            .filter(|a| search.is_none_or(|s| a.matches(s)))
            .collect()
    }

    /// Removes an account with its tokens, applications and notifications.
    pub fn remove_account(&mut self, id: u64) -> Option<Account> {
        let account = self.accounts.remove(&id)?;
        self.tokens.retain(|_, owner| *owner != id);
        self.applications.retain(|_, a| a.student_id != id);
        self.notifications.retain(|_, n| n.student_id != id);
        Some(account)
    }

    pub fn insert_posting(&mut self, mut posting: Posting) -> u64 {
        let id = self.next_id();
        posting.id = id;
        self.postings.insert(id, posting);
        id
    }

    pub fn notify(
        &mut self,
        student_id: u64,
        title: &str,
        message: String,
        kind: &str,
        related: Option<u64>,
    ) {
        let id = self.next_id();
        self.notifications.insert(
            id,
            Notification {
                id,
                student_id,
                title: title.to_string(),
                message,
                notification_type: kind.to_string(),
                related_entity_id: related,
                is_read: false,
            },
        );
    }

    pub fn posting_view(&self, posting: &Posting) -> Value {
        let count = self
            .applications
            .values()
            .filter(|a| a.posting_id == posting.id)
            .count();
        let mut view = json!(posting);
        view["applicationsCount"] = json!(count);
        view
    }

    /// An application with applicant and posting summaries, as HR sees it.
    pub fn hr_application_view(&self, application: &Application) -> Value {
        let student = self.accounts.get(&application.student_id);
        let posting = self.postings.get(&application.posting_id);
        json!({
            "id": application.id,
            "applicantId": format!("STU-{:04}", application.student_id),
            "status": application.status,
            "hrNotes": application.hr_notes,
            "coverLetter": application.cover_letter,
            "student": student.map(|s| json!({
                "id": s.id,
                "name": s.full_name(),
                "email": s.email,
            })),
            "internship": posting.map(|p| json!({
                "id": p.id,
                "title": p.title,
                "code": p.code,
                "workMode": p.work_mode,
            })),
        })
    }

    pub fn student_application_view(&self, application: &Application) -> Value {
        json!({
            "id": application.id,
            "careerPostId": application.posting_id,
            "internshipTitle": self.postings.get(&application.posting_id).map(|p| p.title.clone()),
            "status": application.status,
            "hrNotes": application.hr_notes,
        })
    }

    pub fn count_with_status(&self, status: Status) -> usize {
        self.applications
            .values()
            .filter(|a| a.status == status)
            .count()
    }
}
