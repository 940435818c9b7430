//! Test data builders for domain entities.

use chrono::{DateTime, NaiveDate, Utc};

use rozgar_domain::entities::{Job, JobStatus, Worker};

/// Builder for Worker entities
pub struct WorkerBuilder {
    id: String,
    name: String,
    email: String,
    phone: String,
    district: String,
    disabled: bool,
    days_worked: i64,
    registered_at: DateTime<Utc>,
}

impl WorkerBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("worker-{id}"),
            email: format!("{id}@example.com"),
            phone: format!("9{:09}", id.len()),
            district: "District-A".to_string(),
            disabled: false,
            days_worked: 0,
            registered_at: Utc::now(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.phone = phone.to_string();
        self
    }

    pub fn district(mut self, district: &str) -> Self {
        self.district = district.to_string();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn days_worked(mut self, days: i64) -> Self {
        self.days_worked = days;
        self
    }

    pub fn registered_at(mut self, at: DateTime<Utc>) -> Self {
        self.registered_at = at;
        self
    }

    pub fn build(self) -> Worker {
        Worker {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            district: self.district,
            disabled: self.disabled,
            days_worked: self.days_worked,
            registered_at: self.registered_at,
        }
    }
}

/// Builder for Job entities
pub struct JobBuilder {
    id: String,
    district: String,
    work_category: String,
    start_date: NaiveDate,
    duration_days: i64,
    workers_required: i64,
    daily_wage: f64,
    status: JobStatus,
    created_by: String,
}

impl JobBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            district: "District-A".to_string(),
            work_category: "road-repair".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            duration_days: 30,
            workers_required: 2,
            daily_wage: 350.0,
            status: JobStatus::Active,
            created_by: "GOV0001".to_string(),
        }
    }

    pub fn district(mut self, district: &str) -> Self {
        self.district = district.to_string();
        self
    }

    pub fn work_category(mut self, category: &str) -> Self {
        self.work_category = category.to_string();
        self
    }

    pub fn workers_required(mut self, count: i64) -> Self {
        self.workers_required = count;
        self
    }

    pub fn daily_wage(mut self, wage: f64) -> Self {
        self.daily_wage = wage;
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Job {
        Job {
            id: self.id,
            district: self.district,
            work_category: self.work_category,
            start_date: self.start_date,
            duration_days: self.duration_days,
            workers_required: self.workers_required,
            daily_wage: self.daily_wage,
            status: self.status,
            created_by: self.created_by,
            created_at: Utc::now(),
        }
    }
}
