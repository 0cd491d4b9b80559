use super::ids::{JobId, UserId};
use super::money::Amount;
use crate::error::{MarketplaceError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Open,
    InProgress,
    Closed,
    Completed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Open => "open",
            JobStatus::InProgress => "in-progress",
            JobStatus::Closed => "closed",
            JobStatus::Completed => "completed",
        };
        f.write_str(name)
    }
}

fn default_urgency() -> u16 {
    1
}

/// A job as submitted by a customer, before it is accepted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewJob {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    pub budget: Decimal,
    #[serde(default = "default_urgency")]
    #[validate(range(min = 1, max = 32767))]
    pub urgency: u16,
}

/// Partial update of a job's descriptive fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct JobUpdate {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
    pub budget: Option<Decimal>,
    #[validate(range(min = 1, max = 32767))]
    pub urgency: Option<u16>,
}

impl JobUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.budget.is_none()
            && self.urgency.is_none()
    }
}

/// Listing criteria. Unset fields match every job.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobFilter {
    pub customer: Option<UserId>,
    pub status: Option<JobStatus>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        self.customer.is_none_or(|customer| job.customer == customer)
            && self.status.is_none_or(|status| job.status == status)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Job {
    pub id: JobId,
    pub customer: UserId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub budget: Amount,
    pub urgency: u16,
    pub status: JobStatus,
    pub assigned_worker: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn post(id: JobId, customer: UserId, new_job: NewJob, now: DateTime<Utc>) -> Result<Self> {
        new_job.validate()?;
        let budget = Amount::new(new_job.budget)?;

        Ok(Self {
            id,
            customer,
            title: new_job.title,
            description: new_job.description,
            location: new_job.location,
            budget,
            urgency: new_job.urgency,
            status: JobStatus::Open,
            assigned_worker: None,
            created_at: now,
        })
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.customer == user
    }

    pub fn ensure_owned_by(&self, user: UserId) -> Result<()> {
        if self.is_owned_by(user) {
            Ok(())
        } else {
            Err(MarketplaceError::PermissionDenied(format!(
                "User {} does not own job {}",
                user, self.id
            )))
        }
    }

    /// Worker set if and only if the job is in progress or completed.
    pub fn is_consistent(&self) -> bool {
        self.assigned_worker.is_some()
            == matches!(self.status, JobStatus::InProgress | JobStatus::Completed)
    }

    pub fn ensure_accepting_bids(&self) -> Result<()> {
        if self.status == JobStatus::Open {
            Ok(())
        } else {
            Err(MarketplaceError::InvalidState(format!(
                "Job {} is {} and not accepting bids",
                self.id, self.status
            )))
        }
    }

    pub fn apply(&mut self, update: JobUpdate) -> Result<()> {
        update.validate()?;
        if update.is_empty() {
            return Err(MarketplaceError::ValidationError(
                "Job update must change at least one field".to_string(),
            ));
        }
        if self.status != JobStatus::Open {
            return Err(MarketplaceError::InvalidState(format!(
                "Job {} is {} and can no longer be edited",
                self.id, self.status
            )));
        }
        let budget = update.budget.map(Amount::new).transpose()?;

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(budget) = budget {
            self.budget = budget;
        }
        if let Some(urgency) = update.urgency {
            self.urgency = urgency;
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        if self.status != JobStatus::Open {
            return Err(MarketplaceError::InvalidState(format!(
                "Only open jobs can be closed, job {} is {}",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Closed;
        Ok(())
    }

    /// Hands the job to `worker`. `budget` replaces the posted budget when given.
    pub fn assign(&mut self, worker: UserId, budget: Option<Amount>) -> Result<()> {
        if self.assigned_worker.is_some() {
            return Err(MarketplaceError::InvalidState(format!(
                "Job {} has already been assigned",
                self.id
            )));
        }
        if self.status != JobStatus::Open {
            return Err(MarketplaceError::InvalidState(format!(
                "Job {} is {} and cannot be assigned",
                self.id, self.status
            )));
        }

        self.assigned_worker = Some(worker);
        self.status = JobStatus::InProgress;
        if let Some(budget) = budget {
            self.budget = budget;
        }
        Ok(())
    }

    pub fn unassign(&mut self) -> Result<()> {
        if self.status != JobStatus::InProgress {
            return Err(MarketplaceError::InvalidState(format!(
                "Job {} is {} and has no worker to unassign",
                self.id, self.status
            )));
        }
        self.assigned_worker = None;
        self.status = JobStatus::Open;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<()> {
        if self.status != JobStatus::InProgress {
            return Err(MarketplaceError::InvalidState(format!(
                "Job {} is {} and cannot be completed",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Completed;
        Ok(())
    }

    pub fn ensure_completed(&self) -> Result<()> {
        if self.status == JobStatus::Completed {
            Ok(())
        } else {
            Err(MarketplaceError::InvalidState(format!(
                "Job {} is {}, reviews require a completed job",
                self.id, self.status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_job() -> NewJob {
        NewJob {
            title: "Fix kitchen sink".to_string(),
            description: "Leaking under the counter".to_string(),
            location: "Dhaka".to_string(),
            budget: dec!(120.00),
            urgency: 1,
        }
    }

    fn open_job() -> Job {
        Job::post(JobId(1), UserId(10), new_job(), Utc::now()).unwrap()
    }

    #[test]
    fn test_post_job_starts_open() {
        let job = open_job();
        assert_eq!(job.status, JobStatus::Open);
        assert_eq!(job.assigned_worker, None);
        assert!(job.is_consistent());
    }

    #[test]
    fn test_post_job_validation() {
        let mut draft = new_job();
        draft.title = String::new();
        assert!(matches!(
            Job::post(JobId(1), UserId(10), draft, Utc::now()),
            Err(MarketplaceError::ValidationError(_))
        ));

        let mut draft = new_job();
        draft.description = "x".repeat(256);
        assert!(matches!(
            Job::post(JobId(1), UserId(10), draft, Utc::now()),
            Err(MarketplaceError::ValidationError(_))
        ));

        let mut draft = new_job();
        draft.budget = dec!(0);
        assert!(matches!(
            Job::post(JobId(1), UserId(10), draft, Utc::now()),
            Err(MarketplaceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_assign_and_unassign() {
        let mut job = open_job();
        job.assign(UserId(20), None).unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.assigned_worker, Some(UserId(20)));
        assert_eq!(job.budget.value(), dec!(120.00));
        assert!(job.is_consistent());

        job.unassign().unwrap();
        assert_eq!(job.status, JobStatus::Open);
        assert_eq!(job.assigned_worker, None);
        assert!(job.is_consistent());
    }

    #[test]
    fn test_assign_overwrites_budget_when_requested() {
        let mut job = open_job();
        let bid_amount = Amount::new(dec!(95.50)).unwrap();
        job.assign(UserId(20), Some(bid_amount)).unwrap();
        assert_eq!(job.budget, bid_amount);
    }

    #[test]
    fn test_assign_twice_is_rejected() {
        let mut job = open_job();
        job.assign(UserId(20), None).unwrap();
        assert!(matches!(
            job.assign(UserId(21), None),
            Err(MarketplaceError::InvalidState(_))
        ));
        assert_eq!(job.assigned_worker, Some(UserId(20)));
    }

    #[test]
    fn test_closed_job_rejects_bids_and_assignment() {
        let mut job = open_job();
        job.close().unwrap();
        assert!(job.ensure_accepting_bids().is_err());
        assert!(job.assign(UserId(20), None).is_err());
        assert!(job.is_consistent());
    }

    #[test]
    fn test_complete_requires_in_progress() {
        let mut job = open_job();
        assert!(job.complete().is_err());
        job.assign(UserId(20), None).unwrap();
        job.complete().unwrap();
        assert!(job.ensure_completed().is_ok());
        assert!(job.is_consistent());
        assert!(job.unassign().is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut job = open_job();
        job.apply(JobUpdate {
            title: Some("Replace kitchen sink".to_string()),
            budget: Some(dec!(300)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(job.title, "Replace kitchen sink");
        assert_eq!(job.location, "Dhaka");
        assert_eq!(job.budget.value(), dec!(300));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let mut job = open_job();
        let before = job.clone();
        let result = job.apply(JobUpdate::default());
        assert!(matches!(result, Err(MarketplaceError::ValidationError(_))));
        assert_eq!(job, before);
    }

    #[test]
    fn test_urgency_accepts_small_integer_range() {
        let mut job = open_job();
        job.apply(JobUpdate {
            urgency: Some(300),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(job.urgency, 300);

        let result = job.apply(JobUpdate {
            urgency: Some(40000),
            ..Default::default()
        });
        assert!(matches!(result, Err(MarketplaceError::ValidationError(_))));
    }

    #[test]
    fn test_update_rejected_once_assigned() {
        let mut job = open_job();
        job.assign(UserId(20), None).unwrap();
        let result = job.apply(JobUpdate {
            title: Some("Other".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(MarketplaceError::InvalidState(_))));
    }

    #[test]
    fn test_filter_matches() {
        let job = open_job();
        assert!(JobFilter::default().matches(&job));
        assert!(
            JobFilter {
                customer: Some(UserId(10)),
                status: Some(JobStatus::Open)
            }
            .matches(&job)
        );
        assert!(
            !JobFilter {
                customer: Some(UserId(11)),
                status: None
            }
            .matches(&job)
        );
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(JobStatus::InProgress.to_string(), "in-progress");
    }
}
