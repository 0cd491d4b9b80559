use crate::application::JobSummary;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct JobRecord {
    job: u64,
    customer: u64,
    status: String,
    assigned_worker: Option<u64>,
    budget: String,
    payment: Option<String>,
}

impl From<&JobSummary> for JobRecord {
    fn from(summary: &JobSummary) -> Self {
        let job = &summary.job;
        Self {
            job: job.id.0,
            customer: job.customer.0,
            status: job.status.to_string(),
            assigned_worker: job.assigned_worker.map(|worker| worker.0),
            budget: job.budget.to_string(),
            payment: summary.payment.map(|status| status.to_string()),
        }
    }
}

/// Writes job summaries as CSV with the header
/// `job,customer,status,assigned_worker,budget,payment`.
pub struct JobWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> JobWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_jobs(&mut self, jobs: &[JobSummary]) -> Result<()> {
        for summary in jobs {
            self.writer.serialize(JobRecord::from(summary))?;
        }
        // Serialize only emits the header alongside the first record.
        if jobs.is_empty() {
            self.writer.write_record([
                "job",
                "customer",
                "status",
                "assigned_worker",
                "budget",
                "payment",
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
