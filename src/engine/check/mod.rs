pub mod job_checker;

pub use job_checker::{CheckReport, JobChecker, Unfinished};
