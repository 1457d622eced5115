pub mod analyze;
pub mod business;
pub mod models;
pub mod monitor;
pub mod output;
pub mod page;
pub mod reputation;

pub use analyze::{resolve_status, Analyzer};
pub use models::{
    AnalysisSnapshot, Category, Issue, PageReport, ReportIssue, Severity, Status,
};
