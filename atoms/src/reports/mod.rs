pub mod http;
pub mod model;
pub mod service;

pub use model::{CreateReportPayload, Report, ReportKind, ReportStatus};
pub use service::*;
