use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of generated export artifact.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Pdf,
    Excel,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Excel => write!(f, "excel"),
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "excel" => Ok(Self::Excel),
            other => Err(format!("Unknown export kind: {}", other)),
        }
    }
}

/// Report lifecycle. Only `generating -> completed` and
/// `generating -> failed` ever happen; the service layer exposes no other
/// transition.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Generating,
    Completed,
    Failed,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generating => write!(f, "generating"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generating" => Ok(Self::Generating),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("Unknown report status: {}", other)),
        }
    }
}

/// One generated export artifact and its delivery state.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id")]
    pub report_id: String,
    pub user_id: String,
    /// Product ids covered by this report.
    #[serde(default)]
    pub products: Vec<String>,
    pub report_type: ReportKind,
    pub file_name: String,
    /// The frontend reads `pdfUrl` for both kinds.
    #[serde(rename = "pdfUrl", skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_to_email: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    pub status: ReportStatus,
}

/// Raw report-record creation (legacy POST /api/reports path).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    pub user_id: String,
    #[serde(default)]
    pub products: Vec<String>,
    pub report_type: ReportKind,
    pub file_name: String,
    #[serde(rename = "pdfUrl")]
    pub file_url: Option<String>,
    #[serde(default)]
    pub email_sent: bool,
    pub sent_to_email: Option<String>,
    pub file_size: Option<i64>,
    #[serde(default)]
    pub status: ReportStatus,
}
