use serde::{Deserialize, Serialize};

use catalog_atoms::products::Product;
use catalog_atoms::reports::Report;

/// One (year, month) bucket key.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

/// Product count for one calendar month.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    #[serde(rename = "_id")]
    pub id: YearMonth,
    pub count: u32,
}

/// Product count for one company.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CompanyBucket {
    #[serde(rename = "_id")]
    pub company: String,
    pub count: u32,
}

/// Read-only analytics view for one user.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_products: usize,
    pub companies_count: usize,
    pub products_by_month: Vec<MonthBucket>,
    pub products_by_company: Vec<CompanyBucket>,
    pub recent_products: Vec<Product>,
    pub export_history: Vec<Report>,
    pub growth_rate: f64,
}

/// What POST /export/{kind} returns to the caller.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub success: bool,
    pub file_name: String,
    pub download_url: String,
    pub email_sent: bool,
    pub report_id: String,
}

/// POST /export/{kind} request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub user_id: String,
    pub email: Option<String>,
}
