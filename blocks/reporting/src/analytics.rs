use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, Datelike, Utc};
use lambda_http::{http::StatusCode, Body, Error, Response};
use std::collections::BTreeMap;

use crate::types::{AnalyticsSummary, CompanyBucket, MonthBucket, YearMonth};
use catalog_atoms::products::{self, Product};
use catalog_atoms::reports::{self, Report};
use catalog_atoms::users;
use catalog_shared::error::{error_response, ApiError};

/// Calendar months included in the by-month series, current month inclusive.
const MONTH_WINDOW: i32 = 6;

/// Company buckets returned, biggest first.
const COMPANY_LIMIT: usize = 10;

/// Products echoed back as recent activity.
const RECENT_LIMIT: usize = 5;

/// Report records echoed back as export history.
const HISTORY_LIMIT: usize = 10;

/// GET /analytics/{userId}
pub async fn handle_analytics(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match compute_analytics(client, table_name, user_id).await {
        Ok(summary) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&summary)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

/// Assemble the analytics view for one user.
///
/// The owner id must parse and resolve before anything is aggregated; a
/// user with zero products gets zeroed counts and empty product
/// collections, never an error. `exportHistory` is the exception: it is
/// fetched either way, so an owner whose products were all deleted still
/// sees their past reports.
pub async fn compute_analytics(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<AnalyticsSummary, ApiError> {
    if uuid::Uuid::parse_str(user_id).is_err() {
        return Err(ApiError::InvalidIdentifier(user_id.to_string()));
    }

    if users::service::load_user(client, table_name, user_id)
        .await?
        .is_none()
    {
        return Err(ApiError::UserNotFound);
    }

    let (products_result, reports_result) = tokio::join!(
        products::service::load_products_for_user(client, table_name, user_id),
        reports::service::load_reports_for_user(client, table_name, user_id)
    );
    let products = products_result?;
    let export_history = reports_result?;

    Ok(summarize(&products, export_history, Utc::now()))
}

/// Pure aggregation over an owner's products (newest-first) and report
/// history (newest-first).
pub fn summarize(
    products: &[Product],
    mut export_history: Vec<Report>,
    now: DateTime<Utc>,
) -> AnalyticsSummary {
    export_history.truncate(HISTORY_LIMIT);

    AnalyticsSummary {
        total_products: products.len(),
        companies_count: distinct_companies(products),
        products_by_month: products_by_month(products, now),
        products_by_company: products_by_company(products),
        recent_products: products.iter().take(RECENT_LIMIT).cloned().collect(),
        export_history,
        growth_rate: growth_rate(products, now),
    }
}

fn created_year_month(product: &Product) -> Option<(i32, u32)> {
    DateTime::parse_from_rfc3339(&product.created_at)
        .ok()
        .map(|dt| {
            let dt = dt.with_timezone(&Utc);
            (dt.year(), dt.month())
        })
}

fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + month as i32 - 1
}

fn distinct_companies(products: &[Product]) -> usize {
    let mut companies: Vec<&str> = products.iter().map(|p| p.company_name.as_str()).collect();
    companies.sort_unstable();
    companies.dedup();
    companies.len()
}

/// Counts per (year, month) over the trailing window, ascending.
fn products_by_month(products: &[Product], now: DateTime<Utc>) -> Vec<MonthBucket> {
    let now_index = month_index(now.year(), now.month());

    let mut buckets: BTreeMap<(i32, u32), u32> = BTreeMap::new();
    for product in products {
        if let Some((year, month)) = created_year_month(product) {
            let age = now_index - month_index(year, month);
            if (0..MONTH_WINDOW).contains(&age) {
                *buckets.entry((year, month)).or_insert(0) += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), count)| MonthBucket {
            id: YearMonth { year, month },
            count,
        })
        .collect()
}

/// Counts per company over ALL products, biggest first, top 10.
/// Ties break on company name ascending.
fn products_by_company(products: &[Product]) -> Vec<CompanyBucket> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for product in products {
        *counts.entry(product.company_name.as_str()).or_insert(0) += 1;
    }

    let mut buckets: Vec<CompanyBucket> = counts
        .into_iter()
        .map(|(company, count)| CompanyBucket {
            company: company.to_string(),
            count,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.company.cmp(&b.company)));
    buckets.truncate(COMPANY_LIMIT);

    buckets
}

/// Month-over-month growth: point-to-point delta between the current and
/// previous calendar month, one decimal place. An empty previous month
/// yields 100 (anything from nothing) or 0 (nothing at all). Deliberately
/// not a rolling average, so low-volume months swing hard.
fn growth_rate(products: &[Product], now: DateTime<Utc>) -> f64 {
    let this_month = (now.year(), now.month());
    let last_month = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };

    let count_in = |ym: (i32, u32)| {
        products
            .iter()
            .filter(|p| created_year_month(p) == Some(ym))
            .count() as f64
    };

    let this_month_count = count_in(this_month);
    let last_month_count = count_in(last_month);

    if last_month_count == 0.0 {
        return if this_month_count > 0.0 { 100.0 } else { 0.0 };
    }

    let rate = (this_month_count - last_month_count) / last_month_count * 100.0;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_atoms::reports::{ReportKind, ReportStatus};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn product(company: &str, created: DateTime<Utc>) -> Product {
        Product {
            product_id: uuid::Uuid::new_v4().to_string(),
            name: "widget".into(),
            description: None,
            image_url: None,
            company_name: company.into(),
            attributes: HashMap::new(),
            user_id: "u-1".into(),
            created_at: created.to_rfc3339(),
        }
    }

    fn report(created: DateTime<Utc>) -> Report {
        Report {
            report_id: uuid::Uuid::new_v4().to_string(),
            user_id: "u-1".into(),
            products: vec![],
            report_type: ReportKind::Pdf,
            file_name: "r.pdf".into(),
            file_url: None,
            email_sent: false,
            sent_to_email: None,
            created_at: created.to_rfc3339(),
            file_size: None,
            status: ReportStatus::Completed,
        }
    }

    #[test]
    fn empty_owner_gets_the_zero_summary() {
        let summary = summarize(&[], vec![], at(2026, 8, 15));
        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.companies_count, 0);
        assert!(summary.products_by_month.is_empty());
        assert!(summary.products_by_company.is_empty());
        assert!(summary.recent_products.is_empty());
        assert!(summary.export_history.is_empty());
        assert_eq!(summary.growth_rate, 0.0);
    }

    #[test]
    fn growth_rate_zero_last_month_is_100_or_0() {
        let now = at(2026, 8, 15);
        let five_this_month: Vec<Product> =
            (0..5).map(|_| product("acme", at(2026, 8, 3))).collect();
        assert_eq!(growth_rate(&five_this_month, now), 100.0);
        assert_eq!(growth_rate(&[], now), 0.0);
    }

    #[test]
    fn growth_rate_is_a_point_to_point_delta() {
        let now = at(2026, 8, 15);

        let mut products: Vec<Product> = (0..8).map(|_| product("a", at(2026, 8, 2))).collect();
        products.extend((0..4).map(|_| product("a", at(2026, 7, 2))));
        assert_eq!(growth_rate(&products, now), 100.0);

        let mut products: Vec<Product> = (0..3).map(|_| product("a", at(2026, 8, 2))).collect();
        products.extend((0..6).map(|_| product("a", at(2026, 7, 2))));
        assert_eq!(growth_rate(&products, now), -50.0);
    }

    #[test]
    fn growth_rate_rounds_to_one_decimal() {
        let now = at(2026, 8, 15);
        let mut products: Vec<Product> = (0..1).map(|_| product("a", at(2026, 8, 2))).collect();
        products.extend((0..3).map(|_| product("a", at(2026, 7, 2))));
        // (1 - 3) / 3 * 100 = -66.666...
        assert_eq!(growth_rate(&products, now), -66.7);
    }

    #[test]
    fn growth_rate_january_looks_at_previous_december() {
        let now = at(2027, 1, 10);
        let products = vec![
            product("a", at(2027, 1, 2)),
            product("a", at(2026, 12, 20)),
            product("a", at(2026, 12, 21)),
        ];
        assert_eq!(growth_rate(&products, now), -50.0);
    }

    #[test]
    fn month_buckets_cover_only_the_trailing_window() {
        let now = at(2026, 8, 15);
        let products = vec![
            product("a", at(2026, 8, 1)),  // age 0
            product("a", at(2026, 3, 1)),  // age 5, last included month
            product("a", at(2026, 2, 28)), // age 6, out
            product("a", at(2025, 8, 1)),  // a year old, out
        ];

        let buckets = products_by_month(&products, now);
        assert_eq!(
            buckets,
            vec![
                MonthBucket {
                    id: YearMonth { year: 2026, month: 3 },
                    count: 1
                },
                MonthBucket {
                    id: YearMonth { year: 2026, month: 8 },
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn month_buckets_are_ascending_across_a_year_boundary() {
        let now = at(2027, 2, 10);
        let products = vec![
            product("a", at(2027, 2, 1)),
            product("a", at(2026, 11, 5)),
            product("a", at(2026, 11, 6)),
            product("a", at(2027, 1, 9)),
        ];

        let buckets = products_by_month(&products, now);
        let keys: Vec<(i32, u32)> = buckets.iter().map(|b| (b.id.year, b.id.month)).collect();
        assert_eq!(keys, vec![(2026, 11), (2027, 1), (2027, 2)]);
        assert_eq!(buckets[0].count, 2);
    }

    #[test]
    fn company_buckets_sort_by_count_then_name_and_cap_at_ten() {
        let now = at(2026, 8, 15);
        let mut products = Vec::new();
        for (company, n) in [("beta", 2), ("alpha", 2), ("gamma", 5)] {
            for _ in 0..n {
                products.push(product(company, at(2026, 8, 1)));
            }
        }
        for i in 0..12 {
            products.push(product(&format!("solo-{:02}", i), now));
        }

        let buckets = products_by_company(&products);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].company, "gamma");
        assert_eq!(buckets[1].company, "alpha");
        assert_eq!(buckets[2].company, "beta");
    }

    #[test]
    fn recent_products_are_a_prefix_of_the_newest_first_list() {
        let now = at(2026, 8, 15);
        let products: Vec<Product> = (0..8)
            .map(|i| product("acme", at(2026, 8, 14 - i)))
            .collect();

        let summary = summarize(&products, vec![], now);
        assert_eq!(summary.recent_products.len(), 5);
        for (recent, original) in summary.recent_products.iter().zip(products.iter()) {
            assert_eq!(recent.product_id, original.product_id);
        }
    }

    #[test]
    fn zero_product_owner_keeps_report_history() {
        let now = at(2026, 8, 15);
        let summary = summarize(&[], vec![report(now)], now);
        assert_eq!(summary.total_products, 0);
        assert!(summary.products_by_month.is_empty());
        assert_eq!(summary.export_history.len(), 1);
    }

    #[test]
    fn export_history_truncates_to_ten() {
        let now = at(2026, 8, 15);
        let history: Vec<Report> = (0..14).map(|i| report(at(2026, 8, 14 - i % 10))).collect();

        let summary = summarize(&[], history, now);
        assert_eq!(summary.export_history.len(), 10);
    }

    #[test]
    fn distinct_companies_counts_names_once() {
        let now = at(2026, 8, 15);
        let products = vec![
            product("acme", now),
            product("acme", now),
            product("globex", now),
        ];
        let summary = summarize(&products, vec![], now);
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.companies_count, 2);
    }

    #[test]
    fn summary_serializes_the_documented_shape() {
        let now = at(2026, 8, 15);
        let products = vec![product("acme", at(2026, 8, 1))];
        let summary = summarize(&products, vec![], now);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalProducts"], 1);
        assert_eq!(json["companiesCount"], 1);
        assert_eq!(json["productsByMonth"][0]["_id"]["year"], 2026);
        assert_eq!(json["productsByMonth"][0]["_id"]["month"], 8);
        assert_eq!(json["productsByMonth"][0]["count"], 1);
        assert_eq!(json["productsByCompany"][0]["_id"], "acme");
        assert_eq!(json["growthRate"], 100.0);
    }
}
