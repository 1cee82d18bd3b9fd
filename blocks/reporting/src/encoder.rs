use chrono::{DateTime, Utc};

use catalog_atoms::products::Product;
use catalog_atoms::reports::ReportKind;
use catalog_shared::ApiError;

/// Rows rendered on the single PDF page; the rest collapse into a trailer
/// line. The spreadsheet path has no such cap.
const PDF_ROW_LIMIT: usize = 55;

pub fn extension(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Pdf => "pdf",
        ReportKind::Excel => "csv",
    }
}

pub fn content_type(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Pdf => "application/pdf",
        ReportKind::Excel => "text/csv",
    }
}

pub fn export_file_name(kind: ReportKind, now: DateTime<Utc>) -> String {
    format!(
        "products-report-{}.{}",
        now.format("%Y%m%d-%H%M%S"),
        extension(kind)
    )
}

/// Render the tabular layout (name, company, description, created date)
/// in the requested kind.
pub fn encode(kind: ReportKind, products: &[Product]) -> Result<Vec<u8>, ApiError> {
    match kind {
        ReportKind::Pdf => encode_pdf(products),
        ReportKind::Excel => Ok(encode_csv(products)),
    }
}

fn created_date(product: &Product) -> &str {
    // RFC 3339, date part only
    product.created_at.get(..10).unwrap_or(&product.created_at)
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV sheet; opens directly in Excel.
fn encode_csv(products: &[Product]) -> Vec<u8> {
    let mut out = String::from("Name,Company,Description,Created\n");
    for product in products {
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&product.name),
            csv_field(&product.company_name),
            csv_field(product.description.as_deref().unwrap_or("")),
            csv_field(created_date(product)),
        ));
    }
    out.into_bytes()
}

fn pdf_escape(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match c {
            '\\' => "\\\\".to_string(),
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            c => c.to_string(),
        })
        .collect()
}

/// Minimal single-page PDF: one Helvetica text block, hand-built xref.
/// Layout fidelity is not a goal here; readable output is.
fn encode_pdf(products: &[Product]) -> Result<Vec<u8>, ApiError> {
    let mut lines = vec![
        "Product Report".to_string(),
        String::new(),
        "Name | Company | Description | Created".to_string(),
    ];
    for product in products.iter().take(PDF_ROW_LIMIT) {
        lines.push(format!(
            "{} | {} | {} | {}",
            product.name,
            product.company_name,
            product.description.as_deref().unwrap_or(""),
            created_date(product),
        ));
    }
    if products.len() > PDF_ROW_LIMIT {
        lines.push(format!("... and {} more", products.len() - PDF_ROW_LIMIT));
    }

    let mut content = String::from("BT\n/F1 10 Tf\n50 790 Td\n12 TL\n");
    for line in &lines {
        content.push_str(&format!("({}) Tj\nT*\n", pdf_escape(line)));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut buf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(buf.len());
        buf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = buf.len();
    buf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    buf.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        buf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    buf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    Ok(buf.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn product(name: &str, company: &str, description: Option<&str>) -> Product {
        Product {
            product_id: "p-1".into(),
            name: name.into(),
            description: description.map(|d| d.to_string()),
            image_url: None,
            company_name: company.into(),
            attributes: HashMap::new(),
            user_id: "u-1".into(),
            created_at: "2026-08-01T09:30:00+00:00".into(),
        }
    }

    #[test]
    fn file_names_carry_the_kind_extension() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 14, 15, 30).unwrap();
        assert_eq!(
            export_file_name(ReportKind::Pdf, now),
            "products-report-20260830-141530.pdf"
        );
        assert_eq!(
            export_file_name(ReportKind::Excel, now),
            "products-report-20260830-141530.csv"
        );
    }

    #[test]
    fn csv_has_header_and_one_row_per_product() {
        let products = vec![
            product("Desk lamp", "acme", Some("warm light")),
            product("Chair", "globex", None),
        ];
        let out = String::from_utf8(encode(ReportKind::Excel, &products).unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name,Company,Description,Created");
        assert_eq!(lines[1], "Desk lamp,acme,warm light,2026-08-01");
        assert_eq!(lines[2], "Chair,globex,,2026-08-01");
    }

    #[test]
    fn csv_quotes_embedded_separators_and_quotes() {
        let products = vec![product("a,b", "say \"hi\"", Some("line\nbreak"))];
        let out = String::from_utf8(encode_csv(&products)).unwrap();
        assert!(out.contains("\"a,b\""));
        assert!(out.contains("\"say \"\"hi\"\"\""));
        assert!(out.contains("\"line\nbreak\""));
    }

    #[test]
    fn pdf_has_the_magic_and_every_product_name() {
        let products = vec![product("Desk lamp", "acme", None), product("Chair", "globex", None)];
        let out = encode(ReportKind::Pdf, &products).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("%PDF-"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Desk lamp | acme |  | 2026-08-01) Tj"));
        assert!(text.contains("Chair | globex"));
    }

    #[test]
    fn pdf_escapes_parentheses_in_names() {
        let products = vec![product("Lamp (small)", "acme", None)];
        let text = String::from_utf8(encode_pdf(&products).unwrap()).unwrap();
        assert!(text.contains("Lamp \\(small\\)"));
    }

    #[test]
    fn pdf_collapses_rows_past_the_page_cap() {
        let products: Vec<Product> = (0..PDF_ROW_LIMIT + 3)
            .map(|i| product(&format!("item-{}", i), "acme", None))
            .collect();
        let text = String::from_utf8(encode_pdf(&products).unwrap()).unwrap();
        assert!(text.contains("... and 3 more"));
    }
}
