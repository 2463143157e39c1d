use scraper::{ElementRef, Html, Selector};
use statement_core::{FiscalYear, YearRecord};

/// Tables inspected per page.
const MAX_TABLES: usize = 3;

/// Data rows inspected per table, after the header row.
const MAX_ROWS: usize = 4;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Parse a scraped cell like `"12,345.67"`, `"1.2M"` or `"3B"` into a number.
pub fn extract_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let (digits, multiplier) = if let Some(rest) = text.strip_suffix('M') {
        (rest, 1_000_000.0)
    } else if let Some(rest) = text.strip_suffix('B') {
        (rest, 1_000_000_000.0)
    } else {
        (text, 1.0)
    };

    let cleaned: String = digits
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().map(|v| v * multiplier)
}

/// First `20xx` year mentioned in `text`.
fn find_year(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    (0..bytes.len().saturating_sub(3))
        .find(|&i| bytes[i] == b'2' && bytes[i + 1] == b'0' && bytes[i + 2..i + 4].iter().all(u8::is_ascii_digit))
        .map(|i| &text[i..i + 4])
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>()
}

fn row_record(row: ElementRef<'_>, td: &Selector) -> Option<YearRecord> {
    let cells: Vec<ElementRef<'_>> = row.select(td).collect();
    if cells.len() < 2 {
        return None;
    }

    let year = find_year(cell_text(&cells[0]).trim())?.to_string();
    let column = |i: usize| cells.get(i).and_then(|c| extract_number(&cell_text(c)));

    Some(YearRecord {
        label: Some(format!("FY{}", &year[2..])),
        year: Some(FiscalYear::Text(year)),
        revenue: column(1),
        ar: column(2),
        cash: column(3),
        debt: column(4),
        equity: None,
    })
}

/// Pull yearly figures out of the first few tables of a statement page.
///
/// Rows are read as `year | revenue | receivables | cash | debt`; rows whose
/// first cell carries no `20xx` year are skipped. Never returns an empty list:
/// a page without tables yields a single `"No Data"` record and a page without
/// matching rows a single `"No Data Found"` record.
pub fn parse_financial_tables(html: &str) -> Vec<YearRecord> {
    let document = Html::parse_document(html);
    let (table, tr, td) = (selector("table"), selector("tr"), selector("td"));

    let tables: Vec<ElementRef<'_>> = document.select(&table).take(MAX_TABLES).collect();
    if tables.is_empty() {
        tracing::debug!("No tables found in statement page");
        return vec![YearRecord::labelled("No Data")];
    }

    let years: Vec<YearRecord> = tables
        .iter()
        .flat_map(|t| t.select(&tr).skip(1).take(MAX_ROWS))
        .filter_map(|row| row_record(row, &td))
        .collect();

    if years.is_empty() {
        tracing::debug!("Statement page had {} tables but no yearly rows", tables.len());
        return vec![YearRecord::labelled("No Data Found")];
    }
    years
}
