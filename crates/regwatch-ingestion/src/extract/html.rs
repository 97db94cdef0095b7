//! HTML text and listing-table extraction.
//!
//! Source listing pages are DataTables-style tables: one row per
//! publication with a date cell, a title/product cell and links to either a
//! detail page or a PDF. Detail pages are WordPress-ish articles where the
//! useful text sits under `main`/`article`/`.entry-content`.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

lazy_static! {
    static ref CONTENT_SELECTORS: Vec<Selector> = ["main", "article", ".entry-content", ".content", "body"]
        .iter()
        .map(|s| Selector::parse(s).expect("static selector"))
        .collect();
    static ref ROW_SELECTOR: Selector = Selector::parse("table tbody tr, table tr").expect("static selector");
    static ref CELL_SELECTOR: Selector = Selector::parse("td, th").expect("static selector");
    static ref LINK_SELECTOR: Selector = Selector::parse("a[href]").expect("static selector");
}

/// Extract visible text from an HTML document, preferring the main content
/// area and skipping script/style/noscript subtrees.
pub fn extract_visible_text(html_text: &str) -> String {
    let doc = Html::parse_document(html_text);
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(root) = doc.select(selector).next() {
            let text = visible_text(root);
            if !text.trim().is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        if let Some(text) = node.value().as_text() {
            let hidden = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| matches!(el.value().name(), "script" | "style" | "noscript"));
            if hidden {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push_str(trimmed);
                out.push('\n');
            }
        }
    }
    out
}

/// One row of a listing table.
#[derive(Debug, Clone, Default)]
pub struct ListingRow {
    /// Cell texts in table order.
    pub cells: Vec<String>,
    /// Absolute URL of the per-item detail page, if linked.
    pub detail_url: Option<String>,
    /// Absolute URL of a directly linked PDF, if any.
    pub pdf_url: Option<String>,
}

/// Parse a listing page into rows, resolving relative links against
/// `base_url` and skipping header rows.
pub fn parse_listing(html_text: &str, base_url: &str) -> Vec<ListingRow> {
    let doc = Html::parse_document(html_text);
    let base = Url::parse(base_url).ok();

    let mut rows = Vec::new();
    for row in doc.select(&ROW_SELECTOR) {
        let cells: Vec<String> = row
            .select(&CELL_SELECTOR)
            .map(|c| c.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();

        if cells.len() < 2 || is_header_row(&cells) {
            continue;
        }

        let mut listing = ListingRow { cells, ..Default::default() };
        for link in row.select(&LINK_SELECTOR) {
            let href = match link.value().attr("href") {
                Some(h) if !h.trim().is_empty() => h,
                _ => continue,
            };
            let absolute = absolutize(href, base.as_ref());
            if href.to_lowercase().split('?').next().unwrap_or("").ends_with(".pdf") {
                listing.pdf_url.get_or_insert(absolute);
            } else {
                listing.detail_url.get_or_insert(absolute);
            }
        }
        rows.push(listing);
    }
    rows
}

fn absolutize(href: &str, base: Option<&Url>) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match base.and_then(|b| b.join(href).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}

/// Header rows repeat the column labels as cell text.
fn is_header_row(cells: &[String]) -> bool {
    const HEADER_WORDS: [&str; 5] = ["date", "product name", "manufacturer", "batch", "title"];
    cells
        .iter()
        .all(|c| {
            let lower = c.to_lowercase();
            lower.is_empty() || HEADER_WORDS.iter().any(|w| lower == *w || lower.starts_with(w))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body><table><tbody>
          <tr><th>Date</th><th>Product Name</th></tr>
          <tr>
            <td>15/03/2023</td>
            <td><a href="/recalls/paracetamol-syrup/">Paracetamol Syrup</a></td>
          </tr>
          <tr>
            <td>01/02/2023</td>
            <td><a href="/wp-content/uploads/alert.pdf">Counterfeit Alert</a></td>
          </tr>
        </tbody></table></body></html>
    "#;

    #[test]
    fn test_parse_listing_skips_header_and_resolves_links() {
        let rows = parse_listing(LISTING, "https://fda.example.gov/newsroom/");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells[0], "15/03/2023");
        assert_eq!(
            rows[0].detail_url.as_deref(),
            Some("https://fda.example.gov/recalls/paracetamol-syrup/")
        );
        assert!(rows[0].pdf_url.is_none());
        assert_eq!(
            rows[1].pdf_url.as_deref(),
            Some("https://fda.example.gov/wp-content/uploads/alert.pdf")
        );
    }

    #[test]
    fn test_visible_text_strips_script_and_style() {
        let html = r#"
            <html><body>
              <style>p { color: red; }</style>
              <script>var x = 1;</script>
              <main><p>Reason for recall: contamination</p></main>
            </body></html>
        "#;
        let text = extract_visible_text(html);
        assert!(text.contains("Reason for recall: contamination"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_empty_body_yields_empty_text() {
        assert!(extract_visible_text("<html><body></body></html>").trim().is_empty());
    }
}
