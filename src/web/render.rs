use anyhow::Result;

use crate::report::ReportTable;
use crate::scan::ScanOutcome;

/// Rows shown in the upload preview.
const PREVIEW_ROWS: usize = 5;

/// The idle page: instructional copy, the upload form, and the prompt shown
/// before any file has been submitted.
pub fn idle_page() -> String {
    page(&message("info", "Please upload a file above to begin scanning."))
}

/// The page shown when the uploaded file could not be read as a table.
pub fn parse_error_page(cause: &str) -> String {
    let body = message(
        "error",
        &format!("\u{274c} An error occurred while reading the file: {cause}"),
    );
    page(&body)
}

/// The page shown for a successfully parsed upload: success flash, preview
/// of the first rows, then the scan-results section.
pub fn results_page(report: &ReportTable, outcome: &ScanOutcome) -> Result<String> {
    let mut body = String::new();

    body.push_str(&message("success", "\u{2705} File uploaded successfully!"));
    body.push_str("<h3>\u{1f50d} Preview of Uploaded Data</h3>\n");
    body.push_str(&table_html(&report.head(PREVIEW_ROWS))?);
    body.push_str("<h3>\u{26a0}\u{fe0f} Error Scan Results</h3>\n");

    match outcome {
        ScanOutcome::Flagged { matches, .. } => {
            body.push_str(&message(
                "warning",
                "The following accounts may be inaccurate or contain negative reporting:",
            ));
            body.push_str(&table_html(matches)?);
        }
        ScanOutcome::Clean { .. } => {
            body.push_str(&message(
                "success",
                "\u{2705} No major negative indicators found in the selected column.",
            ));
        }
        ScanOutcome::NoStatusColumn => {
            body.push_str(&message(
                "error",
                "\u{26a0}\u{fe0f} No recognizable 'Status' or 'Remarks' column found. \
                 Please make sure your CSV contains one.",
            ));
        }
    }

    Ok(page(&body))
}

/// Render a table with its original column order and values.
fn table_html(table: &ReportTable) -> Result<String> {
    let mut out = String::from("<table>\n<thead><tr>");
    for name in table.column_names() {
        out.push_str(&format!("<th>{}</th>", escape_html(&name)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in table.rows()? {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    Ok(out)
}

fn message(level: &str, text: &str) -> String {
    format!(
        "<div class=\"msg {level}\">{}</div>\n",
        escape_html(text)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Wrap a results body in the shared page shell: header copy, upload form,
/// footer.
fn page(results: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>FICE - Find Inaccurate Credit Errors</title>
    <style>
        body {{ font-family: "Segoe UI", Helvetica, Arial, sans-serif; max-width: 46rem; margin: 0 auto; padding: 2rem 1rem; color: #262730; }}
        h1 {{ margin-bottom: 0; }}
        h2 {{ margin-top: 0.25rem; color: #555; font-weight: 400; }}
        table {{ border-collapse: collapse; width: 100%; margin: 0.5rem 0 1rem; }}
        th, td {{ border: 1px solid #d6d6d8; padding: 0.4rem 0.6rem; text-align: left; font-size: 0.9rem; }}
        th {{ background: #f0f2f6; }}
        .msg {{ border-radius: 0.5rem; padding: 0.75rem 1rem; margin: 0.75rem 0; }}
        .msg.info {{ background: #e8f0fe; color: #1a3f77; }}
        .msg.success {{ background: #e6f4ea; color: #1e4620; }}
        .msg.warning {{ background: #fff4e5; color: #663c00; }}
        .msg.error {{ background: #fdecea; color: #611a15; }}
        .upload {{ border: 1px dashed #c0c0c4; border-radius: 0.5rem; padding: 1rem; margin: 1rem 0; }}
        footer {{ color: #808495; font-size: 0.8rem; margin-top: 2rem; }}
        hr {{ border: none; border-top: 1px solid #d6d6d8; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>&#x1f9e0; FICE</h1>
    <h2>Find Inaccurate Credit Errors</h2>

    <p><strong>FICE</strong> (Find Inaccurate Credit Errors) is an automated agent designed to search for and identify errors on consumer credit reports.</p>
    <p>With FICE, you can:</p>
    <ul>
        <li>&#x1f50d; Detect inaccurate, outdated, or unverifiable account information</li>
        <li>&#x1f4ca; Highlight reporting violations or discrepancies</li>
        <li>&#x1f9fe; Generate reports to support dispute letters</li>
        <li>&#x2696;&#xfe0f; Stay informed and aligned with your FCRA rights</li>
    </ul>
    <hr>

    <h3>&#x1f4e4; Upload Your Credit Report</h3>
    <p>Please upload your credit report as a <strong>CSV file</strong> exported from your credit monitoring service.</p>
    <form class="upload" action="/scan" method="post" enctype="multipart/form-data">
        <input type="file" name="report" accept=".csv">
        <button type="submit">Scan report</button>
    </form>

{results}
    <hr>
    <footer>&copy; 2025 FICE - Find Inaccurate Credit Errors | Built for transparency and consumer empowerment.</footer>
</body>
</html>
"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse_report;
    use crate::scan::scan_report;
    use anyhow::Result;

    #[test]
    fn test_idle_page_contains_prompt_and_form() {
        let html = idle_page();
        assert!(html.contains("Please upload a file above to begin scanning."));
        assert!(html.contains("type=\"file\""));
        assert!(html.contains("FICE"));
    }

    #[test]
    fn test_parse_error_page_embeds_cause() {
        let html = parse_error_page("reading CSV rows: bad record");
        assert!(html.contains("An error occurred while reading the file: reading CSV rows: bad record"));
    }

    #[test]
    fn test_results_page_previews_first_five_rows() -> Result<()> {
        let csv = "Account,Status\na,Open\nb,Open\nc,Open\nd,Open\ne,Open\nf,Open\n";
        let table = parse_report(csv.as_bytes())?;
        let outcome = scan_report(&table)?;

        let html = results_page(&table, &outcome)?;
        assert!(html.contains("<td>e</td>"));
        assert!(!html.contains("<td>f</td>"), "preview must stop at five rows");
        assert!(html.contains("No major negative indicators found"));
        Ok(())
    }

    #[test]
    fn test_flagged_row_past_the_preview_still_renders() -> Result<()> {
        let csv = "Account,Status\na,Open\nb,Open\nc,Open\nd,Open\ne,Open\nf,Late\n";
        let table = parse_report(csv.as_bytes())?;
        let outcome = scan_report(&table)?;

        let html = results_page(&table, &outcome)?;
        assert!(html.contains("may be inaccurate or contain negative reporting"));
        assert!(html.contains("<td>f</td>"));
        Ok(())
    }

    #[test]
    fn test_cells_are_escaped() -> Result<()> {
        let csv = "Account,Status\n<script>alert(1)</script>,Open\n";
        let table = parse_report(csv.as_bytes())?;
        let outcome = scan_report(&table)?;

        let html = results_page(&table, &outcome)?;
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        Ok(())
    }
}
