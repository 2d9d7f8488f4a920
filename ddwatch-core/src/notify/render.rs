//! Subject, HTML and plain-text rendering of an [`AlertReport`].

use std::fmt::Write as _;

use super::AlertReport;

const COLUMNS: [&str; 7] = [
    "Hostname",
    "Address",
    "Total (GB)",
    "Used (GB)",
    "Available (GB)",
    "Use %",
    "Cleanable (GB)",
];

/// Mail subject, also used as the HTML title
#[must_use]
pub fn subject(report: &AlertReport) -> String {
    format!(
        "Data Domain capacity alert - {}",
        report.generated_on.format("%Y-%m-%d")
    )
}

/// Escapes text for inclusion in HTML element content or attributes
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn row_cells(report: &AlertReport) -> Vec<[String; 7]> {
    report
        .readings
        .iter()
        .map(|r| {
            let f = &r.reading.figures;
            [
                r.host.hostname.clone(),
                r.host.address.clone(),
                format!("{:.2}", f.total_gb),
                format!("{:.2}", f.used_gb),
                format!("{:.2}", f.available_gb),
                format!("{}%", f.use_percent),
                format!("{:.2}", f.reclaimable_gb),
            ]
        })
        .collect()
}

/// HTML body: title, readings table and optional history section
#[must_use]
pub fn render_html(report: &AlertReport) -> String {
    let mut html = String::new();
    let title = escape_html(&subject(report));

    let _ = write!(
        html,
        "<html><head><meta charset=\"utf-8\"><title>{title}</title></head><body>\n\
         <h1>{title}</h1>\n\
         <p>Alert threshold: {}</p>\n\
         <h3>Server statistics</h3>\n\
         <table border=\"1\" cellpadding=\"5\">\n<tr>",
        report.threshold
    );
    for column in COLUMNS {
        let _ = write!(html, "<th>{column}</th>");
    }
    html.push_str("</tr>\n");

    for (reading, cells) in report.readings.iter().zip(row_cells(report)) {
        if report.threshold.is_met_by(reading.reading.use_percent()) {
            html.push_str("<tr style=\"background-color: #ffd6d6;\">");
        } else {
            html.push_str("<tr>");
        }
        for cell in &cells {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    if !report.history.is_empty() {
        let _ = write!(
            html,
            "<h3>Usage over the last {} days</h3>\n\
             <table border=\"1\" cellpadding=\"5\">\n\
             <tr><th>Hostname</th><th>Samples</th><th>Min %</th><th>Max %</th><th>Latest %</th></tr>\n",
            report.history_days
        );
        for trend in &report.history {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}%</td><td>{}%</td><td>{}%</td></tr>",
                escape_html(&trend.host.hostname),
                trend.samples,
                trend.min_percent,
                trend.max_percent,
                trend.latest_percent
            );
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body></html>\n");
    html
}

/// Plain-text alternative with the same rows as the HTML table
#[must_use]
pub fn render_text(report: &AlertReport) -> String {
    let rows = row_cells(report);
    let mut widths = COLUMNS.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut text = String::new();
    let _ = writeln!(text, "{}", subject(report));
    let _ = writeln!(text, "Alert threshold: {}", report.threshold);
    text.push('\n');

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}"))
        .collect();
    let _ = writeln!(text, "{}", header.join("  ").trim_end());

    for cells in &rows {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        let _ = writeln!(text, "{}", line.join("  ").trim_end());
    }

    if !report.history.is_empty() {
        let _ = writeln!(text, "\nUsage over the last {} days:", report.history_days);
        for trend in &report.history {
            let _ = writeln!(
                text,
                "  {}: {} samples, min {}%, max {}%, latest {}%",
                trend.host.hostname,
                trend.samples,
                trend.min_percent,
                trend.max_percent,
                trend.latest_percent
            );
        }
    }
    text
}
