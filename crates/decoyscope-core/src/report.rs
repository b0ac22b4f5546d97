//! Standalone HTML snapshot of the dashboard.
//!
//! Built from the same view models the terminal draws, so the text is
//! already truncated and stripped; every interpolated value is escaped
//! again for HTML. No scripts, no external assets.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::render::{self, Section};
use crate::state::DashboardState;
use crate::text::escape_html;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;background:#0f1117;color:#e6e6e6}\
h1,h2{font-weight:600}table{border-collapse:collapse;margin-bottom:1.5rem}\
td,th{border:1px solid #333;padding:.3rem .6rem;text-align:left}\
.counter{display:inline-block;margin-right:2rem}.muted{color:#888}\
.online{color:#4caf50}.offline{color:#f44336}.error{color:#ff9800}";

/// Render the current state as a complete HTML document.
pub fn render_html(state: &DashboardState, generated_at: DateTime<Local>) -> String {
    let status = render::status_indicator(state);
    let status_class = match status.state {
        render::ServiceState::Online => "online",
        render::ServiceState::Offline => "offline",
        render::ServiceState::Error | render::ServiceState::Unknown => "error",
    };
    let last_updated = state.last_updated.map_or_else(
        || "never".to_owned(),
        |t| t.format("%d/%m/%Y %H:%M:%S").to_string(),
    );

    let mut body = String::new();
    let _ = write!(
        body,
        r#"<h1>Decoy service snapshot</h1>
<p class="muted">Generated {generated} &middot; last refresh {last_updated}</p>
<p>Status: <span class="{status_class}">{status}</span> ({subtitle})</p>
"#,
        generated = escape_html(&generated_at.format("%d/%m/%Y %H:%M:%S").to_string()),
        last_updated = escape_html(&last_updated),
        status = escape_html(&status.state.to_string()),
        subtitle = escape_html(status.subtitle),
    );

    body.push_str("<div>");
    for counter in render::counters(state) {
        let _ = write!(
            body,
            r#"<div class="counter"><strong>{}</strong><br>{}</div>"#,
            escape_html(&counter.value),
            escape_html(counter.label),
        );
    }
    body.push_str("</div>\n");

    table(
        &mut body,
        "Top attacking IPs",
        &["#", "IP", "Attempts", "Last seen"],
        &render::top_ips(state),
        |r| {
            vec![
                r.rank.to_string(),
                r.key.clone(),
                r.count.to_string(),
                r.last_seen.clone().unwrap_or_else(|| "-".to_owned()),
            ]
        },
    );
    table(
        &mut body,
        "Top credentials",
        &["#", "Username / password", "Attempts"],
        &render::top_credentials(state),
        |r| vec![r.rank.to_string(), r.key.clone(), r.count.to_string()],
    );
    table(
        &mut body,
        "Protocol share",
        &["SSH", "Telnet"],
        &render::protocol_chart(state),
        |p| {
            vec![
                format!("{} ({:.1}%)", p.ssh, p.ssh_pct),
                format!("{} ({:.1}%)", p.telnet, p.telnet_pct),
            ]
        },
    );
    table(
        &mut body,
        "Hourly timeline",
        &["Hour", "Attacks"],
        &render::timeline(state),
        |p| vec![p.label.clone(), p.count.to_string()],
    );

    let footer = render::log_footer(&state.log_view);
    table(
        &mut body,
        &format!("Intrusion log ({})", footer.label),
        &["Time", "Source IP", "Protocol", "Username", "Password", "Last command", "Commands"],
        &render::log_table(state),
        |r| {
            vec![
                r.timestamp.clone(),
                r.source_ip.clone(),
                r.protocol.clone(),
                r.username.clone(),
                r.password.clone(),
                r.last_command.clone(),
                r.command_count.to_string(),
            ]
        },
    );
    table(
        &mut body,
        "Unread notifications",
        &["Type", "Category", "Title", "Message", "Time"],
        &render::unread_feed(state),
        |n| {
            vec![
                n.kind.to_string(),
                n.category.clone(),
                n.title.clone(),
                n.message.clone(),
                n.timestamp.clone(),
            ]
        },
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Decoy service snapshot</title>
<style>{STYLE}</style>
</head>
<body>
{body}</body>
</html>
"#
    )
}

fn table<T>(
    out: &mut String,
    title: &str,
    headers: &[&str],
    section: &Section<T>,
    cells: impl Fn(&T) -> Vec<String>,
) {
    let _ = writeln!(out, "<h2>{}</h2>", escape_html(title));
    if let Some(placeholder) = section.placeholder() {
        let _ = writeln!(out, r#"<p class="muted">{}</p>"#, escape_html(placeholder));
        return;
    }
    out.push_str("<table>\n<tr>");
    for header in headers {
        let _ = write!(out, "<th>{}</th>", escape_html(header));
    }
    out.push_str("</tr>\n");
    for row in section.rows() {
        out.push_str("<tr>");
        for value in cells(row) {
            let _ = write!(out, "<td>{}</td>", escape_html(&value));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}
