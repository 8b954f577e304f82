//! Server-rendered HTML pages.

use std::fmt::Write;

use axum::response::Html;
use chrono::{DateTime, Utc};
use stockroom_core::inventory::dashboard::{DashboardSummary, RenewalReport};
use stockroom_core::inventory::status::ExpirationStatus;
use stockroom_core::models::inventory::{ItemView, Renewal};

use crate::routes;

/// Escape text for HTML element and attribute content.
pub fn escape(text: &str) -> String {
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

fn layout(title: &str, nav: bool, body: &str) -> Html<String> {
    let nav = if nav {
        format!(
            r#"<nav><a href="{}">Dashboard</a> <a href="{}">Inventory</a> <a href="{}">Renewals</a>
<form method="post" action="{}" style="display:inline"><button type="submit">Log out</button></form></nav>"#,
            routes::GET_DASHBOARD,
            routes::GET_INVENTORY,
            routes::GET_RENEWALS,
            routes::POST_LOGOUT,
        )
    } else {
        String::new()
    };
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} | Stockroom</title></head>
<body>
{nav}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

fn date(at: Option<DateTime<Utc>>) -> String {
    at.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into())
}

/// "Expires in N days" style label.
pub fn status_label(view: &ItemView) -> String {
    match (view.status, view.days_left) {
        (ExpirationStatus::Lifetime, _) => "Lifetime".into(),
        (ExpirationStatus::Expired, Some(0)) => "Expired today".into(),
        (ExpirationStatus::Expired, Some(d)) => format!("Expired {} days ago", -d),
        (_, Some(1)) => "Expires in 1 day".into(),
        (_, Some(d)) => format!("Expires in {d} days"),
        (_, None) => "-".into(),
    }
}

/// Login form, optionally with an error message.
pub fn login_page(error: Option<&str>) -> Html<String> {
    let error = error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r#"{error}
<form method="post" action="{action}">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input name="password" type="password" autocomplete="current-password" required></label>
<button type="submit">Sign in</button>
</form>"#,
        action = routes::LOGIN,
    );
    layout("Sign in", false, &body)
}

fn renewal_rows(rows: &[Renewal]) -> String {
    let mut out = String::new();
    for r in rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&r.item_name),
            escape(&r.item_owner),
            r.renewed_at.format("%Y-%m-%d %H:%M"),
        );
    }
    out
}

fn item_rows(rows: &[ItemView]) -> String {
    let mut out = String::new();
    for v in rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:?}</td><td>{}</td><td>{}</td></tr>",
            escape(&v.item.name),
            escape(&v.item.owner),
            v.item.item_type,
            date(v.item.expiration_date),
            status_label(v),
        );
    }
    out
}

pub fn dashboard_page(summary: &DashboardSummary) -> Html<String> {
    let body = format!(
        r#"<section class="stats">
<p>Total items: <strong>{total}</strong></p>
<p>Expiring soon: <strong>{expiring}</strong></p>
<p>Recently renewed: <strong>{renewed}</strong></p>
<p>Lifetime: <strong>{lifetime}</strong></p>
</section>
<h2>Expiring</h2>
<table><thead><tr><th>Name</th><th>Owner</th><th>Type</th><th>Expires</th><th>Status</th></tr></thead>
<tbody>
{expiring_rows}</tbody></table>
<h2>Recent renewals</h2>
<table><thead><tr><th>Item</th><th>Owner</th><th>Renewed</th></tr></thead>
<tbody>
{renewal_rows}</tbody></table>"#,
        total = summary.total_items,
        expiring = summary.expiring_soon,
        renewed = summary.recently_renewed,
        lifetime = summary.lifetime,
        expiring_rows = item_rows(&summary.expiring),
        renewal_rows = renewal_rows(&summary.recent_renewals),
    );
    layout("Dashboard", true, &body)
}

pub fn inventory_page(items: &[ItemView], query: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<form method="get" action="{action}"><input name="query" value="{query}" placeholder="Search"><button type="submit">Search</button></form>
<table><thead><tr><th>Name</th><th>Owner</th><th>Type</th><th>Expires</th><th>Status</th></tr></thead>
<tbody>
{rows}</tbody></table>"#,
        action = routes::GET_INVENTORY,
        query = escape(query.unwrap_or_default()),
        rows = item_rows(items),
    );
    layout("Inventory", true, &body)
}

pub fn renewals_page(report: &RenewalReport, query: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<section class="stats">
<p>Total renewals: <strong>{total}</strong></p>
<p>Last month: <strong>{last_month}</strong></p>
<p>Upcoming: <strong>{upcoming}</strong></p>
<p>Expired: <strong>{expired}</strong></p>
</section>
<form method="get" action="{action}"><input name="query" value="{query}" placeholder="Item or owner"><button type="submit">Filter</button></form>
<table><thead><tr><th>Item</th><th>Owner</th><th>Renewed</th></tr></thead>
<tbody>
{rows}</tbody></table>"#,
        total = report.total_renewals,
        last_month = report.renewals_last_month,
        upcoming = report.upcoming,
        expired = report.expired,
        action = routes::GET_RENEWALS,
        query = escape(query.unwrap_or_default()),
        rows = renewal_rows(&report.latest),
    );
    layout("Renewals", true, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn login_page_shows_error_once() {
        let Html(page) = login_page(Some("Invalid username or password"));
        assert_eq!(page.matches("Invalid username or password").count(), 1);
        assert!(page.contains(r#"action="/login""#));

        let Html(page) = login_page(None);
        assert!(!page.contains("role=\"alert\""));
    }
}
