//! Plain-text rendering of store records for Discord replies.

use crate::{
    core::{
        collection::Page,
        customer::CustomerSummary,
        features::Feature,
        ledger::TransactionRow,
        report::{format_price, format_token_amount},
    },
    entities::{EcuFileModel, ServiceCostModel, TokenPackageModel},
};

/// Discord caps message content at 2000 characters.
const MESSAGE_LIMIT: usize = 1900;

/// Converts a price typed in major units (`39.99`) to cents.
///
/// Returns `None` for negative, NaN or infinite input.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn price_to_cents(price: f64) -> Option<i64> {
    if !price.is_finite() || price < 0.0 || price > 1_000_000.0 {
        return None;
    }
    Some((price * 100.0).round() as i64)
}

/// One row of `/customers list`.
#[must_use]
pub fn customer_line(summary: &CustomerSummary, currency: &str) -> String {
    let c = &summary.customer;
    format!(
        "`#{}` **{}** ({}) · {} · {} tokens · spent {} · last active {}",
        c.id,
        c.name,
        c.email,
        c.status.label(),
        summary.tokens,
        format_price(c.total_spent_cents, currency),
        c.last_active,
    )
}

/// One row of `/files list`.
#[must_use]
pub fn file_line(file: &EcuFileModel, currency: &str) -> String {
    let category = file.category.map_or("uncategorized", |c| c.label());
    let original = if file.is_original { " · original" } else { "" };
    format!(
        "`#{}` **{}** [{}] · {} · {} · {} downloads{}",
        file.id,
        file.title,
        file.status,
        category,
        format_price(file.price_cents, currency),
        file.downloads,
        original,
    )
}

/// One row of `/tokens transactions`.
#[must_use]
pub fn transaction_line(row: &TransactionRow) -> String {
    let t = &row.transaction;
    let detail = t
        .service
        .as_deref()
        .or(t.method.as_deref())
        .or(t.note.as_deref())
        .unwrap_or("-");
    format!(
        "`{}` {} · {} · {} · {}",
        t.created_at.format("%Y-%m-%d"),
        row.customer_name,
        t.kind,
        format_token_amount(t.amount),
        detail,
    )
}

/// One row of `/tokens packages`.
#[must_use]
pub fn package_line(package: &TokenPackageModel, currency: &str) -> String {
    let mut line = format!(
        "`#{}` **{}** · {} tokens · {}",
        package.id,
        package.name,
        package.tokens,
        format_price(package.price_cents, currency),
    );
    if package.discount_percentage > 0 {
        line.push_str(&format!(" · {}% off", package.discount_percentage));
    }
    if package.popular {
        line.push_str(" · ⭐ popular");
    }
    line
}

/// One row of `/tokens services`.
#[must_use]
pub fn service_line(service: &ServiceCostModel) -> String {
    format!(
        "`{}` **{}** · {} tokens",
        service.key, service.name, service.cost
    )
}

/// One row of `/features`.
#[must_use]
pub fn feature_line(feature: &Feature) -> String {
    let mut line = format!(
        "**{}** [{}] · {} · {}",
        feature.name, feature.status, feature.group, feature.description
    );
    if let Some(date) = &feature.available_from {
        line.push_str(&format!(" · expected {date}"));
    }
    line
}

/// Renders a page as a titled list with a "page X of Y" footer, or `empty` when the
/// page has no rows. Output is cut to fit one Discord message.
pub fn page_message<T>(
    title: &str,
    page: &Page<T>,
    empty: &str,
    line: impl Fn(&T) -> String,
) -> String {
    if page.is_empty() {
        return if page.total > 0 {
            format!("{empty} ({}, {} results in total)", page.describe(), page.total)
        } else {
            empty.to_string()
        };
    }

    let footer = format!("_{} · {} results_", page.describe(), page.total);
    let mut message = format!("**{title}**\n");
    for item in &page.items {
        let row = line(item);
        if message.len() + row.len() + footer.len() + 2 > MESSAGE_LIMIT {
            message.push_str("…\n");
            break;
        }
        message.push_str(&row);
        message.push('\n');
    }
    message.push_str(&footer);
    message
}
