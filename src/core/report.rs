//! Dashboard statistics and display formatting.
//!
//! This module provides the figures shown on the admin dashboard and the tokens tab.
//! Statistics functions read the store and return plain structs. Formatting helpers are
//! pure and shared by the bot and the API.

use std::collections::HashMap;

use sea_orm::prelude::*;
use serde::Serialize;

use crate::{
    entities::{EcuFile, TokenPackage, TokenTransaction, ecu_file::FileStatus, token_transaction::TransactionKind},
    errors::Result,
};

/// File catalog counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    /// All files, any status
    pub total: u64,
    pub active: u64,
    pub pending: u64,
    pub rejected: u64,
    pub archived: u64,
    /// Downloads across all files
    pub downloads: i64,
    /// Id and title of the most downloaded file
    pub most_downloaded: Option<(i64, String)>,
}

/// Token economy counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStats {
    /// Tokens credited by purchases
    pub tokens_sold: i64,
    /// Tokens debited by service usage, as a positive number
    pub tokens_used: i64,
    /// Price of the packages behind purchase rows, in cents
    pub revenue_cents: i64,
    pub purchases: u64,
    pub usages: u64,
}

/// Counts files per status and finds the most downloaded one.
///
/// # Arguments
/// * `db` - Database connection
///
/// # Returns
/// A `FileStats` over every file in the catalog
pub async fn file_stats(db: &DatabaseConnection) -> Result<FileStats> {
    let files = EcuFile::find().all(db).await?;

    let mut stats = FileStats {
        total: files.len() as u64,
        ..FileStats::default()
    };
    for file in &files {
        match file.status {
            FileStatus::Active => stats.active += 1,
            FileStatus::Pending => stats.pending += 1,
            FileStatus::Rejected => stats.rejected += 1,
            FileStatus::Archived => stats.archived += 1,
        }
        stats.downloads += file.downloads;
    }

    // Earliest id wins a tie
    stats.most_downloaded = files
        .iter()
        .filter(|f| f.downloads > 0)
        .max_by(|a, b| a.downloads.cmp(&b.downloads).then(b.id.cmp(&a.id)))
        .map(|f| (f.id, f.title.clone()));

    Ok(stats)
}

/// Sums the ledger into sold/used tokens and package revenue.
///
/// Revenue counts the current price of the package each purchase row references; rows
/// without a package (manual grants, opening balances) add no revenue.
pub async fn token_stats(db: &DatabaseConnection) -> Result<TokenStats> {
    let prices: HashMap<i64, i64> = TokenPackage::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.price_cents))
        .collect();

    let mut stats = TokenStats::default();
    for row in TokenTransaction::find().all(db).await? {
        match row.kind {
            TransactionKind::Purchase => {
                stats.tokens_sold += row.amount;
                stats.purchases += 1;
                stats.revenue_cents += row
                    .package_id
                    .and_then(|id| prices.get(&id))
                    .copied()
                    .unwrap_or(0);
            }
            TransactionKind::Usage => {
                stats.tokens_used += -row.amount;
                stats.usages += 1;
            }
            TransactionKind::Adjustment => {}
        }
    }
    Ok(stats)
}

/// Share of `part` in `whole` as a percentage; 0 when `whole` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "EUR" => Some("€"),
        "USD" => Some("$"),
        "GBP" => Some("£"),
        _ => None,
    }
}

/// Formats cents as a price: `€99.99`, or `99.99 CHF` for currencies without a symbol.
#[must_use]
pub fn format_price(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let amount = format!("{}.{:02}", abs / 100, abs % 100);
    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{amount}"),
        None => format!("{sign}{amount} {}", currency.to_ascii_uppercase()),
    }
}

/// Formats a signed token amount: `+50 tokens`, `-2 tokens`, `+1 token`.
#[must_use]
pub fn format_token_amount(amount: i64) -> String {
    let unit = if amount.unsigned_abs() == 1 { "token" } else { "tokens" };
    if amount >= 0 {
        format!("+{amount} {unit}")
    } else {
        format!("-{} {unit}", amount.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(9999, "EUR"), "€99.99");
        assert_eq!(format_price(5, "usd"), "$0.05");
        assert_eq!(format_price(29999, "GBP"), "£299.99");
        assert_eq!(format_price(1000, "CHF"), "10.00 CHF");
        assert_eq!(format_price(-250, "EUR"), "-€2.50");
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(50), "+50 tokens");
        assert_eq!(format_token_amount(-2), "-2 tokens");
        assert_eq!(format_token_amount(1), "+1 token");
        assert_eq!(format_token_amount(0), "+0 tokens");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn test_format_progress_bar_half() {
        assert_eq!(format_progress_bar(50.0, Some(10)), "[█████░░░░░] 50.0%");
    }

    #[test]
    fn test_format_progress_bar_overflow_is_clamped() {
        assert_eq!(format_progress_bar(150.0, Some(4)), "[████] 150.0%");
    }

    #[tokio::test]
    async fn test_token_stats_from_seed() -> Result<()> {
        let db = setup_seeded_db().await?;
        let stats = token_stats(&db).await?;

        assert_eq!(stats.tokens_sold, 220);
        assert_eq!(stats.tokens_used, 11);
        assert_eq!(stats.purchases, 4);
        assert_eq!(stats.usages, 4);
        // Standard twice, Professional once; the 20-token purchase has no package
        assert_eq!(stats.revenue_cents, 3999 + 6999 + 3999);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_stats_from_seed() -> Result<()> {
        let db = setup_seeded_db().await?;
        let stats = file_stats(&db).await?;

        assert_eq!(stats.total, 15);
        assert_eq!(stats.active, 15);
        assert_eq!(stats.pending, 0);
        assert!(stats.most_downloaded.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_on_empty_store() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(file_stats(&db).await?, FileStats::default());
        assert_eq!(token_stats(&db).await?, TokenStats::default());
        Ok(())
    }
}
