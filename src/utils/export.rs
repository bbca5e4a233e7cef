use std::path::Path;

use anyhow::Result;

use crate::models::transaction::Transaction;

/// Write the currently visible transaction list to a CSV file.
pub fn write_transactions<P: AsRef<Path>>(path: P, transactions: &[Transaction]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "description", "user", "category", "amount"])?;

    for transaction in transactions {
        writer.write_record([
            transaction.date.format("%Y-%m-%d").to_string(),
            transaction.description.clone(),
            transaction.user_name(),
            transaction.category_name(),
            transaction.amount.round_dp(2).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
