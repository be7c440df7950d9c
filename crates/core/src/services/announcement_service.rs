use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::etf::EtfReference;

/// An upcoming distribution, flattened out of an ETF's dividend history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub code: String,
    pub name: String,
    pub ex_date: NaiveDate,
    pub pay_date: NaiveDate,
    pub amount: f64,
}

/// All distributions with an ex-dividend date on or after `today`,
/// nearest first. Ties keep dataset order.
pub fn upcoming(etfs: &[EtfReference], today: NaiveDate) -> Vec<Announcement> {
    let mut announcements: Vec<Announcement> = etfs
        .iter()
        .flat_map(|etf| {
            etf.dividend_history
                .iter()
                .filter(move |record| record.ex_date >= today)
                .map(move |record| Announcement {
                    code: etf.code.clone(),
                    name: etf.name.clone(),
                    ex_date: record.ex_date,
                    pay_date: record.pay_date,
                    amount: record.amount,
                })
        })
        .collect();
    announcements.sort_by_key(|a| a.ex_date);
    announcements
}
