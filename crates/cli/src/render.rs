//! Plain-text tables for the terminal.

use etf_dividend_core::models::analytics::PortfolioSnapshot;
use etf_dividend_core::models::etf::EtfReference;
use etf_dividend_core::models::holding::HoldingLedger;
use etf_dividend_core::services::announcement_service::Announcement;

const BAR_WIDTH: f64 = 40.0;

/// Amount in units of 10 000 TWD, one decimal.
fn wan(amount: f64) -> String {
    format!("{:.1}萬", amount / 10_000.0)
}

pub fn etf_table(etfs: &[&EtfReference]) {
    if etfs.is_empty() {
        println!("沒有可顯示的 ETF 資料");
        return;
    }
    println!(
        "{:<8} {:<18} {:<4} {:>8} {:>8} {:>8} {:>9}",
        "代號", "名稱", "類別", "近日價", "殖利率", "預估", "含息報酬"
    );
    for etf in etfs {
        let price = if etf.has_quote() {
            format!("{:.2}", etf.price_recent)
        } else {
            "--".to_string()
        };
        println!(
            "{:<8} {:<18} {:<4} {:>8} {:>7.2}% {:>7.2}% {:>8.2}%",
            etf.code,
            etf.name,
            etf.category,
            price,
            etf.annual_yield,
            etf.est_yield,
            etf.return_rate_with_div
        );
    }
}

pub fn summary(snapshot: &PortfolioSnapshot, lot_size: u64) {
    println!(
        "總投資 {}   年息 {} 元   標的 {}",
        wan(snapshot.total_investment),
        snapshot.total_estimated_dividend.floor(),
        snapshot.holding_count()
    );
    if snapshot.holdings.is_empty() {
        println!("尚無持股，使用 `add <代號>` 加入標的");
        return;
    }

    println!();
    for h in &snapshot.holdings {
        let category = h.category.map(|c| c.label()).unwrap_or("--");
        println!(
            "{:<8} {:<16} [{}] {:>6.1}張  市值 {:>8}  股息 {:>8.0}元  成本 {:.2}  殖利率 {}%  投入 {}",
            h.code,
            h.name,
            category,
            h.lots(lot_size),
            wan(h.market_value),
            h.estimated_annual_dividend.floor(),
            h.average_cost,
            h.annual_yield,
            wan(h.total_cost)
        );
    }

    println!();
    println!("預估每月股息分佈 (元)");
    let totals = snapshot.monthly.display_totals();
    let peak = totals.iter().copied().max().unwrap_or(0).max(1) as f64;
    for (i, total) in totals.iter().enumerate() {
        let bar = "█".repeat((*total as f64 / peak * BAR_WIDTH).round() as usize);
        println!("{:>2}月 {:>9} {bar}", i + 1, total);
    }
}

pub fn history(ledger: &HoldingLedger) {
    println!("{} {}", ledger.code, ledger.name);
    println!("{:<12} {:>8} {:>9} {:>6} {:>12}", "日期", "股數", "單價", "手續費", "成本");
    for t in &ledger.transactions {
        println!(
            "{:<12} {:>8} {:>9.2} {:>6} {:>12.0}",
            t.date, t.shares, t.price, t.fee, t.total_cost
        );
    }
    println!(
        "合計 {} 股，成本 {:.0}，均價 {:.2}",
        ledger.total_shares(),
        ledger.total_cost(),
        ledger.average_cost()
    );
}

pub fn announcements(items: &[Announcement]) {
    if items.is_empty() {
        println!("目前沒有即將除息的標的");
        return;
    }
    println!("{:<8} {:<18} {:>8} {:<12} {:<12}", "代號", "名稱", "金額", "除息日", "發放日");
    for a in items {
        println!(
            "{:<8} {:<18} {:>8.2} {:<12} {:<12}",
            a.code,
            a.name,
            a.amount,
            a.ex_date.format("%Y/%m/%d"),
            a.pay_date.format("%Y/%m/%d")
        );
    }
}
