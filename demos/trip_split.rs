//! A weekend trip paid in two currencies.
//!
//! Demonstrates how expenses are split evenly, converted, and netted
//! pairwise into a short list of transfers.

use rust_decimal_macros::dec;
use split_settle::prelude::*;

fn main() -> Result<(), SettlementError> {
    println!("╔══════════════════════════════════════════╗");
    println!("║  split-settle: Seoul Weekend Trip        ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut session = Session::default();
    for name in ["Alice", "Bob", "Carol"] {
        session.add_participant(name)?;
    }
    // 1 CNY = 200 KRW
    session.add_currency("KRW", dec!(200))?;

    session.add_transaction("Train tickets", dec!(300), "CNY", "Alice")?;
    session.add_transaction("Korean BBQ", dec!(120000), "KRW", "Bob")?;
    session.add_transaction("Palace entry", dec!(9000), "KRW", "Carol")?;
    session.add_transaction("Hostel", dec!(150), "CNY", "Bob")?;

    println!("━━━ Expenses ━━━\n");
    for t in session.transactions() {
        println!(
            "  {:<15} {:>10} {}  paid by {}",
            t.description(),
            t.amount(),
            t.currency(),
            t.payer()
        );
    }
    println!();

    println!("{}", session.settle()?);

    session.set_settlement_currency("KRW")?;
    println!("{}", session.settle()?);

    println!("━━━ Balances (KRW) ━━━\n");
    for b in session.balances()? {
        let status = if b.net > dec!(0) {
            "IS OWED"
        } else if b.net < dec!(0) {
            "OWES"
        } else {
            "EVEN"
        };
        println!(
            "  {:<8} paid {:>12.2}  share {:>12.2}  [{}]",
            b.participant.as_str(),
            round_for_display(b.paid),
            round_for_display(b.share),
            status
        );
    }
    Ok(())
}
