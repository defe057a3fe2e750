use approx::relative_eq;
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use split_settle::prelude::*;

const CODES: [&str; 3] = ["CNY", "KRW", "USD"];

/// Inputs for one settlement call.
#[derive(Debug, Clone)]
struct Case {
    roster: Roster,
    currencies: CurrencyTable,
    transactions: Vec<Transaction>,
}

impl Case {
    fn settle(&self, currency: &str) -> NetDebtTable {
        SettlementEngine::settle(
            &self.roster,
            &self.currencies,
            &self.transactions,
            &CurrencyCode::new(currency),
        )
        .unwrap()
    }
}

fn tolerance() -> Decimal {
    dec!(0.000000001)
}

/// Rates between 0.01 and 500 units per CNY.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Amounts between 0.01 and 100,000.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// 1..6 participants, CNY base with KRW and USD, up to 25 transactions.
fn arb_case() -> impl Strategy<Value = Case> {
    (1usize..6)
        .prop_flat_map(|n| {
            (
                Just(n),
                arb_rate(),
                arb_rate(),
                prop::collection::vec((0..n, 0..CODES.len(), arb_amount()), 0..25),
            )
        })
        .prop_map(|(n, krw, usd, raw_transactions)| {
            let mut roster = Roster::new();
            for i in 0..n {
                roster.add(Participant::new(format!("P{}", i))).unwrap();
            }
            let mut currencies = CurrencyTable::new(CurrencyCode::new("CNY"));
            currencies.add_currency(CurrencyCode::new("KRW"), krw).unwrap();
            currencies.add_currency(CurrencyCode::new("USD"), usd).unwrap();
            let transactions = raw_transactions
                .into_iter()
                .enumerate()
                .map(|(i, (payer, code, amount))| {
                    Transaction::new(
                        format!("expense {}", i),
                        amount,
                        CurrencyCode::new(CODES[code]),
                        roster.members()[payer].clone(),
                    )
                    .unwrap()
                })
                .collect();
            Case {
                roster,
                currencies,
                transactions,
            }
        })
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

proptest! {
    // Nobody ever owes themselves.
    #[test]
    fn diagonal_is_always_zero(case in arb_case()) {
        let table = case.settle("CNY");
        for p in case.roster.iter() {
            prop_assert_eq!(table.amount(p, p), Decimal::ZERO);
            prop_assert_eq!(table.raw_amount(p, p), Decimal::ZERO);
        }
    }

    // After netting at most one direction per pair is positive, and it is
    // the difference of the raw totals.
    #[test]
    fn netting_keeps_only_the_difference(case in arb_case()) {
        let table = case.settle("CNY");
        for a in case.roster.iter() {
            for b in case.roster.iter() {
                if a == b {
                    continue;
                }
                let ab = table.amount(a, b);
                let ba = table.amount(b, a);
                prop_assert!(ab >= Decimal::ZERO && ba >= Decimal::ZERO);
                prop_assert!(ab == Decimal::ZERO || ba == Decimal::ZERO);
                let raw_diff = (table.raw_amount(a, b) - table.raw_amount(b, a)).abs();
                prop_assert!((ab + ba - raw_diff).abs() < tolerance());
            }
        }
    }

    // Listed debts are exactly the positive cells.
    #[test]
    fn listed_debts_are_positive(case in arb_case()) {
        let table = case.settle("USD");
        for debt in table.debts() {
            prop_assert!(debt.amount > Decimal::ZERO);
            prop_assert_ne!(&debt.payer, &debt.receiver);
            prop_assert_eq!(table.amount(&debt.payer, &debt.receiver), debt.amount);
        }
    }

    // Settling twice gives the same table.
    #[test]
    fn settlement_is_idempotent(case in arb_case()) {
        prop_assert_eq!(case.settle("KRW"), case.settle("KRW"));
    }

    // Netting never increases what has to change hands.
    #[test]
    fn net_never_exceeds_gross(case in arb_case()) {
        let table = case.settle("CNY");
        prop_assert!(table.total_transfer() <= table.gross_total());
    }

    // Settling in X and rescaling to Y matches settling in Y directly.
    #[test]
    fn currency_invariance(case in arb_case()) {
        let direct = case.settle("USD");
        let rescaled = case
            .settle("KRW")
            .convert_to(&case.currencies, &CurrencyCode::new("USD"))
            .unwrap();
        for a in case.roster.iter() {
            for b in case.roster.iter() {
                let x = to_f64(direct.amount(a, b));
                let y = to_f64(rescaled.amount(a, b));
                prop_assert!(
                    relative_eq!(x, y, epsilon = 1e-6, max_relative = 1e-9),
                    "{} -> {}: direct {} vs rescaled {}", a, b, x, y
                );
            }
        }
    }

    // Each participant's balance equals receivables minus payables, and
    // balances sum to zero.
    #[test]
    fn balances_agree_with_table(case in arb_case()) {
        let table = case.settle("CNY");
        let balances = SettlementEngine::balances(
            &case.roster,
            &case.currencies,
            &case.transactions,
            &CurrencyCode::new("CNY"),
        )
        .unwrap();

        let mut sum = Decimal::ZERO;
        for balance in &balances {
            let from_table = table.total_receivable(&balance.participant)
                - table.total_payable(&balance.participant);
            prop_assert!((from_table - balance.net).abs() < tolerance());
            sum += balance.net;
        }
        prop_assert!(sum.abs() < tolerance());
    }

    // One expense: the payer is owed (n-1)/n of it, before netting.
    #[test]
    fn single_transaction_conservation(
        n in 1usize..8,
        payer in 0usize..8,
        amount in arb_amount(),
        krw in arb_rate(),
    ) {
        let payer = payer % n;
        let mut roster = Roster::new();
        for i in 0..n {
            roster.add(Participant::new(format!("P{}", i))).unwrap();
        }
        let mut currencies = CurrencyTable::new(CurrencyCode::new("CNY"));
        currencies.add_currency(CurrencyCode::new("KRW"), krw).unwrap();
        let payer = roster.members()[payer].clone();
        let transactions = vec![Transaction::new(
            "expense",
            amount,
            CurrencyCode::new("CNY"),
            payer.clone(),
        )
        .unwrap()];

        let table = SettlementEngine::settle(
            &roster,
            &currencies,
            &transactions,
            &CurrencyCode::new("KRW"),
        )
        .unwrap();

        let owed_to_payer: Decimal = roster
            .iter()
            .map(|p| table.raw_amount(p, &payer))
            .sum();
        let n = Decimal::from(n);
        let expected = amount * krw * (n - Decimal::ONE) / n;
        prop_assert!((owed_to_payer - expected).abs() < tolerance());
    }

    // Two people trading expenses net to the difference of their shares.
    #[test]
    fn bilateral_nets_to_difference(
        a_paid in arb_amount(),
        b_paid in arb_amount(),
    ) {
        let mut roster = Roster::new();
        roster.add(Participant::new("A")).unwrap();
        roster.add(Participant::new("B")).unwrap();
        let currencies = CurrencyTable::new(CurrencyCode::new("CNY"));
        let transactions = vec![
            Transaction::new("a", a_paid, CurrencyCode::new("CNY"), Participant::new("A")).unwrap(),
            Transaction::new("b", b_paid, CurrencyCode::new("CNY"), Participant::new("B")).unwrap(),
        ];
        let table = SettlementEngine::settle(
            &roster,
            &currencies,
            &transactions,
            &CurrencyCode::new("CNY"),
        )
        .unwrap();

        let expected = ((a_paid - b_paid) / Decimal::from(2)).abs();
        prop_assert_eq!(table.total_transfer(), expected);
    }
}
