//! Handler-level tests
//!
//! Database-free coverage: command construction, the sell transaction
//! contract, and the payment arithmetic the handlers delegate to the
//! engines. DB-backed paths live in tests/ and require Postgres.

#[cfg(test)]
mod tests {
    use crate::domain::{DomainError, Money};
    use crate::engine::{Credit, GoodPrice, PriceDefaults};
    use crate::handlers::{
        CreditIssueCommand, CreditPaymentCommand, SaleCommand, ShipDealSide,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn t0() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    // =========================================================================
    // Command construction
    // =========================================================================

    #[test]
    fn test_sale_command() {
        let cmd = SaleCommand::new("cloth", "4217", 7, "200.00");
        assert_eq!(cmd.good, "cloth");
        assert_eq!(cmd.player_id, "4217");
        assert_eq!(cmd.quantity, 7);
        assert_eq!(cmd.payment, "200.00");
    }

    #[test]
    fn test_credit_commands() {
        let issue = CreditIssueCommand::new("7105", "300", 3);
        assert_eq!(issue.term_months, 3);

        let pay = CreditPaymentCommand::new("7105", "150.00");
        assert_eq!(pay.amount, "150.00");
    }

    #[test]
    fn test_ship_deal_side_serde() {
        let side: ShipDealSide = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(side, ShipDealSide::Buy);
        assert_eq!(serde_json::to_string(&ShipDealSide::Sell).unwrap(), "\"sell\"");
    }

    // =========================================================================
    // Sell transaction contract (recovery -> quote -> funds -> record)
    // =========================================================================

    #[test]
    fn test_sell_contract_happy_path() {
        let now = t0();
        let mut price = GoodPrice::new("rum", PriceDefaults::default(), now);
        let quantity = 7;
        let payment: Money = "800.00".parse().unwrap();

        price.check_recovery(now);
        let unit = price.quote();
        let total = unit * Decimal::from(quantity);
        assert!(payment.covers(total));

        price.record_sale(quantity, now).unwrap();
        let change = payment.value() - total;

        assert_eq!(total, dec!(700));
        assert_eq!(change, dec!(100));
        assert_eq!(price.sales_count, 7);
    }

    #[test]
    fn test_sell_contract_rejects_short_payment_without_mutation() {
        let now = t0();
        let mut price = GoodPrice::new("rum", PriceDefaults::default(), now);
        let before = price.clone();
        let payment: Money = "699.99".parse().unwrap();

        price.check_recovery(now);
        let total = price.quote() * Decimal::from(7);

        // The handler stops here; the record is untouched
        assert!(!payment.covers(total));
        assert_eq!(price, before);
    }

    #[test]
    fn test_sell_contract_charges_recovered_price() {
        let now = t0();
        let defaults = PriceDefaults {
            pmax: dec!(20),
            n_for_drop: 5,
            t_recovery_secs: 300,
        };
        let mut price = GoodPrice::new("cloth", defaults, now);
        price.record_sale(10, now).unwrap();
        assert_eq!(price.quote(), dec!(18));

        // After the idle window the quote must be the ceiling again
        let later = now + chrono::Duration::seconds(300);
        price.check_recovery(later);
        assert_eq!(price.quote(), dec!(20));
    }

    // =========================================================================
    // Credit payment arithmetic as driven by the handler
    // =========================================================================

    #[test]
    fn test_credit_payment_flow_closes_and_deletes() {
        let mut credit = Credit::issue("7105", dec!(300), 3, "alice", t0()).unwrap();

        // The handler deletes the row exactly when make_payment returns true
        assert!(!credit.make_payment(dec!(150), t0()).unwrap());
        assert!(!credit.make_payment(dec!(150), t0()).unwrap());
        assert!(credit.make_payment(dec!(150), t0()).unwrap());
        assert!(credit.is_closed());
    }

    #[test]
    fn test_credit_short_payment_surfaces_insufficient_funds() {
        let mut credit = Credit::issue("7105", dec!(300), 3, "alice", t0()).unwrap();
        let result = credit.make_payment(dec!(100), t0());

        match result {
            Err(DomainError::InsufficientFunds { required, offered }) => {
                assert_eq!(required, dec!(150));
                assert_eq!(offered, dec!(100));
            }
            other => panic!("Expected InsufficientFunds, got: {:?}", other),
        }
    }

    #[test]
    fn test_money_rejects_malformed_payment_strings() {
        for bad in ["abc", "-5", "1.234", "100000000.01"] {
            let parsed: Result<Money, _> = bad.parse();
            assert!(parsed.is_err(), "Expected error for payment: {}", bad);
        }
    }
}
