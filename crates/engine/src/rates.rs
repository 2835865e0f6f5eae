//! Pure exchange-rate math: conversion between currencies and rebasing the
//! rate table onto a new main currency.
//!
//! Every rate is relative to the main currency: `exchange_rate` is how many
//! main-currency units one unit of the currency is worth. Amounts are minor
//! units (`i64`); conversions round half to even before going back to the
//! integer domain.

use crate::{EngineError, ResultEngine, currencies};

/// A usable exchange rate is positive and finite.
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// Find the main currency among the given records.
///
/// Returns `None` when no active currency has rate `1.0`. Two or more mains
/// mean the stored rate table is corrupt.
pub fn find_main(records: &[currencies::Model]) -> ResultEngine<Option<&currencies::Model>> {
    let mut mains = records.iter().filter(|c| c.is_main());
    let first = mains.next();
    if mains.next().is_some() {
        return Err(EngineError::DataIntegrity(
            "more than one currency has exchange rate 1.0".to_string(),
        ));
    }
    Ok(first)
}

/// Convert `amount` minor units of `from` into minor units of `to`.
pub fn convert(
    amount: i64,
    from: &currencies::Model,
    to: &currencies::Model,
) -> ResultEngine<i64> {
    if from.id == to.id {
        return Ok(amount);
    }
    let from_rate = require_rate(from)?;
    let to_rate = require_rate(to)?;
    Ok(round_minor(amount as f64 * from_rate / to_rate))
}

/// Convert `amount` minor units of `currency` into main-currency minor units.
pub fn convert_to_main(amount: i64, currency: &currencies::Model) -> ResultEngine<i64> {
    let rate = require_rate(currency)?;
    Ok(round_minor(amount as f64 * rate))
}

/// Convert `amount` main-currency minor units into minor units of `currency`.
pub fn convert_from_main(amount: i64, currency: &currencies::Model) -> ResultEngine<i64> {
    let rate = require_rate(currency)?;
    Ok(round_minor(amount as f64 / rate))
}

/// Rewrite all active rates so `new_main_id` becomes the main currency.
///
/// Each rate is divided by the new main's previous rate, which preserves
/// every cross-currency ratio. Returns `false` when the currency already is
/// the main one. Deleted currencies keep their stored rate.
pub fn rebase(records: &mut [currencies::Model], new_main_id: i32) -> ResultEngine<bool> {
    let old_main_id = find_main(records)?.map(|c| c.id);
    let new_main = records
        .iter()
        .find(|c| c.id == new_main_id && !c.is_deleted())
        .ok_or_else(|| EngineError::NotFound("currency not exists".to_string()))?;
    if old_main_id == Some(new_main_id) {
        return Ok(false);
    }
    let pivot_rate = new_main.exchange_rate;

    if old_main_id.is_none() {
        // No main yet, nothing to preserve. Only the chosen currency moves.
        for record in records.iter_mut().filter(|c| c.id == new_main_id) {
            record.exchange_rate = 1.0;
        }
        return Ok(true);
    }
    if !is_valid_rate(pivot_rate) {
        return Err(EngineError::Validation(format!(
            "exchange rate {pivot_rate} must be positive and finite"
        )));
    }

    for record in records.iter_mut().filter(|c| !c.is_deleted()) {
        record.exchange_rate = if record.id == new_main_id {
            1.0
        } else {
            record.exchange_rate / pivot_rate
        };
    }
    Ok(true)
}

fn require_rate(currency: &currencies::Model) -> ResultEngine<f64> {
    if !is_valid_rate(currency.exchange_rate) {
        return Err(EngineError::Validation(format!(
            "currency '{}' has unusable exchange rate {}",
            currency.title, currency.exchange_rate
        )));
    }
    Ok(currency.exchange_rate)
}

fn round_minor(value: f64) -> i64 {
    value.round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn currency(id: i32, title: &str, rate: f64) -> currencies::Model {
        currencies::Model {
            id,
            position: id,
            title: title.to_string(),
            exchange_rate: rate,
            create_time: Utc.timestamp_opt(0, 0).unwrap(),
            update_time: None,
            delete_time: None,
            created_by: "tester".to_string(),
            updated_by: None,
            deleted_by: None,
        }
    }

    fn deleted(mut model: currencies::Model) -> currencies::Model {
        model.delete_time = Some(Utc.timestamp_opt(0, 0).unwrap());
        model.deleted_by = Some("tester".to_string());
        model
    }

    #[test]
    fn rate_validity() {
        assert!(is_valid_rate(0.5));
        assert!(is_valid_rate(90.0));
        assert!(!is_valid_rate(0.0));
        assert!(!is_valid_rate(-1.0));
        assert!(!is_valid_rate(f64::NAN));
        assert!(!is_valid_rate(f64::INFINITY));
    }

    #[test]
    fn find_main_picks_single_active_unit_rate() {
        let records = vec![
            currency(1, "RUB", 1.0),
            currency(2, "USD", 90.0),
            deleted(currency(3, "GBP", 1.0)),
        ];
        let main = find_main(&records).unwrap().unwrap();
        assert_eq!(main.id, 1);
    }

    #[test]
    fn find_main_empty_table() {
        assert_eq!(find_main(&[]).unwrap(), None);
        let records = vec![currency(1, "USD", 90.0)];
        assert_eq!(find_main(&records).unwrap(), None);
    }

    #[test]
    fn two_mains_is_an_integrity_error() {
        let records = vec![currency(1, "RUB", 1.0), currency(2, "BYN", 1.0)];
        assert!(matches!(
            find_main(&records),
            Err(EngineError::DataIntegrity(_))
        ));
    }

    #[test]
    fn convert_between_currencies() {
        let rub = currency(1, "RUB", 1.0);
        let usd = currency(2, "USD", 90.0);
        assert_eq!(convert(90_0000, &rub, &usd).unwrap(), 1_0000);
        assert_eq!(convert(1_0000, &usd, &rub).unwrap(), 90_0000);
    }

    #[test]
    fn convert_same_currency_is_identity() {
        let usd = currency(2, "USD", 90.0);
        assert_eq!(convert(1234, &usd, &usd).unwrap(), 1234);
    }

    #[test]
    fn convert_rounds_half_to_even() {
        let main = currency(1, "EUR", 1.0);
        let double = currency(2, "HLF", 2.0);
        // 1 / 2 = 0.5 and 3 / 2 = 1.5 both round to the even neighbour.
        assert_eq!(convert(1, &main, &double).unwrap(), 0);
        assert_eq!(convert(3, &main, &double).unwrap(), 2);
    }

    #[test]
    fn convert_rejects_unusable_rates() {
        let main = currency(1, "EUR", 1.0);
        let broken = currency(2, "BAD", 0.0);
        assert!(matches!(
            convert(100, &main, &broken),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            convert(100, &broken, &main),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn convert_through_main() {
        let usd = currency(2, "USD", 90.0);
        assert_eq!(convert_to_main(1_0000, &usd).unwrap(), 90_0000);
        assert_eq!(convert_from_main(90_0000, &usd).unwrap(), 1_0000);
    }

    #[test]
    fn rebase_preserves_cross_ratios() {
        let mut records = vec![
            currency(1, "RUB", 1.0),
            currency(2, "USD", 90.0),
            currency(3, "EUR", 100.0),
        ];
        assert!(rebase(&mut records, 2).unwrap());

        assert_eq!(records[1].exchange_rate, 1.0);
        assert!((records[0].exchange_rate - 1.0 / 90.0).abs() < 1e-12);
        assert!((records[2].exchange_rate - 100.0 / 90.0).abs() < 1e-12);

        // EUR was worth 100x RUB before and still is.
        let ratio = records[2].exchange_rate / records[0].exchange_rate;
        assert!((ratio - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rebase_onto_current_main_is_a_noop() {
        let mut records = vec![currency(1, "RUB", 1.0), currency(2, "USD", 90.0)];
        assert!(!rebase(&mut records, 1).unwrap());
        assert_eq!(records[1].exchange_rate, 90.0);
    }

    #[test]
    fn rebase_without_existing_main_only_moves_target() {
        let mut records = vec![currency(1, "USD", 90.0), currency(2, "EUR", 100.0)];
        assert!(rebase(&mut records, 1).unwrap());
        assert_eq!(records[0].exchange_rate, 1.0);
        assert_eq!(records[1].exchange_rate, 100.0);
    }

    #[test]
    fn rebase_skips_deleted_currencies() {
        let mut records = vec![
            currency(1, "RUB", 1.0),
            currency(2, "USD", 90.0),
            deleted(currency(3, "GBP", 110.0)),
        ];
        assert!(rebase(&mut records, 2).unwrap());
        assert_eq!(records[2].exchange_rate, 110.0);
    }

    #[test]
    fn rebase_unknown_currency() {
        let mut records = vec![currency(1, "RUB", 1.0)];
        assert_eq!(
            rebase(&mut records, 9).unwrap_err(),
            EngineError::NotFound("currency not exists".to_string())
        );
    }
}
