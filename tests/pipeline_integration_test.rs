//! Integration tests for the decode / rebase / arrange pipeline
//!
//! Uses the bundled fixture and hand-built series for the documented examples

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rusty_exr::conversion::prepare;
use rusty_exr::currency::{Currency, PIVOT_CURRENCY};
use rusty_exr::data::store::bundled_fixture;
use rusty_exr::data::{DatasetDecoder, DecodedDataset, SeriesFrequency};
use rusty_exr::fx::{filter_series, sort_series, Rebaser};
use rusty_exr::settings::ConversionConfig;
use rusty_exr::types::{ExchangeSeries, Observation};

fn series(base: Currency, decimals: u32, values: &[(&str, f64)]) -> ExchangeSeries {
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    ExchangeSeries {
        id: 0,
        frequency: SeriesFrequency::Business,
        base_currency: base,
        base_unit: 1.0,
        quote_currency: Currency::NOK,
        observations: values
            .iter()
            .enumerate()
            .map(|(index, (key, value))| Observation {
                index,
                value: *value,
                display_value: value.to_string(),
                period_key: key.to_string(),
                period_start: start,
                period_end: start,
            })
            .collect(),
        decimals,
        collection: "C".to_string(),
    }
}

fn fixture_dataset() -> DecodedDataset {
    DatasetDecoder::default()
        .decode(&bundled_fixture("exr_all").unwrap())
        .unwrap()
}

#[test]
fn test_decode_is_idempotent() {
    let response = bundled_fixture("exr_all").unwrap();
    let decoder = DatasetDecoder::default();
    let first = decoder.decode(&response).unwrap();
    let second = decoder.decode(&response).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.series.len(), 8);
}

#[test]
fn test_documented_example() {
    // 1 USD = 0.10 NOK, 1 SEK = 1.00 NOK
    let dataset = vec![
        series(Currency::USD, 2, &[("2023-06-01", 0.10)]),
        series(Currency::SEK, 2, &[("2023-06-01", 1.00)]),
    ];
    let rebaser = Rebaser::default();

    let from_pivot = rebaser.rebase(dataset.clone(), PIVOT_CURRENCY, &[]).unwrap();
    let usd = from_pivot.iter().find(|s| s.quote_currency == Currency::USD).unwrap();
    assert_eq!(usd.base_currency, Currency::NOK);
    assert_relative_eq!(usd.observations[0].value, 10.0, epsilon = 1e-12);
    assert_eq!(usd.observations[0].display_value, "10.00");

    let from_sek = rebaser.rebase(dataset, Currency::SEK, &[Currency::USD]).unwrap();
    assert_eq!(from_sek.len(), 1);
    assert_eq!(from_sek[0].base_currency, Currency::SEK);
    assert_eq!(from_sek[0].quote_currency, Currency::USD);
    assert_relative_eq!(from_sek[0].observations[0].value, 10.0, epsilon = 1e-12);
    assert_eq!(from_sek[0].observations[0].display_value, "10.0000");
}

#[test]
fn test_inversion_round_trip_on_fixture() {
    let rebaser = Rebaser::default();
    for original in fixture_dataset().series {
        let once = rebaser.invert_series(&original).unwrap();
        let twice = rebaser.invert_series(&once).unwrap();
        assert_eq!(twice.pair(), original.pair());
        for (a, b) in original.observations.iter().zip(&twice.observations) {
            assert_relative_eq!(a.value, b.value, max_relative = 1e-12);
            assert_eq!(a.display_value, b.display_value);
        }
    }
}

#[test]
fn test_cross_rates_on_fixture() {
    let dataset = fixture_dataset();
    let mut config = ConversionConfig::first_run();
    config.set_base_currency(Currency::EUR);
    let from_eur = prepare(&dataset, &config, PIVOT_CURRENCY, &Rebaser::default(), false).unwrap();
    config.set_base_currency(Currency::USD);
    let from_usd = prepare(&dataset, &config, PIVOT_CURRENCY, &Rebaser::default(), false).unwrap();

    let eur_usd = from_eur.series_for(Currency::USD).unwrap();
    let usd_eur = from_usd.series_for(Currency::EUR).unwrap();
    for (a, b) in eur_usd.observations.iter().zip(&usd_eur.observations) {
        assert_eq!(a.period_key, b.period_key);
        assert_relative_eq!(a.value * b.value, 1.0, epsilon = 1e-12);
        assert_eq!(a.display_value.split('.').nth(1).map(str::len), Some(4));
    }
}

#[test]
fn test_filter_then_sort_is_stable_for_unlisted() {
    let filtered = filter_series(
        fixture_dataset().series,
        &[Currency::USD, Currency::SEK, Currency::GBP, Currency::JPY, Currency::CHF],
    );
    let mut series = Rebaser::default().rebase(filtered, PIVOT_CURRENCY, &[]).unwrap();
    let before: Vec<Currency> = series.iter().map(|s| s.quote_currency).collect();
    assert_eq!(before.len(), 5);

    sort_series(&mut series, &[Currency::GBP]);
    let after: Vec<Currency> = series.iter().map(|s| s.quote_currency).collect();

    assert_eq!(after[0], Currency::GBP);
    let unlisted_before: Vec<Currency> = before.into_iter().filter(|c| *c != Currency::GBP).collect();
    assert_eq!(after[1..].to_vec(), unlisted_before);
}

proptest! {
    #[test]
    fn prop_cross_rates_are_reciprocal(c in 0.001f64..1000.0, d in 0.001f64..1000.0) {
        let dataset = vec![
            series(Currency::EUR, 4, &[("2023-06-01", c)]),
            series(Currency::USD, 4, &[("2023-06-01", d)]),
        ];
        let rebaser = Rebaser::default();
        let c_to_d = rebaser.rebase(dataset.clone(), Currency::EUR, &[]).unwrap();
        let d_to_c = rebaser.rebase(dataset, Currency::USD, &[]).unwrap();
        let product = c_to_d[0].observations[0].value * d_to_c[0].observations[0].value;
        prop_assert!((product - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_sort_keeps_listed_first(priority in proptest::sample::subsequence(
        vec![Currency::USD, Currency::EUR, Currency::SEK, Currency::DKK, Currency::GBP], 0..5)
    ) {
        let rebased = Rebaser::default()
            .rebase(fixture_dataset().series, PIVOT_CURRENCY, &[])
            .unwrap();
        let mut series = rebased;
        sort_series(&mut series, &priority);
        let quotes: Vec<Currency> = series.iter().map(|s| s.quote_currency).collect();
        prop_assert_eq!(&quotes[..priority.len()], &priority[..]);
    }
}
