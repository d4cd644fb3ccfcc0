//! Typed lookup tables over the dimension and attribute structure
//!
//! Built once per response, then every compound key and attribute slot is
//! resolved by dimension name instead of by raw array position.

use super::sdmx::{CodeValue, Structure, TimeValue, TIME_PERIOD};
use crate::error::{ExrError, Result};
use hashbrown::HashMap;

/// Series dimensions the decoder resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesDimensionId {
    Frequency,
    BaseCurrency,
    QuoteCurrency,
    Tenor,
}

impl SeriesDimensionId {
    pub const ALL: [SeriesDimensionId; 4] = [
        SeriesDimensionId::Frequency,
        SeriesDimensionId::BaseCurrency,
        SeriesDimensionId::QuoteCurrency,
        SeriesDimensionId::Tenor,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SeriesDimensionId::Frequency => "FREQ",
            SeriesDimensionId::BaseCurrency => "BASE_CUR",
            SeriesDimensionId::QuoteCurrency => "QUOTE_CUR",
            SeriesDimensionId::Tenor => "TENOR",
        }
    }
}

/// Series attributes, in the slot order of a raw series' `attributes` array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    Decimals,
    Calculated,
    UnitMult,
    Collection,
}

impl AttributeId {
    pub fn id(&self) -> &'static str {
        match self {
            AttributeId::Decimals => "DECIMALS",
            AttributeId::Calculated => "CALCULATED",
            AttributeId::UnitMult => "UNIT_MULT",
            AttributeId::Collection => "COLLECTION",
        }
    }

    pub fn slot(&self) -> usize {
        match self {
            AttributeId::Decimals => 0,
            AttributeId::Calculated => 1,
            AttributeId::UnitMult => 2,
            AttributeId::Collection => 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct KeyedDimension<'a> {
    key_position: usize,
    values: &'a [CodeValue],
}

/// Resolves compound keys, attribute slots and time indices of one response
#[derive(Debug, Clone)]
pub struct DimensionTable<'a> {
    series: HashMap<&'a str, KeyedDimension<'a>>,
    attributes: HashMap<&'a str, &'a [CodeValue]>,
    periods: &'a [TimeValue],
}

impl<'a> DimensionTable<'a> {
    /// Fails when the structure has no `TIME_PERIOD` observation dimension.
    pub fn from_structure(structure: &'a Structure) -> Result<Self> {
        let time = structure
            .dimensions
            .observation
            .iter()
            .find(|d| d.id == TIME_PERIOD)
            .ok_or_else(|| {
                ExrError::DecodeStructure(format!("no {} observation dimension", TIME_PERIOD))
            })?;

        let series = structure
            .dimensions
            .series
            .iter()
            .map(|d| {
                (
                    d.id.as_str(),
                    KeyedDimension {
                        key_position: d.key_position,
                        values: d.values.as_slice(),
                    },
                )
            })
            .collect();

        let attributes = structure
            .attributes
            .series
            .iter()
            .map(|a| (a.id.as_str(), a.values.as_slice()))
            .collect();

        Ok(Self {
            series,
            attributes,
            periods: time.values.as_slice(),
        })
    }

    /// Resolve one dimension of a split compound key.
    pub fn resolve(
        &self,
        dimension: SeriesDimensionId,
        key_parts: &[&str],
    ) -> std::result::Result<&'a CodeValue, String> {
        let keyed = self
            .series
            .get(dimension.id())
            .ok_or_else(|| format!("dimension {} not in structure", dimension.id()))?;
        let part = key_parts.get(keyed.key_position).ok_or_else(|| {
            format!(
                "key has no position {} for {}",
                keyed.key_position,
                dimension.id()
            )
        })?;
        let index: usize = part
            .trim()
            .parse()
            .map_err(|_| format!("{} index {:?} is not a number", dimension.id(), part))?;
        keyed
            .values
            .get(index)
            .ok_or_else(|| format!("{} index {} out of range", dimension.id(), index))
    }

    /// Resolve an attribute through the series' attribute slot array.
    pub fn attribute(
        &self,
        attribute: AttributeId,
        slots: &[Option<usize>],
    ) -> std::result::Result<&'a CodeValue, String> {
        let values = self
            .attributes
            .get(attribute.id())
            .ok_or_else(|| format!("attribute {} not in structure", attribute.id()))?;
        let index = slots
            .get(attribute.slot())
            .copied()
            .flatten()
            .ok_or_else(|| format!("attribute {} not set", attribute.id()))?;
        values
            .get(index)
            .ok_or_else(|| format!("{} index {} out of range", attribute.id(), index))
    }

    pub fn period(&self, index: usize) -> Option<&'a TimeValue> {
        self.periods.get(index)
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sdmx::ExchangeRatesResponse;
    use serde_json::json;

    fn structure() -> Structure {
        let response = json!({
            "meta": {"prepared": "2023-06-05T10:00:00"},
            "data": {"dataSets": [], "structure": {
                "dimensions": {
                    "series": [
                        {"id": "FREQ", "keyPosition": 0, "values": [{"id": "B"}]},
                        {"id": "BASE_CUR", "keyPosition": 1, "values": [{"id": "USD"}, {"id": "EUR"}]},
                    ],
                    "observation": [{"id": "TIME_PERIOD", "keyPosition": 4, "values": [
                        {"id": "2023-06-01", "start": "2023-06-01T00:00:00", "end": "2023-06-01T23:59:59"}
                    ]}]
                },
                "attributes": {"series": [
                    {"id": "DECIMALS", "values": [{"id": "2"}, {"id": "4"}]}
                ]}
            }}
        });
        let response: ExchangeRatesResponse = serde_json::from_value(response).unwrap();
        response.data.structure
    }

    #[test]
    fn test_resolve_by_name() {
        let structure = structure();
        let table = DimensionTable::from_structure(&structure).unwrap();
        let parts = ["0", "1", "0", "0"];
        assert_eq!(table.resolve(SeriesDimensionId::Frequency, &parts).unwrap().id, "B");
        assert_eq!(table.resolve(SeriesDimensionId::BaseCurrency, &parts).unwrap().id, "EUR");
    }

    #[test]
    fn test_resolve_failures() {
        let structure = structure();
        let table = DimensionTable::from_structure(&structure).unwrap();
        assert!(table.resolve(SeriesDimensionId::BaseCurrency, &["0", "9"]).is_err());
        assert!(table.resolve(SeriesDimensionId::BaseCurrency, &["0", "x"]).is_err());
        assert!(table.resolve(SeriesDimensionId::BaseCurrency, &["0"]).is_err());
        assert!(table.resolve(SeriesDimensionId::Tenor, &["0", "0", "0", "0"]).is_err());
    }

    #[test]
    fn test_attribute_slots() {
        let structure = structure();
        let table = DimensionTable::from_structure(&structure).unwrap();
        assert_eq!(table.attribute(AttributeId::Decimals, &[Some(1)]).unwrap().id, "4");
        assert!(table.attribute(AttributeId::Decimals, &[None]).is_err());
        assert!(table.attribute(AttributeId::Decimals, &[]).is_err());
        assert!(table.attribute(AttributeId::UnitMult, &[Some(0), Some(0), Some(0)]).is_err());
    }

    #[test]
    fn test_missing_time_dimension() {
        let mut structure = structure();
        structure.dimensions.observation.clear();
        let err = DimensionTable::from_structure(&structure).unwrap_err();
        assert!(matches!(err, ExrError::DecodeStructure(_)));
    }

    #[test]
    fn test_periods() {
        let structure = structure();
        let table = DimensionTable::from_structure(&structure).unwrap();
        assert_eq!(table.period_count(), 1);
        assert_eq!(table.period(0).unwrap().id, "2023-06-01");
        assert!(table.period(1).is_none());
    }
}
