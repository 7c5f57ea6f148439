//! Lenient numeric readers for judge-entered data.
//!
//! Score sheets come from forms, so a field may hold a number, a numeric
//! string, `null`, or something that is not a number at all. None of these
//! may fail deserialization: anything that does not read as a number becomes 0.

use super::types::{RawObservation, ScoreSheet, StageNumber};
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use std::collections::BTreeMap;
use std::fmt;

/// Read a value the way a judging form would: numbers pass through, numeric
/// strings are parsed, empty strings are 0, everything else is `None`.
struct LenientNumber;

impl<'de> Visitor<'de> for LenientNumber {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_numeric_str(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(LenientNumber)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

/// Parse a numeric string. Surrounding whitespace is ignored and an empty
/// string reads as 0.
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    s.parse::<f64>().ok()
}

/// Turn any real number into an occurrence count.
///
/// Negative, non-finite or missing values count as 0; fractions are truncated.
pub fn count_from_f64(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u32,
        _ => 0,
    }
}

/// Deserialize a base score. Non-numeric input becomes 0.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientNumber)?;
    if value.is_none() {
        tracing::debug!("non-numeric score value read as 0");
    }
    Ok(value.unwrap_or(0.0))
}

/// Deserialize an infraction counter. See [`count_from_f64`].
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientNumber)?;
    if value.is_none() {
        tracing::debug!("non-numeric infraction count read as 0");
    }
    Ok(count_from_f64(value))
}

/// Deserialize a stage-keyed map of marks, keeping keys as written.
///
/// Keys are normalized later so that malformed ones can be skipped without
/// failing the whole document.
pub fn lenient_notes<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Mark(f64);

    impl<'de> serde::Deserialize<'de> for Mark {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            lenient_f64(d).map(Mark)
        }
    }

    let raw: Option<BTreeMap<String, Mark>> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, Mark(v))| (k, v))
        .collect())
}

/// Deserialize a declared stage count. Anything that is not a whole number of
/// at least 1 (null, 0, negative, garbage, too large) reads as 1.
pub fn lenient_stage_count<'de, D>(deserializer: D) -> Result<StageNumber, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientNumber)?;
    Ok(match value {
        Some(v) if v.is_finite() && v >= 1.0 && v <= StageNumber::MAX as f64 => {
            v.trunc() as StageNumber
        }
        _ => {
            tracing::debug!(?value, "unusable stage count read as 1");
            1
        }
    })
}

/// One score sheet entry. Anything other than an object reads as `None`.
struct StageEntry(Option<RawObservation>);

impl<'de> Deserialize<'de> for StageEntry {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = StageEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a stage observation")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                RawObservation::deserialize(MapAccessDeserializer::new(map))
                    .map(|obs| StageEntry(Some(obs)))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(StageEntry(None))
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(EntryVisitor)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(StageEntry(None))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(StageEntry(None))
            }

            fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
                Ok(StageEntry(None))
            }

            fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Self::Value, E> {
                Ok(StageEntry(None))
            }

            fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Self::Value, E> {
                Ok(StageEntry(None))
            }

            fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
                Ok(StageEntry(None))
            }

            fn visit_str<E: de::Error>(self, _v: &str) -> Result<Self::Value, E> {
                Ok(StageEntry(None))
            }
        }

        d.deserialize_any(EntryVisitor)
    }
}

struct SheetVisitor;

impl<'de> Visitor<'de> for SheetVisitor {
    type Value = ScoreSheet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of stage observations")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut sheet = ScoreSheet::new();
        while let Some((key, StageEntry(entry))) = map.next_entry::<String, StageEntry>()? {
            match entry {
                Some(obs) => {
                    sheet.insert(key, obs);
                }
                None => {
                    tracing::debug!(stage = %key, "skipping non-object score sheet entry")
                }
            }
        }
        Ok(sheet)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(ScoreSheet::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(SheetVisitor)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ScoreSheet::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ScoreSheet::new())
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(ScoreSheet::new())
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Self::Value, E> {
        Ok(ScoreSheet::new())
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Self::Value, E> {
        Ok(ScoreSheet::new())
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
        Ok(ScoreSheet::new())
    }

    fn visit_str<E: de::Error>(self, _v: &str) -> Result<Self::Value, E> {
        Ok(ScoreSheet::new())
    }
}

/// Deserialize a score sheet. A sheet that is not an object reads as empty,
/// and stage entries that are not objects are skipped.
pub fn lenient_score_sheet<'de, D>(deserializer: D) -> Result<ScoreSheet, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(SheetVisitor)
}
