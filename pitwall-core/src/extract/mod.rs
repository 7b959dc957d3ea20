//! Tail-buffer record extractor
//!
//! For "latest" endpoints the record we want is the last one in the body,
//! but the body can be far larger than RAM allows. The extractor keeps a
//! bounded tail of the stream and, once the stream ends, scans it right
//! to left for the newest object that passes the record's required-field
//! check.
//!
//! Records larger than the tail buffer are not recoverable and yield no
//! data.

pub mod fields;
pub mod scan;
pub mod tail;

pub use fields::{unescape_into, Fields, RawValue};
pub use scan::Candidates;
pub use tail::{Shape, TailBuffer};

use crate::error::FetchError;
use crate::records::{parse_u16, EventInfo, LapNumber, LapRecord, LapTime, SessionInfo};
use crate::traits::ChunkSource;

/// Default tail capacity in bytes
pub const TAIL_BYTES: usize = 4096;

/// A record type the extractor can decode from one object span
pub trait TailRecord: Sized {
    /// Decode a candidate object
    ///
    /// Returns `None` when the object is malformed or its required field
    /// is missing or `null`; the extractor then moves one record left.
    fn from_object(object: &[u8]) -> Option<Self>;
}

impl TailRecord for LapRecord {
    fn from_object(object: &[u8]) -> Option<Self> {
        let mut lap_duration = None;
        let mut driver_number = None;
        let mut lap_number = LapNumber::Absent;

        for field in Fields::new(object) {
            let (key, value) = field.ok()?;
            match key {
                b"lap_duration" => {
                    lap_duration = match value {
                        RawValue::Number(n) => LapTime::from_seconds_str(n),
                        RawValue::Str(s) => core::str::from_utf8(s)
                            .ok()
                            .and_then(LapTime::from_seconds_str),
                        _ => None,
                    };
                }
                b"driver_number" => {
                    if let RawValue::Number(n) = value {
                        driver_number = parse_u16(n);
                    }
                }
                b"lap_number" => {
                    lap_number = match value {
                        RawValue::Null => LapNumber::Null,
                        RawValue::Number(n) => parse_u16(n).map_or(LapNumber::Null, LapNumber::Known),
                        _ => LapNumber::Null,
                    };
                }
                _ => {}
            }
        }

        Some(LapRecord {
            driver_number,
            lap_duration: lap_duration?,
            lap_number,
        })
    }
}

impl TailRecord for EventInfo {
    fn from_object(object: &[u8]) -> Option<Self> {
        let mut info = None;
        for field in Fields::new(object) {
            let (key, value) = field.ok()?;
            if let (b"meeting_name", RawValue::Str(s)) = (key, value) {
                info = Some(EventInfo {
                    meeting_name: unescape_into(s),
                });
            }
        }
        info
    }
}

impl TailRecord for SessionInfo {
    fn from_object(object: &[u8]) -> Option<Self> {
        let mut info = SessionInfo::default();
        let mut named = false;

        for field in Fields::new(object) {
            let (key, value) = field.ok()?;
            let RawValue::Str(s) = value else {
                continue;
            };
            match key {
                b"session_name" => {
                    info.session_name = unescape_into(s);
                    named = true;
                }
                b"session_type" => info.session_type = unescape_into(s),
                b"circuit_short_name" => info.circuit_short_name = unescape_into(s),
                b"country_name" => info.country_name = unescape_into(s),
                _ => {}
            }
        }

        named.then_some(info)
    }
}

/// Read `source` to the end and return its newest acceptable record
///
/// `Ok(None)` means the body held no qualifying record. Transport errors
/// and a non-JSON body are returned as errors.
pub async fn extract_latest<R, S, const K: usize>(source: &mut S) -> Result<Option<R>, FetchError>
where
    R: TailRecord,
    S: ChunkSource,
{
    let mut tail = TailBuffer::<K>::new();
    while let Some(chunk) = source.read_chunk().await? {
        tail.extend(chunk);
    }
    Ok(tail.latest()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NetworkError, ParseError};
    use crate::testing::ScriptedSource;
    use embassy_futures::block_on;

    fn extract<R: TailRecord, const K: usize>(
        body: &[u8],
        chunk: usize,
    ) -> Result<Option<R>, FetchError> {
        let mut source = ScriptedSource::split(body, chunk);
        block_on(extract_latest::<R, _, K>(&mut source))
    }

    const LAPS: &[u8] = br#"[{"driver_number":44,"lap_duration":null},{"driver_number":44,"lap_duration":91.154,"lap_number":12}]"#;

    #[test]
    fn test_lap_array_latest() {
        for chunk in [1, 3, 7, 64, 256] {
            let lap = extract::<LapRecord, 256>(LAPS, chunk).unwrap().unwrap();
            assert_eq!(lap.driver_number, Some(44));
            assert_eq!(lap.lap_duration, LapTime::from_millis(91_154));
            assert_eq!(lap.lap_number, LapNumber::Known(12));
        }
    }

    #[test]
    fn test_rightmost_qualifying_wins() {
        let body = br#"[{"lap_duration":80.0,"lap_number":1},{"lap_duration":81.5,"lap_number":2},{"lap_duration":null,"lap_number":3},{"lap_number":4}]"#;
        let lap = extract::<LapRecord, 256>(body, 5).unwrap().unwrap();
        assert_eq!(lap.lap_duration, LapTime::from_millis(81_500));
        assert_eq!(lap.lap_number, LapNumber::Known(2));
    }

    #[test]
    fn test_single_null_object_is_no_data() {
        let body = br#"{"driver_number":44,"lap_duration":null}"#;
        assert_eq!(extract::<LapRecord, 256>(body, 4), Ok(None));
    }

    #[test]
    fn test_single_object() {
        let body = br#" {"driver_number":1,"lap_duration":"95.5","lap_number":null} "#;
        let lap = extract::<LapRecord, 256>(body, 2).unwrap().unwrap();
        assert_eq!(lap.driver_number, Some(1));
        assert_eq!(lap.lap_duration, LapTime::from_millis(95_500));
        assert_eq!(lap.lap_number, LapNumber::Null);
    }

    #[test]
    fn test_record_larger_than_tail_is_no_data() {
        let body = br#"[{"driver_number":44,"lap_duration":91.154,"lap_number":12,"segments":[2048,2049,2051,2049,2048]}]"#;
        assert_eq!(extract::<LapRecord, 64>(body, 16), Ok(None));
    }

    #[test]
    fn test_older_records_trimmed_newest_found() {
        let mut body = std::vec::Vec::new();
        body.push(b'[');
        for lap in 1..=200 {
            if lap > 1 {
                body.push(b',');
            }
            body.extend_from_slice(
                std::format!(r#"{{"driver_number":81,"lap_duration":9{}.5,"lap_number":{}}}"#, lap % 10, lap)
                    .as_bytes(),
            );
        }
        body.push(b']');

        let lap = extract::<LapRecord, 256>(&body, 37).unwrap().unwrap();
        assert_eq!(lap.lap_number, LapNumber::Known(200));
        assert_eq!(lap.lap_duration, LapTime::from_millis(90_500));
    }

    #[test]
    fn test_escaped_braces_in_strings() {
        let body = br#"[{"lap_duration":90.1,"note":"}"},{"lap_duration":90.2,"note":"a \"{\" b"}]"#;
        let lap = extract::<LapRecord, 256>(body, 3).unwrap().unwrap();
        assert_eq!(lap.lap_duration, LapTime::from_millis(90_200));
    }

    #[test]
    fn test_empty_and_invalid_bodies() {
        assert_eq!(extract::<LapRecord, 64>(b"", 8), Ok(None));
        assert_eq!(extract::<LapRecord, 64>(b"[]", 8), Ok(None));
        assert_eq!(
            extract::<LapRecord, 64>(b"<html>busy</html>", 8),
            Err(FetchError::Parse(ParseError::UnexpectedShape))
        );
    }

    #[test]
    fn test_stream_error_propagates() {
        let mut source = ScriptedSource::split(LAPS, 8).then_fail(NetworkError::Timeout.into());
        let result = block_on(extract_latest::<LapRecord, _, 256>(&mut source));
        assert_eq!(result, Err(FetchError::Network(NetworkError::Timeout)));
    }

    #[test]
    fn test_event_info() {
        let body = br#"[{"meeting_name":"Bahrain Grand Prix"},{"meeting_name":"Saudi Arabian Grand Prix","year":2024}]"#;
        let info = extract::<EventInfo, 256>(body, 10).unwrap().unwrap();
        assert_eq!(info.meeting_name.as_str(), "Saudi Arabian Grand Prix");
    }

    #[test]
    fn test_session_info() {
        let body = br#"[{"session_type":"Race","session_name":"Sprint","circuit_short_name":"Shanghai","country_name":"China","session_key":9673},{"session_type":"Race","session_name":null}]"#;
        let info = extract::<SessionInfo, 256>(body, 10).unwrap().unwrap();
        assert_eq!(info.title().as_str(), "Race - Sprint");
        assert_eq!(info.circuit_short_name.as_str(), "Shanghai");
        assert_eq!(info.country_name.as_str(), "China");
    }
}
