//! Key alias sets
//!
//! The service has renamed fields over time, and mirrors use their own
//! spellings. Each logical field is looked up under a fixed, ordered list
//! of names; when several are present the lowest index wins, regardless
//! of where the keys appear in the object.

/// Ordered list of accepted key names for one logical field
#[derive(Debug, Clone, Copy)]
pub struct AliasSet(&'static [&'static str]);

impl AliasSet {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self(names)
    }

    /// Priority of `key` in this set (0 is best)
    pub fn rank(&self, key: &[u8]) -> Option<u8> {
        self.0
            .iter()
            .position(|name| name.as_bytes() == key)
            .map(|i| i as u8)
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.0
    }
}

/// Competitor identifier
pub const IDENTIFIER: AliasSet =
    AliasSet::new(&["driver_number", "driverNumber", "number", "driver"]);

/// Rank of [`IDENTIFIER`] whose value may be an object holding the number
pub const NESTED_OWNER: u8 = 3;

/// Identifier inside an object-valued `driver` field
pub const NESTED_IDENTIFIER: AliasSet =
    AliasSet::new(&["driver_number", "driverNumber", "number", "id"]);

/// Reported classification position
pub const POSITION: AliasSet = AliasSet::new(&[
    "position",
    "pos",
    "rank",
    "classification_position",
    "final_position",
    "placement",
    "order",
]);

/// Points scored
pub const POINTS: AliasSet = AliasSet::new(&["points"]);

/// Array field of a wrapping object that holds the records
pub const LIST_FIELD: AliasSet = AliasSet::new(&[
    "results",
    "data",
    "session_result",
    "session_results",
    "classification",
    "items",
    "drivers",
]);
