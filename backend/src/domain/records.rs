//! Owned records: contracts, gardens and plants.
//!
//! Every record carries the [`UserId`] of its owner. Identifiers are opaque to
//! clients; contracts use UUIDs while gardens and plants use database serials.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UserId;

/// Maximum length, in characters, of a record name.
pub const RECORD_NAME_MAX: usize = 255;
/// Smallest permitted contract or garden level.
pub const LEVEL_MIN: i16 = 1;
/// Largest permitted contract or garden level.
pub const LEVEL_MAX: i16 = 3;
/// Upper bound of the soil moisture percentage.
pub const SOIL_MOISTURE_MAX: i32 = 100;

/// Validation errors for record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    EmptyName,
    NameTooLong { max: usize },
    LevelOutOfRange { value: i64 },
    NegativeTelemetry { field: &'static str },
    SoilMoistureOutOfRange { value: i32 },
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "This field may not be blank."),
            Self::NameTooLong { max } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
            Self::LevelOutOfRange { value } if *value < i64::from(LEVEL_MIN) => {
                write!(f, "Ensure this value is greater than or equal to {LEVEL_MIN}.")
            }
            Self::LevelOutOfRange { .. } => {
                write!(f, "Ensure this value is less than or equal to {LEVEL_MAX}.")
            }
            Self::NegativeTelemetry { .. } => {
                write!(f, "Ensure this value is greater than or equal to 0.")
            }
            Self::SoilMoistureOutOfRange { .. } => write!(
                f,
                "Ensure this value is less than or equal to {SOIL_MOISTURE_MAX}."
            ),
        }
    }
}

impl std::error::Error for RecordValidationError {}

/// Non-blank display name shared by contracts, gardens and plants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordName(pub(super) String);

impl RecordName {
    /// Validate a record name; surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RecordValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecordValidationError::EmptyName);
        }
        if trimmed.chars().count() > RECORD_NAME_MAX {
            return Err(RecordValidationError::NameTooLong {
                max: RECORD_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Key used for case-insensitive uniqueness checks.
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for RecordName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Tier of a contract or garden, bounded to `1..=3`.
///
/// # Examples
/// ```
/// use backend::domain::Level;
///
/// assert_eq!(Level::default().get(), 1);
/// assert!(Level::new(4).is_err());
/// assert_eq!(Level::new(3).unwrap().fan_out(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level(i16);

impl Level {
    /// Validate a raw level value.
    pub fn new(value: i64) -> Result<Self, RecordValidationError> {
        if !(i64::from(LEVEL_MIN)..=i64::from(LEVEL_MAX)).contains(&value) {
            return Err(RecordValidationError::LevelOutOfRange { value });
        }
        let narrowed =
            i16::try_from(value).map_err(|_| RecordValidationError::LevelOutOfRange { value })?;
        Ok(Self(narrowed))
    }

    pub fn get(self) -> i16 {
        self.0
    }

    /// Number of children synthesised for a record at this level.
    pub fn fan_out(self) -> usize {
        usize::from(self.0.unsigned_abs()) * crate::domain::cascade::FAN_OUT_PER_LEVEL
    }
}

impl Default for Level {
    fn default() -> Self {
        Self(LEVEL_MIN)
    }
}

/// Opaque contract identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractId(Uuid);

impl ContractId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a path segment; malformed input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ContractId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! serial_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Parse a path segment; non-positive or malformed input yields `None`.
            pub fn parse(raw: &str) -> Option<Self> {
                raw.parse::<i64>().ok().filter(|value| *value > 0).map(Self)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

serial_id!(
    /// Serial garden identifier.
    GardenId
);
serial_id!(
    /// Serial plant identifier.
    PlantId
);

/// Sensor readings tracked for a plant.
///
/// ## Invariants
/// - Integer readings are non-negative.
/// - `soil_moisture` is a percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantTelemetry {
    pub soil_moisture: i32,
    pub fertilizer_rate: i32,
    pub height: i32,
    pub stem_count: i32,
    pub health_score: i32,
    pub is_present: bool,
    pub soil_cohesion: i32,
    pub disease_index: i32,
    pub insect_density: i32,
}

impl Default for PlantTelemetry {
    fn default() -> Self {
        Self {
            soil_moisture: 0,
            fertilizer_rate: 0,
            height: 0,
            stem_count: 0,
            health_score: 0,
            is_present: true,
            soil_cohesion: 0,
            disease_index: 0,
            insect_density: 0,
        }
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<i32, RecordValidationError> {
    if value < 0 {
        return Err(RecordValidationError::NegativeTelemetry { field });
    }
    Ok(value)
}

/// Partial telemetry update; `None` leaves a reading unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryChanges {
    pub soil_moisture: Option<i32>,
    pub fertilizer_rate: Option<i32>,
    pub height: Option<i32>,
    pub stem_count: Option<i32>,
    pub health_score: Option<i32>,
    pub is_present: Option<bool>,
    pub soil_cohesion: Option<i32>,
    pub disease_index: Option<i32>,
    pub insect_density: Option<i32>,
}

impl TelemetryChanges {
    /// Check every supplied reading against the telemetry invariants.
    ///
    /// Returns the offending field name with the error.
    pub fn validate(&self) -> Result<(), (&'static str, RecordValidationError)> {
        let readings = [
            ("soil_moisture", self.soil_moisture),
            ("fertilizer_rate", self.fertilizer_rate),
            ("height", self.height),
            ("stem_count", self.stem_count),
            ("health_score", self.health_score),
            ("soil_cohesion", self.soil_cohesion),
            ("disease_index", self.disease_index),
            ("insect_density", self.insect_density),
        ];
        for (field, value) in readings {
            if let Some(value) = value {
                non_negative(field, value).map_err(|err| (field, err))?;
            }
        }
        match self.soil_moisture {
            Some(value) if value > SOIL_MOISTURE_MAX => Err((
                "soil_moisture",
                RecordValidationError::SoilMoistureOutOfRange { value },
            )),
            _ => Ok(()),
        }
    }

    /// Apply the supplied readings to `telemetry`.
    pub fn apply_to(&self, telemetry: &mut PlantTelemetry) {
        let PlantTelemetry {
            soil_moisture,
            fertilizer_rate,
            height,
            stem_count,
            health_score,
            is_present,
            soil_cohesion,
            disease_index,
            insect_density,
        } = telemetry;
        for (target, change) in [
            (soil_moisture, self.soil_moisture),
            (fertilizer_rate, self.fertilizer_rate),
            (height, self.height),
            (stem_count, self.stem_count),
            (health_score, self.health_score),
            (soil_cohesion, self.soil_cohesion),
            (disease_index, self.disease_index),
            (insect_density, self.insect_density),
        ] {
            if let Some(value) = change {
                *target = value;
            }
        }
        if let Some(value) = self.is_present {
            *is_present = value;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A tracked specimen inside a garden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plant {
    pub id: PlantId,
    pub garden_id: GardenId,
    pub owner: UserId,
    pub name: RecordName,
    pub telemetry: PlantTelemetry,
}

/// A cultivation plot and its plants, ordered by plant id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Garden {
    pub id: GardenId,
    pub owner: UserId,
    pub name: RecordName,
    pub level: Level,
    pub plants: Vec<Plant>,
}

/// Root record of the creation cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub id: ContractId,
    pub owner: UserId,
    pub name: RecordName,
    pub description: String,
    pub level: Level,
    pub created_at: DateTime<Utc>,
    pub gardens: Vec<Garden>,
}

/// Partial garden update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GardenChanges {
    pub name: Option<RecordName>,
    pub level: Option<Level>,
}

impl GardenChanges {
    pub fn apply_to(&self, garden: &mut Garden) {
        if let Some(name) = &self.name {
            garden.name = name.clone();
        }
        if let Some(level) = self.level {
            garden.level = level;
        }
    }
}

/// Partial plant update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantChanges {
    pub name: Option<RecordName>,
    pub telemetry: TelemetryChanges,
}

impl PlantChanges {
    pub fn apply_to(&self, plant: &mut Plant) {
        if let Some(name) = &self.name {
            plant.name = name.clone();
        }
        self.telemetry.apply_to(&mut plant.telemetry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(2, true)]
    #[case(3, true)]
    #[case(4, false)]
    #[case(-1, false)]
    #[case(i64::from(i16::MAX) + 1, false)]
    fn level_bounds(#[case] raw: i64, #[case] ok: bool) {
        assert_eq!(Level::new(raw).is_ok(), ok);
    }

    #[rstest]
    #[case(0, "Ensure this value is greater than or equal to 1.")]
    #[case(7, "Ensure this value is less than or equal to 3.")]
    fn level_messages_name_the_violated_bound(#[case] raw: i64, #[case] expected: &str) {
        assert_eq!(Level::new(raw).expect_err("out of range").to_string(), expected);
    }

    #[rstest]
    #[case(1, 10)]
    #[case(2, 20)]
    #[case(3, 30)]
    fn fan_out_is_ten_per_level(#[case] raw: i64, #[case] expected: usize) {
        assert_eq!(Level::new(raw).expect("valid").fan_out(), expected);
    }

    #[rstest]
    #[case("New Contract", "new contract")]
    #[case("Äpfel", "äpfel")]
    #[case("ΟΣ", "ος")]
    fn record_names_fold_case_for_uniqueness(#[case] upper: &str, #[case] lower: &str) {
        let upper = RecordName::new(upper).expect("valid");
        let lower = RecordName::new(lower).expect("valid");
        assert_eq!(upper.folded(), lower.folded());
        assert_ne!(upper, lower);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_record_names_are_rejected(#[case] raw: &str) {
        assert_eq!(
            RecordName::new(raw).expect_err("blank"),
            RecordValidationError::EmptyName
        );
    }

    #[rstest]
    #[case("42", Some(42))]
    #[case("0", None)]
    #[case("-3", None)]
    #[case("abc", None)]
    fn serial_ids_parse_positive_integers(#[case] raw: &str, #[case] expected: Option<i64>) {
        assert_eq!(GardenId::parse(raw).map(GardenId::get), expected);
        assert_eq!(PlantId::parse(raw).map(PlantId::get), expected);
    }

    #[test]
    fn contract_ids_reject_malformed_uuids() {
        assert!(ContractId::parse("not-a-uuid").is_none());
        let id = ContractId::random();
        assert_eq!(ContractId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn default_telemetry_is_zeroed_and_present() {
        let telemetry = PlantTelemetry::default();
        assert!(telemetry.is_present);
        assert_eq!(telemetry.soil_moisture, 0);
        assert_eq!(telemetry.insect_density, 0);
    }

    #[rstest]
    #[case(TelemetryChanges { height: Some(-1), ..Default::default() }, Some("height"))]
    #[case(TelemetryChanges { soil_moisture: Some(101), ..Default::default() }, Some("soil_moisture"))]
    #[case(TelemetryChanges { soil_moisture: Some(100), stem_count: Some(4), ..Default::default() }, None)]
    fn telemetry_changes_validation(
        #[case] changes: TelemetryChanges,
        #[case] failing_field: Option<&str>,
    ) {
        assert_eq!(changes.validate().err().map(|(field, _)| field), failing_field);
    }

    #[test]
    fn telemetry_changes_only_touch_supplied_readings() {
        let mut telemetry = PlantTelemetry::default();
        TelemetryChanges {
            height: Some(12),
            is_present: Some(false),
            ..Default::default()
        }
        .apply_to(&mut telemetry);

        assert_eq!(telemetry.height, 12);
        assert!(!telemetry.is_present);
        assert_eq!(telemetry.stem_count, 0);
    }
}
