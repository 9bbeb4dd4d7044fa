//! Classification attributes shared by images and detections.
//!
//! Each attribute knows how to merge with another observation of the same
//! attribute. Merging happens when consecutive images of one subject are
//! folded into a single detection.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::constants::TEXT_MERGE_SEPARATOR;

/// Lowercase a token and drop separators so `PairFormation`, `pair formation`
/// and `pair_formation` all compare equal.
fn normalize_token(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Behaviours observed during a detection, as a set of flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActivityFlags(u16);

impl ActivityFlags {
    /// No activity recorded.
    pub const UNKNOWN: Self = Self(0);
    /// Young soliciting food.
    pub const BEGGING: Self = Self(1 << 0);
    /// Courtship display.
    pub const COURTSHIP: Self = Self(1 << 1);
    /// Eating.
    pub const FEEDING: Self = Self(1 << 2);
    /// Searching for food.
    pub const FORAGING: Self = Self(1 << 3);
    /// Grooming or preening.
    pub const GROOMING: Self = Self(1 << 4);
    /// Travelling through the frame.
    pub const MOVING: Self = Self(1 << 5);
    /// Activity does not apply to this subject.
    pub const NOT_APPLICABLE: Self = Self(1 << 6);
    /// Activity not covered by another flag.
    pub const OTHER: Self = Self(1 << 7);
    /// Pair formation.
    pub const PAIR_FORMATION: Self = Self(1 << 8);
    /// Resting or sleeping.
    pub const RESTING: Self = Self(1 << 9);

    const NAMED: [(Self, &'static str); 10] = [
        (Self::BEGGING, "begging"),
        (Self::COURTSHIP, "courtship"),
        (Self::FEEDING, "feeding"),
        (Self::FORAGING, "foraging"),
        (Self::GROOMING, "grooming"),
        (Self::MOVING, "moving"),
        (Self::NOT_APPLICABLE, "notapplicable"),
        (Self::OTHER, "other"),
        (Self::PAIR_FORMATION, "pairformation"),
        (Self::RESTING, "resting"),
    ];

    /// Whether no flag is set.
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both flag sets.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        if self.0 == other.0 {
            return self;
        }
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for ActivityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for ActivityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("unknown");
        }

        let mut first = true;
        for (flag, name) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str(TEXT_MERGE_SEPARATOR)?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl FromStr for ActivityFlags {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::UNKNOWN;
        for token in s.split([',', '|']) {
            let token = normalize_token(token);
            if token.is_empty() || token == "unknown" {
                continue;
            }
            let flag = Self::NAMED
                .iter()
                .find(|(_, name)| *name == token)
                .map(|(flag, _)| *flag)
                .ok_or_else(|| format!("unknown activity: {}", token.trim()))?;
            flags = flags | flag;
        }
        Ok(flags)
    }
}

impl Serialize for ActivityFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Age class of the subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Age {
    /// Not recorded.
    #[default]
    Unknown,
    /// Adult.
    Adult,
    /// Subadult.
    Subadult,
    /// Juvenile.
    Juvenile,
    /// Images of one detection disagree on age.
    Various,
}

impl Age {
    /// Lowercase name used in tables.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Adult => "adult",
            Self::Subadult => "subadult",
            Self::Juvenile => "juvenile",
            Self::Various => "various",
        }
    }

    /// Keep agreeing ages; disagreement collapses to [`Age::Various`].
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if self == other { self } else { Self::Various }
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Age {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "" | "unknown" => Ok(Self::Unknown),
            "adult" => Ok(Self::Adult),
            "subadult" => Ok(Self::Subadult),
            "juvenile" => Ok(Self::Juvenile),
            "various" | "mixed" => Ok(Self::Various),
            _ => Err(format!("unknown age: {s}")),
        }
    }
}

/// How confident the observer was in the identification.
///
/// Variants are ordered from least to most confident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Not recorded.
    #[default]
    Unknown,
    /// Low confidence.
    Low,
    /// Medium confidence.
    Medium,
    /// High confidence.
    High,
}

impl Confidence {
    /// Lowercase name used in tables.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// The less confident of the two.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.min(other)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "" | "unknown" => Ok(Self::Unknown),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("unknown confidence: {s}")),
        }
    }
}

/// Social grouping of the subjects in frame.
///
/// Variants are ordered from the smallest to the largest grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// Not recorded.
    #[default]
    Unknown,
    /// Grouping does not apply to this subject.
    NotApplicable,
    /// A single individual.
    Single,
    /// Two adults.
    Pair,
    /// Adults with young.
    Family,
    /// More than a family.
    Group,
}

impl GroupType {
    /// Lowercase name used in tables.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NotApplicable => "notapplicable",
            Self::Single => "single",
            Self::Pair => "pair",
            Self::Family => "family",
            Self::Group => "group",
        }
    }

    /// Promote to the larger grouping.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "" | "unknown" => Ok(Self::Unknown),
            "notapplicable" | "na" => Ok(Self::NotApplicable),
            "single" => Ok(Self::Single),
            "pair" => Ok(Self::Pair),
            "family" => Ok(Self::Family),
            "group" => Ok(Self::Group),
            _ => Err(format!("unknown group type: {s}")),
        }
    }
}

/// What caused the camera to fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    /// Not recorded.
    #[default]
    Unknown,
    /// Passive infrared motion trigger.
    Motion,
    /// Scheduled time lapse.
    Timelapse,
}

impl TriggerSource {
    /// Lowercase name used in tables.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Motion => "motion",
            Self::Timelapse => "timelapse",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "" | "unknown" => Ok(Self::Unknown),
            "motion" | "m" => Ok(Self::Motion),
            "timelapse" | "t" => Ok(Self::Timelapse),
            _ => Err(format!("unknown trigger source: {s}")),
        }
    }
}

/// Append `incoming` to `existing` unless it is empty or already present.
///
/// Values are kept in the order first observed; the only deduplication is a
/// substring check against what has been accumulated so far.
pub fn merge_text(existing: &mut String, incoming: &str) {
    if incoming.trim().is_empty() || existing == incoming {
        return;
    }
    if existing.trim().is_empty() {
        incoming.clone_into(existing);
    } else if !existing.contains(incoming) {
        existing.push_str(TEXT_MERGE_SEPARATOR);
        existing.push_str(incoming);
    }
}

/// Observer-assigned attributes of an image or detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Behaviours observed.
    pub activity: ActivityFlags,
    /// Age class.
    pub age: Age,
    /// Identification confidence.
    pub confidence: Confidence,
    /// Social grouping.
    pub group_type: GroupType,
    /// Free-text coat or plumage notes.
    pub pelage: String,
    /// Free-text comments.
    pub comments: String,
}

impl Classification {
    /// Fold another observation into this one.
    pub fn merge(&mut self, other: &Self) {
        self.activity = self.activity.merge(other.activity);
        self.age = self.age.merge(other.age);
        self.confidence = self.confidence.merge(other.confidence);
        self.group_type = self.group_type.merge(other.group_type);
        merge_text(&mut self.pelage, &other.pelage);
        merge_text(&mut self.comments, &other.comments);
    }
}
