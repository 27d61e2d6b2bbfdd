use serde::{de, Deserialize, Deserializer, Serialize};

/// Age bracket a user can put on their profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "teen")]
    Teen,
    #[serde(rename = "20s")]
    Twenties,
    #[serde(rename = "30s")]
    Thirties,
    #[serde(rename = "40s")]
    Forties,
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "60plus")]
    SixtyPlus,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Teen => "teen",
            AgeGroup::Twenties => "20s",
            AgeGroup::Thirties => "30s",
            AgeGroup::Forties => "40s",
            AgeGroup::Fifties => "50s",
            AgeGroup::SixtyPlus => "60plus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "teen" => Some(AgeGroup::Teen),
            "20s" => Some(AgeGroup::Twenties),
            "30s" => Some(AgeGroup::Thirties),
            "40s" => Some(AgeGroup::Forties),
            "50s" => Some(AgeGroup::Fifties),
            "60plus" => Some(AgeGroup::SixtyPlus),
            _ => None,
        }
    }
}

/// How a traveller gets from one route point to the next.
///
/// Accepted in any letter case on input, written lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Walk,
    Train,
    Bus,
    Car,
    Bicycle,
    Plane,
    Ship,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walk => "walk",
            TransportMode::Train => "train",
            TransportMode::Bus => "bus",
            TransportMode::Car => "car",
            TransportMode::Bicycle => "bicycle",
            TransportMode::Plane => "plane",
            TransportMode::Ship => "ship",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "walk" => Some(TransportMode::Walk),
            "train" => Some(TransportMode::Train),
            "bus" => Some(TransportMode::Bus),
            "car" => Some(TransportMode::Car),
            "bicycle" => Some(TransportMode::Bicycle),
            "plane" => Some(TransportMode::Plane),
            "ship" => Some(TransportMode::Ship),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for TransportMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TransportMode::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown transport mode: {raw}")))
    }
}
