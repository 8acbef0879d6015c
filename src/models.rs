use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Transcript ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message whose id is `<kind>-<uuid>`, unique across the transcript.
    pub fn new(kind: &str, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: format!("{kind}-{}", uuid::Uuid::new_v4()),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", MessageRole::User, content)
    }

    pub fn assistant(kind: &str, content: impl Into<String>) -> Self {
        Self::new(kind, MessageRole::Assistant, content)
    }

    /// Content with escaped `\n` sequences (as some backends stream them) turned
    /// into real line breaks.
    pub fn display_text(&self) -> String {
        self.content.replace("\\n", "\n")
    }
}

// ── Slot collection ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Incomplete,
    InProgress,
    Complete,
}

impl SlotStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, SlotStatus::Complete)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewSessionResponse {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SlotStatusResponse {
    pub status: SlotStatus,
}

// ── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Airport {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlightOffer {
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub departure_airport: Option<Airport>,
    #[serde(default)]
    pub arrival_airport: Option<Airport>,
    /// Total flight time in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub airplane: Option<String>,
    #[serde(default)]
    pub travel_class: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatePerNight {
    #[serde(default)]
    pub lowest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transportation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub duration: Option<String>,
}

impl Transportation {
    pub fn is_walking(&self) -> bool {
        self.kind == "Walking"
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NearbyPlace {
    pub name: String,
    #[serde(default)]
    pub transportations: Vec<Transportation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HotelOffer {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub hotel_class: Option<String>,
    #[serde(default)]
    pub rate_per_night: Option<RatePerNight>,
    #[serde(default)]
    pub overall_rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u64>,
    #[serde(default)]
    pub nearby_places: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
pub struct FlightsResponse {
    #[serde(default)]
    pub flights: Vec<FlightOffer>,
}

#[derive(Debug, Deserialize)]
pub struct HotelsResponse {
    #[serde(default)]
    pub hotels: Vec<HotelOffer>,
}

/// Hotel class arrives either as text ("4-star hotel") or as a bare number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
