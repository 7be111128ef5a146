use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering follows the order the dashboards list sentiments in.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("unknown sentiment: {other}")),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-assigned identifier, compared as text. A JSON number is read as its decimal
/// string; the number is remembered only so the id goes back out in the shape the
/// server sent it.
#[derive(Clone, Debug)]
pub struct OpaqueId {
    text: String,
    number: Option<serde_json::Number>,
}

impl OpaqueId {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for OpaqueId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for OpaqueId {}

impl Hash for OpaqueId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl From<&str> for OpaqueId {
    fn from(raw: &str) -> Self {
        OpaqueId {
            text: raw.to_string(),
            number: None,
        }
    }
}

impl From<String> for OpaqueId {
    fn from(text: String) -> Self {
        OpaqueId { text, number: None }
    }
}

impl From<i64> for OpaqueId {
    fn from(value: i64) -> Self {
        OpaqueId {
            text: value.to_string(),
            number: Some(value.into()),
        }
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for OpaqueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.number {
            Some(number) => number.serialize(serializer),
            None => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for OpaqueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Number(number) => OpaqueId {
                text: number.to_string(),
                number: Some(number),
            },
            WireId::Text(text) => OpaqueId::from(text),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: OpaqueId,
    #[serde(default)]
    pub employee_id: Option<OpaqueId>,
    #[serde(default)]
    pub employee_username: Option<String>,
    #[serde(default)]
    pub manager_username: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub strengths: Option<String>,
    #[serde(default)]
    pub improvements: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub anonymous: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub acknowledged: bool,
    #[serde(default)]
    pub employee_comments: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FeedbackRecord {
    /// Author as the subject may see it; `None` when anonymous.
    pub fn visible_author(&self) -> Option<&str> {
        if self.anonymous {
            return None;
        }
        non_empty(self.manager_username.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamOverview {
    #[serde(default)]
    pub employees_count: u64,
    #[serde(default)]
    pub total_feedbacks: u64,
    #[serde(default, deserialize_with = "lenient_breakdown")]
    pub sentiment_breakdown: BTreeMap<Sentiment, u64>,
}

impl TeamOverview {
    pub fn count(&self, sentiment: Sentiment) -> u64 {
        self.sentiment_breakdown.get(&sentiment).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: OpaqueId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationProfile {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub employee_id: OpaqueId,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
}

/// Full replacement of the manager-editable fields of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackUpdate {
    pub strengths: String,
    pub improvements: String,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub employee_comments: String,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Unknown sentiments and non-numeric counts are dropped instead of failing the overview.
fn lenient_breakdown<'de, D>(deserializer: D) -> Result<BTreeMap<Sentiment, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, Value> = null_as_default(deserializer)?;
    let mut breakdown = BTreeMap::new();
    for (key, count) in raw {
        let Ok(sentiment) = key.parse::<Sentiment>() else {
            tracing::warn!("Ignoring unknown sentiment {:?} in team overview", key);
            continue;
        };
        match count.as_u64() {
            Some(count) => {
                *breakdown.entry(sentiment).or_insert(0) += count;
            }
            None if count.is_null() => {}
            None => tracing::warn!("Ignoring count {} for sentiment {}", count, sentiment),
        }
    }
    Ok(breakdown)
}

// Accepts RFC 3339 as well as the naive ISO timestamps some backends emit (read as UTC).
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
