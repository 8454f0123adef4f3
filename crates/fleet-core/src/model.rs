use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Stable daemon identity. Snapshots send ids as JSON numbers or strings; both
/// normalize to the same string so `1` and `"1"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DaemonId(String);

impl DaemonId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DaemonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DaemonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DaemonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for DaemonId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for DaemonId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DaemonId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DaemonIdVisitor;

        impl<'de> Visitor<'de> for DaemonIdVisitor {
            type Value = DaemonId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a daemon id as string or number")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(DaemonId(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(DaemonId(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if !value.is_finite() {
                    return Err(E::custom(format!("daemon id is not finite: {value}")));
                }
                if value.fract() == 0.0 && value.abs() < 9.0e15 {
                    Ok(DaemonId(format!("{}", value as i64)))
                } else {
                    Ok(DaemonId(value.to_string()))
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(DaemonId(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(DaemonId(value))
            }
        }

        deserializer.deserialize_any(DaemonIdVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DaemonStatus {
    Up,
    #[default]
    Down,
}

impl DaemonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DaemonStatus::Up => "UP",
            DaemonStatus::Down => "DOWN",
        }
    }

    pub fn for_instances(instance: u64) -> Self {
        if instance < 1 {
            DaemonStatus::Down
        } else {
            DaemonStatus::Up
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            DaemonStatus::Up => DaemonStatus::Down,
            DaemonStatus::Down => DaemonStatus::Up,
        }
    }

    pub fn is_up(self) -> bool {
        self == DaemonStatus::Up
    }
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DaemonStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DaemonStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let status = match value {
            Value::String(raw) if raw.trim().eq_ignore_ascii_case("up") => DaemonStatus::Up,
            Value::Bool(true) => DaemonStatus::Up,
            _ => DaemonStatus::Down,
        };
        Ok(status)
    }
}

/// One monitored daemon as held by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonRecord {
    pub daemon_id: DaemonId,
    #[serde(default, deserialize_with = "lenient_name")]
    pub daemon_name: String,
    #[serde(default)]
    pub daemon_status: DaemonStatus,
    #[serde(default, deserialize_with = "lenient_instance")]
    pub instance: u64,
}

impl DaemonRecord {
    pub fn new(daemon_id: impl Into<DaemonId>, daemon_name: impl Into<String>, instance: u64) -> Self {
        Self {
            daemon_id: daemon_id.into(),
            daemon_name: daemon_name.into(),
            daemon_status: DaemonStatus::for_instances(instance),
            instance,
        }
    }

    /// Re-derives `daemon_status` from `instance`.
    pub fn normalize_status(&mut self) {
        self.daemon_status = DaemonStatus::for_instances(self.instance);
    }

    pub fn status_matches_instances(&self) -> bool {
        self.daemon_status == DaemonStatus::for_instances(self.instance)
    }
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(name) => name,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_instance<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(instance_from_value(&value))
}

/// Numeric coercion for instance counts: numbers and numeric strings are
/// accepted, negatives clamp to zero and anything else reads as zero.
pub fn instance_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(number) => {
            if let Some(count) = number.as_u64() {
                count
            } else {
                number
                    .as_f64()
                    .filter(|raw| raw.is_finite() && *raw > 0.0)
                    .map(|raw| raw.trunc() as u64)
                    .unwrap_or(0)
            }
        }
        Value::String(raw) => {
            let trimmed = raw.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|parsed| parsed.is_finite() && *parsed > 0.0)
                        .map(|parsed| parsed.trunc() as u64)
                })
                .unwrap_or(0)
        }
        Value::Bool(true) => 1,
        _ => 0,
    }
}
