use crate::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The six business fields of a schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    pub reg_number: String,
    pub name: String,
    pub company_name: String,
    /// Time of day, `HH:MM`.
    pub duration: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub room_number: String,
}

impl EntryFields {
    pub fn trimmed(&self) -> Self {
        Self {
            reg_number: self.reg_number.trim().to_string(),
            name: self.name.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
            duration: self.duration.trim().to_string(),
            date: self.date.trim().to_string(),
            room_number: self.room_number.trim().to_string(),
        }
    }

    /// Values in display order, matching the table's columns.
    pub fn values(&self) -> [&str; 6] {
        [
            self.reg_number.as_str(),
            self.name.as_str(),
            self.company_name.as_str(),
            self.duration.as_str(),
            self.date.as_str(),
            self.room_number.as_str(),
        ]
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::RegNumber => &self.reg_number,
            Field::Name => &self.name,
            Field::CompanyName => &self.company_name,
            Field::Duration => &self.duration,
            Field::Date => &self.date,
            Field::RoomNumber => &self.room_number,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::RegNumber => &mut self.reg_number,
            Field::Name => &mut self.name,
            Field::CompanyName => &mut self.company_name,
            Field::Duration => &mut self.duration,
            Field::Date => &mut self.date,
            Field::RoomNumber => &mut self.room_number,
        };
        *slot = value.into();
    }

    /// Fails on the first blank field. Whitespace-only counts as blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match Field::ALL
            .into_iter()
            .find(|field| self.get(*field).trim().is_empty())
        {
            Some(field) => Err(ValidationError { field }),
            None => Ok(()),
        }
    }

    /// `YYYY-MM-DDTHH:MM`, compared as a plain string when ordering rows.
    pub fn sort_key(&self) -> String {
        format!("{}T{}", self.date, self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RegNumber,
    Name,
    CompanyName,
    Duration,
    Date,
    RoomNumber,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::RegNumber,
        Field::Name,
        Field::CompanyName,
        Field::Duration,
        Field::Date,
        Field::RoomNumber,
    ];

    pub fn json_name(self) -> &'static str {
        match self {
            Field::RegNumber => "regNumber",
            Field::Name => "name",
            Field::CompanyName => "companyName",
            Field::Duration => "duration",
            Field::Date => "date",
            Field::RoomNumber => "roomNumber",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::RegNumber => "Reg. number",
            Field::Name => "Name",
            Field::CompanyName => "Company",
            Field::Duration => "Time",
            Field::Date => "Date",
            Field::RoomNumber => "Room",
        }
    }

    pub(crate) fn input_type(self) -> &'static str {
        match self {
            Field::Duration => "time",
            Field::Date => "date",
            _ => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    #[serde(flatten)]
    pub fields: EntryFields,
}

/// Request body for create and update. Every field is optional so a missing
/// key is reported as a validation failure rather than a decode failure.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    #[serde(default, deserialize_with = "scalar_text")]
    pub reg_number: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub room_number: Option<String>,
}

/// Numbers are kept as their text (`"roomNumber": 101` stores `"101"`).
/// `null`, booleans, arrays and objects read as absent.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

impl EntryPayload {
    pub fn into_fields(self) -> Result<EntryFields, ValidationError> {
        let fields = EntryFields {
            reg_number: self.reg_number.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            company_name: self.company_name.unwrap_or_default(),
            duration: self.duration.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            room_number: self.room_number.unwrap_or_default(),
        };
        fields.validate()?;
        Ok(fields)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
