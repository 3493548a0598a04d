use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Employee {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub nis: Option<String>,
    pub pin: Option<String>,
    pub registration_number: Option<String>,
    pub work_hours: Option<String>,
    pub cost_center: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_clt: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_time_cards: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub use_qrcode: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub enable_geolocation: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub enable_offline_time_cards: bool,
}

/// The API sends `null` for attributes it has no value for.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmployeesResponse {
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// One credit or debit on an employee's time balance.
///
/// `amount_seconds` is always a magnitude; the direction lives in `withdraw`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBalanceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(rename = "amount")]
    pub amount_seconds: f64,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    pub observation: String,
    pub withdraw: bool,
}

impl TimeBalanceEntry {
    pub fn hours(&self) -> f64 {
        self.amount_seconds / 3600.0
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TimeBalanceEntryBody<'a> {
    pub time_balance_entry: &'a TimeBalanceEntry,
}

mod wire_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&crate::dates::DAY_FIRST.format(*date))
    }
}
