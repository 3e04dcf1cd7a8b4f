//! Visit records and their wire conversions.

use chrono::NaiveDate;

use crate::api::VisitsError;
use crate::proto;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub id: i32,
    pub pet_id: i32,
    pub date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub pet_id: i32,
    pub date: NaiveDate,
    pub description: String,
}

impl TryFrom<proto::Visit> for Visit {
    type Error = VisitsError;

    fn try_from(v: proto::Visit) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&v.date, DATE_FORMAT).map_err(|e| {
            VisitsError::InvalidResponse(format!("visit {} date '{}': {e}", v.id, v.date))
        })?;

        Ok(Self {
            id: v.id,
            pet_id: v.pet_id,
            date,
            description: v.description,
        })
    }
}

impl From<NewVisit> for proto::Visit {
    fn from(v: NewVisit) -> Self {
        Self {
            id: 0,
            pet_id: v.pet_id,
            date: v.date.format(DATE_FORMAT).to_string(),
            description: v.description,
        }
    }
}
