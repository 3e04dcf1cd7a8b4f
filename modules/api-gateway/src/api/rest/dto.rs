//! REST DTOs. JSON field names are camelCase; dates are `YYYY-MM-DD`.

use chrono::NaiveDate;
use customers_sdk::{NewOwner, NewPet, PetType};
use petclinic_errors::ValidationViolation;
use petclinic_transport_grpc::BreakerSnapshot;
use serde::{Deserialize, Serialize};
use visits_sdk::{NewVisit, Visit};

use crate::domain::{OwnerDetails, PetDetails};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_TELEPHONE_DIGITS: usize = 12;
const MAX_DESCRIPTION_LEN: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
    pub pets: Vec<PetDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDto {
    pub id: i32,
    pub name: String,
    pub birth_date: NaiveDate,
    #[serde(rename = "type")]
    pub pet_type: PetTypeDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub visits: Vec<VisitDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetTypeDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDto {
    pub id: i32,
    pub pet_id: i32,
    pub date: NaiveDate,
    pub description: String,
}

impl From<OwnerDetails> for OwnerDto {
    fn from(o: OwnerDetails) -> Self {
        Self {
            id: o.id,
            first_name: o.first_name,
            last_name: o.last_name,
            address: o.address,
            city: o.city,
            telephone: o.telephone,
            pets: o.pets.into_iter().map(PetDto::from).collect(),
        }
    }
}

impl From<PetDetails> for PetDto {
    fn from(p: PetDetails) -> Self {
        Self {
            id: p.id,
            name: p.name,
            birth_date: p.birth_date,
            pet_type: p.pet_type.into(),
            owner: p.owner,
            visits: p.visits.into_iter().map(VisitDto::from).collect(),
        }
    }
}

impl From<PetType> for PetTypeDto {
    fn from(t: PetType) -> Self {
        Self {
            id: t.id,
            name: t.name,
        }
    }
}

impl From<Visit> for VisitDto {
    fn from(v: Visit) -> Self {
        Self {
            id: v.id,
            pet_id: v.pet_id,
            date: v.date,
            description: v.description,
        }
    }
}

/// Body of `POST /owners` and `PUT /owners/{ownerId}`.
///
/// Other fields a client echoes back (`id`, `pets`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerRequest {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
}

impl OwnerRequest {
    /// # Errors
    /// One violation per invalid field.
    pub fn validate(self) -> Result<NewOwner, Vec<ValidationViolation>> {
        let mut violations = Vec::new();
        not_blank(&mut violations, "firstName", &self.first_name);
        not_blank(&mut violations, "lastName", &self.last_name);
        not_blank(&mut violations, "address", &self.address);
        not_blank(&mut violations, "city", &self.city);

        let telephone = self.telephone.trim();
        if telephone.is_empty() {
            violations.push(ValidationViolation::new("telephone", "must not be empty"));
        } else if telephone.len() > MAX_TELEPHONE_DIGITS
            || !telephone.chars().all(|c| c.is_ascii_digit())
        {
            violations.push(ValidationViolation::new(
                "telephone",
                format!("must be a number of at most {MAX_TELEPHONE_DIGITS} digits"),
            ));
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(NewOwner {
            telephone: telephone.to_owned(),
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            city: self.city,
        })
    }
}

/// Body of `POST /owners/{ownerId}/pets` and `PUT /owners/{ownerId}/pets/{petId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetRequest {
    pub name: String,
    pub birth_date: Option<String>,
    pub type_id: Option<i32>,
}

impl PetRequest {
    /// # Errors
    /// One violation per invalid field.
    pub fn validate(self) -> Result<NewPet, Vec<ValidationViolation>> {
        let mut violations = Vec::new();
        not_blank(&mut violations, "name", &self.name);
        let birth_date = required_date(&mut violations, "birthDate", self.birth_date.as_deref());
        let type_id = match self.type_id {
            Some(id) if id > 0 => Some(id),
            Some(_) => {
                violations.push(ValidationViolation::new(
                    "typeId",
                    "must be a positive integer",
                ));
                None
            }
            None => {
                violations.push(ValidationViolation::new("typeId", "is required"));
                None
            }
        };

        match (birth_date, type_id) {
            (Some(birth_date), Some(type_id)) if violations.is_empty() => Ok(NewPet {
                name: self.name,
                birth_date,
                type_id,
            }),
            _ => Err(violations),
        }
    }
}

/// Body of `POST /owners/{ownerId}/pets/{petId}/visits`. The pet id comes from the path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitRequest {
    pub date: Option<String>,
    pub description: String,
}

impl VisitRequest {
    /// # Errors
    /// One violation per invalid field.
    pub fn validate(self, pet_id: i32) -> Result<NewVisit, Vec<ValidationViolation>> {
        let mut violations = Vec::new();
        let date = required_date(&mut violations, "date", self.date.as_deref());
        not_blank(&mut violations, "description", &self.description);
        if self.description.len() > MAX_DESCRIPTION_LEN {
            violations.push(ValidationViolation::new(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }

        match date {
            Some(date) if violations.is_empty() => Ok(NewVisit {
                pet_id,
                date,
                description: self.description,
            }),
            _ => Err(violations),
        }
    }
}

fn not_blank(violations: &mut Vec<ValidationViolation>, field: &str, value: &str) {
    if value.trim().is_empty() {
        violations.push(ValidationViolation::new(field, "must not be empty"));
    }
}

fn required_date(
    violations: &mut Vec<ValidationViolation>,
    field: &str,
    value: Option<&str>,
) -> Option<NaiveDate> {
    let Some(raw) = value else {
        violations.push(ValidationViolation::new(field, "is required"));
        return None;
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Some(date)
    } else {
        violations.push(ValidationViolation::new(
            field,
            format!("'{raw}' is not a YYYY-MM-DD date"),
        ));
        None
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: &'static str,
    pub visits_breaker: BreakerDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerDto {
    pub name: &'static str,
    pub state: &'static str,
    pub consecutive_failures: u32,
}

impl From<BreakerSnapshot> for HealthDto {
    fn from(s: BreakerSnapshot) -> Self {
        Self {
            status: "UP",
            visits_breaker: BreakerDto {
                name: s.name,
                state: s.state.as_str(),
                consecutive_failures: s.consecutive_failures,
            },
        }
    }
}
