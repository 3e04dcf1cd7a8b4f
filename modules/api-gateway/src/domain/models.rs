//! Composite records returned by the gateway.

use chrono::NaiveDate;
use customers_sdk::{Owner, Pet, PetType};
use visits_sdk::Visit;

/// Owner together with its pets and, after aggregation, their visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerDetails {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
    pub pets: Vec<PetDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetDetails {
    pub id: i32,
    pub name: String,
    pub birth_date: NaiveDate,
    pub pet_type: PetType,
    /// Owner display name ("first last"), when the directory supplied one.
    pub owner: Option<String>,
    /// Empty until visits are attached.
    pub visits: Vec<Visit>,
}

impl From<Owner> for OwnerDetails {
    fn from(o: Owner) -> Self {
        Self {
            id: o.id,
            first_name: o.first_name,
            last_name: o.last_name,
            address: o.address,
            city: o.city,
            telephone: o.telephone,
            pets: o.pets.into_iter().map(PetDetails::from).collect(),
        }
    }
}

impl From<Pet> for PetDetails {
    fn from(p: Pet) -> Self {
        Self {
            id: p.id,
            name: p.name,
            birth_date: p.birth_date,
            pet_type: p.pet_type,
            owner: p.owner.map(|o| o.display_name()),
            visits: Vec::new(),
        }
    }
}
