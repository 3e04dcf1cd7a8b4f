//! Directory records as seen by the gateway.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
    /// In the order returned by the directory service.
    pub pets: Vec<Pet>,
}

impl Owner {
    #[must_use]
    pub fn pet_ids(&self) -> Vec<i32> {
        self.pets.iter().map(|p| p.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    pub id: i32,
    pub name: String,
    pub birth_date: NaiveDate,
    pub pet_type: PetType,
    /// Only present when the pet is fetched on its own.
    pub owner: Option<OwnerName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetType {
    pub id: i32,
    pub name: String,
}

/// Owner identity attached to a pet for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerName {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl OwnerName {
    /// "first last"
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Owner fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
}

/// Pet fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub birth_date: NaiveDate,
    pub type_id: i32,
}
