//! Structural conversions between proto messages and SDK models.

use chrono::NaiveDate;

use crate::error::CustomersError;
use crate::models::{NewOwner, NewPet, Owner, OwnerName, Pet, PetType};
use crate::{DATE_FORMAT, proto};

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CustomersError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        CustomersError::InvalidResponse(format!("{field} '{value}' is not a YYYY-MM-DD date: {e}"))
    })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl TryFrom<proto::Owner> for Owner {
    type Error = CustomersError;

    fn try_from(owner: proto::Owner) -> Result<Self, Self::Error> {
        let pets = owner
            .pets
            .into_iter()
            .map(Pet::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: owner.id,
            first_name: owner.first_name,
            last_name: owner.last_name,
            address: owner.address,
            city: owner.city,
            telephone: owner.telephone,
            pets,
        })
    }
}

impl TryFrom<proto::Pet> for Pet {
    type Error = CustomersError;

    fn try_from(pet: proto::Pet) -> Result<Self, Self::Error> {
        let pet_type = pet
            .pet_type
            .map(PetType::from)
            .ok_or_else(|| CustomersError::InvalidResponse(format!("pet {} has no type", pet.id)))?;

        Ok(Self {
            id: pet.id,
            birth_date: parse_date("birth_date", &pet.birth_date)?,
            name: pet.name,
            pet_type,
            owner: pet.owner.filter(|o| o.id != 0).map(OwnerName::from),
        })
    }
}

impl From<proto::PetType> for PetType {
    fn from(t: proto::PetType) -> Self {
        Self {
            id: t.id,
            name: t.name,
        }
    }
}

impl From<proto::OwnerRef> for OwnerName {
    fn from(o: proto::OwnerRef) -> Self {
        Self {
            id: o.id,
            first_name: o.first_name,
            last_name: o.last_name,
        }
    }
}

/// `id` is 0 for an owner that does not exist yet.
pub(crate) fn owner_message(id: i32, owner: NewOwner) -> proto::Owner {
    proto::Owner {
        id,
        first_name: owner.first_name,
        last_name: owner.last_name,
        address: owner.address,
        city: owner.city,
        telephone: owner.telephone,
        pets: Vec::new(),
    }
}

pub(crate) fn pet_message(id: i32, owner_id: Option<i32>, pet: NewPet) -> proto::Pet {
    proto::Pet {
        id,
        name: pet.name,
        birth_date: format_date(pet.birth_date),
        pet_type: Some(proto::PetType {
            id: pet.type_id,
            name: String::new(),
        }),
        owner: owner_id.map(|id| proto::OwnerRef {
            id,
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proto_pet(id: i32, birth_date: &str) -> proto::Pet {
        proto::Pet {
            id,
            name: format!("pet-{id}"),
            birth_date: birth_date.to_owned(),
            pet_type: Some(proto::PetType {
                id: 2,
                name: "dog".to_owned(),
            }),
            owner: None,
        }
    }

    #[test]
    fn owner_keeps_pet_order() {
        let owner = proto::Owner {
            id: 1,
            first_name: "George".to_owned(),
            last_name: "Franklin".to_owned(),
            pets: vec![proto_pet(12, "2020-01-01"), proto_pet(3, "2019-05-06")],
            ..Default::default()
        };

        let owner = Owner::try_from(owner).unwrap();
        assert_eq!(owner.pet_ids(), vec![12, 3]);
        assert_eq!(
            owner.pets[1].birth_date,
            NaiveDate::from_ymd_opt(2019, 5, 6).unwrap()
        );
    }

    #[test]
    fn bad_birth_date_is_invalid_response() {
        let err = Pet::try_from(proto_pet(1, "06/05/2019")).unwrap_err();
        assert!(matches!(err, CustomersError::InvalidResponse(msg) if msg.contains("birth_date")));
    }

    #[test]
    fn missing_pet_type_is_invalid_response() {
        let mut pet = proto_pet(1, "2020-01-01");
        pet.pet_type = None;
        assert!(matches!(
            Pet::try_from(pet),
            Err(CustomersError::InvalidResponse(_))
        ));
    }

    #[test]
    fn owner_ref_with_zero_id_is_absent() {
        let mut pet = proto_pet(1, "2020-01-01");
        pet.owner = Some(proto::OwnerRef::default());
        assert_eq!(Pet::try_from(pet).unwrap().owner, None);
    }

    #[test]
    fn pet_message_formats_date_and_owner() {
        let msg = pet_message(
            0,
            Some(6),
            NewPet {
                name: "Leo".to_owned(),
                birth_date: NaiveDate::from_ymd_opt(2010, 9, 7).unwrap(),
                type_id: 1,
            },
        );
        assert_eq!(msg.birth_date, "2010-09-07");
        assert_eq!(msg.owner.map(|o| o.id), Some(6));
        assert_eq!(msg.pet_type.map(|t| t.id), Some(1));
    }
}
