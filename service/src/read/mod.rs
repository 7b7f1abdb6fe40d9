//! Read models assembled out of the stored entities.

pub mod address;
pub mod error_report;
pub mod flat;
pub mod parameter;
pub mod user;

#[cfg(test)]
pub(crate) mod test {
    //! Entity fixtures for the tests.

    use common::DateTime;

    use crate::domain::{
        address, flat,
        user::{self, Role},
        Address, Flat, User,
    };

    /// Creates a new [`Address`] with the provided `id`.
    pub(crate) fn address(id: i32) -> Address {
        Address {
            id: address::Id::from(id),
            street: address::Street::new(format!("Gata {id}")).unwrap(),
            number: address::Number::new("1").unwrap(),
            zip_code: address::ZipCode::new("111 22").unwrap(),
            town: address::Town::new("Stockholm").unwrap(),
            country: address::Country::new("Sverige").unwrap(),
        }
    }

    /// Creates a new [`Flat`] at the provided `address` and `floor`.
    pub(crate) fn flat(id: i32, address: i32, floor: i32) -> Flat {
        Flat {
            id: flat::Id::from(id),
            address_id: address::Id::from(address),
            floor: flat::Floor::new(floor).unwrap(),
            number: flat::Number::new(id.to_string()).unwrap(),
            entry_door_code: None,
        }
    }

    /// Creates a new tenant [`User`] with the provided `last_name`.
    pub(crate) fn user(last_name: &str) -> User {
        with_role(last_name, Role::User)
    }

    /// Creates a new [`User`] with the provided `last_name` and [`Role`].
    pub(crate) fn with_role(last_name: &str, role: Role) -> User {
        User {
            id: user::Id::new(),
            role,
            personal_number: user::PersonalNumber::new(format!(
                "19800101-{last_name}",
            ))
            .unwrap(),
            first_name: None,
            last_name: user::Name::new(last_name),
            email: user::Email::new(format!(
                "{}@example.se",
                last_name.to_lowercase(),
            ))
            .unwrap(),
            phone_number: user::Phone::new("070-123 45 67"),
            phone_number2: None,
            password_hash: user::PasswordHash::new(
                &user::Password::new("password").unwrap(),
            )
            .unwrap(),
            registration_code: None,
            created_at: DateTime::now().coerce(),
        }
    }
}
