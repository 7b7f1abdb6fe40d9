//! Account forms.

use secrecy::SecretBox;
use serde::{Deserialize, Serialize};

use crate::domain::user;

use super::{optional_text, required, required_text, Errors};

/// Submitted form creating or editing a [`user::User`] account.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Account {
    /// Personal identity number.
    pub personal_number: Option<String>,

    /// First name.
    pub first_name: Option<String>,

    /// Last name.
    pub last_name: Option<String>,

    /// Email address.
    pub email: Option<String>,

    /// Primary phone number.
    pub phone_number: Option<String>,

    /// Secondary phone number.
    pub phone_number2: Option<String>,
}

/// Validated [`Account`] form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    /// [`user::PersonalNumber`] of the account.
    pub personal_number: user::PersonalNumber,

    /// First [`user::Name`] of the account.
    pub first_name: Option<user::Name>,

    /// Last [`user::Name`] of the account.
    pub last_name: Option<user::Name>,

    /// [`user::Email`] of the account.
    pub email: user::Email,

    /// Primary [`user::Phone`] of the account.
    pub phone_number: Option<user::Phone>,

    /// Secondary [`user::Phone`] of the account.
    pub phone_number2: Option<user::Phone>,
}

impl Profile {
    /// Copies this [`Profile`] into the provided [`user::User`].
    pub fn apply_to(self, user: &mut user::User) {
        let Self {
            personal_number,
            first_name,
            last_name,
            email,
            phone_number,
            phone_number2,
        } = self;
        user.personal_number = personal_number;
        user.first_name = first_name;
        user.last_name = last_name;
        user.email = email;
        user.phone_number = phone_number;
        user.phone_number2 = phone_number2;
    }
}

impl Account {
    /// Name of the personal number field.
    pub const PERSONAL_NUMBER: &'static str = "PersonalNumber";

    /// Name of the email field.
    pub const EMAIL: &'static str = "Email";

    /// Message reported when the personal number is taken within the role.
    pub const PERSONAL_NUMBER_TAKEN: &'static str =
        "En användare med samma personnummer finns redan i databasen.";

    /// Message reported when the email is taken.
    pub const EMAIL_TAKEN: &'static str =
        "En användare med samma e-post finns redan.";

    /// Validates this [`Account`] form into a [`Profile`].
    ///
    /// # Errors
    ///
    /// With the [`Errors`] of every failed check, in the order of the fields.
    pub fn validate(&self) -> Result<Profile, Errors> {
        let mut errors = Errors::default();

        let personal_number = required_text(
            &mut errors,
            Self::PERSONAL_NUMBER,
            "Personnummer",
            user::PersonalNumber::MAX_LEN,
            self.personal_number.as_deref(),
            user::PersonalNumber::new,
        );
        let first_name = optional_text(
            &mut errors,
            "FirstName",
            "Förnamn",
            user::Name::MAX_LEN,
            self.first_name.as_deref(),
            user::Name::new,
        );
        let last_name = optional_text(
            &mut errors,
            "LastName",
            "Efternamn",
            user::Name::MAX_LEN,
            self.last_name.as_deref(),
            user::Name::new,
        );
        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push(Self::EMAIL, required("E-post"));
                None
            }
            Some(e) => {
                let email = user::Email::new(e);
                if email.is_none() {
                    errors.push(
                        Self::EMAIL,
                        "E-post fältet är inte en giltig e-postadress!",
                    );
                }
                email
            }
        };
        let phone_number = optional_text(
            &mut errors,
            "PhoneNumber",
            "Telefonnummer",
            32,
            self.phone_number.as_deref(),
            user::Phone::new,
        );
        let phone_number2 = optional_text(
            &mut errors,
            "PhoneNumber2",
            "Telefonnummer 2",
            32,
            self.phone_number2.as_deref(),
            user::Phone::new,
        );

        match (personal_number, email) {
            (Some(personal_number), Some(email)) if errors.is_empty() => {
                Ok(Profile {
                    personal_number,
                    first_name,
                    last_name,
                    email,
                    phone_number,
                    phone_number2,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&user::User> for Account {
    fn from(user: &user::User) -> Self {
        Self {
            personal_number: Some(user.personal_number.to_string()),
            first_name: user.first_name.as_ref().map(ToString::to_string),
            last_name: user.last_name.as_ref().map(ToString::to_string),
            email: Some(user.email.to_string()),
            phone_number: user.phone_number.as_ref().map(ToString::to_string),
            phone_number2: user
                .phone_number2
                .as_ref()
                .map(ToString::to_string),
        }
    }
}

/// Submitted form completing a registration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct Registration {
    /// Email address the registration code was sent to.
    pub email: Option<String>,

    /// Registration code received by email.
    pub registration_code: Option<String>,

    /// Chosen password.
    pub password: Option<String>,

    /// Repeated chosen password.
    pub confirm_password: Option<String>,
}

/// Validated [`Registration`] form.
#[derive(Debug)]
pub struct Credentials {
    /// [`user::Email`] the registration code was sent to.
    pub email: user::Email,

    /// Registration code as entered.
    pub registration_code: String,

    /// Chosen [`user::Password`].
    pub password: SecretBox<user::Password>,
}

impl Registration {
    /// Validates this [`Registration`] form into [`Credentials`].
    ///
    /// # Errors
    ///
    /// With the [`Errors`] of every failed check, in the order of the fields.
    pub fn validate(&self) -> Result<Credentials, Errors> {
        let mut errors = Errors::default();

        let email = required_text(
            &mut errors,
            "Email",
            "E-post",
            256,
            self.email.as_deref(),
            user::Email::new,
        );
        let registration_code = required_text(
            &mut errors,
            "RegistrationCode",
            "Registreringskod",
            32,
            self.registration_code.as_deref(),
            |c| Some(c.to_owned()),
        );
        let password = match self.password.as_deref() {
            None | Some("") => {
                errors.push("Password", required("Lösenord"));
                None
            }
            Some(p) => {
                let password = user::Password::new(p);
                if password.is_none() {
                    errors.push(
                        "Password",
                        format!(
                            "Lösenord fältet måste innehålla minst {} tecken!",
                            user::Password::MIN_LEN,
                        ),
                    );
                }
                password
            }
        };
        if self.password != self.confirm_password {
            errors.push("ConfirmPassword", "Lösenorden matchar inte!");
        }

        match (email, registration_code, password) {
            (Some(email), Some(registration_code), Some(password))
                if errors.is_empty() =>
            {
                Ok(Credentials {
                    email,
                    registration_code,
                    password: SecretBox::new(Box::new(password)),
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{domain::user::Role, read::test::with_role};

    use super::{Account, Registration};

    #[test]
    fn prefills_from_stored_user() {
        let user = with_role("Berg", Role::Host);

        let form = Account::from(&user);

        assert_eq!(form.last_name.as_deref(), Some("Berg"));
        assert_eq!(form.first_name, None);
        let profile = form.validate().unwrap();
        assert_eq!(profile.email, user.email);
        assert_eq!(profile.personal_number, user.personal_number);
    }

    fn account() -> Account {
        Account {
            personal_number: Some("19800101-1234".into()),
            first_name: Some("Anna".into()),
            last_name: None,
            email: Some("anna@example.se".into()),
            phone_number: Some(String::new()),
            phone_number2: None,
        }
    }

    #[test]
    fn accepts_minimal_account() {
        let profile = account().validate().unwrap();

        assert_eq!(profile.personal_number.as_ref(), "19800101-1234");
        assert_eq!(profile.last_name, None);
        assert_eq!(profile.phone_number, None);
    }

    #[test]
    fn requires_personal_number_and_email() {
        let form = Account {
            personal_number: None,
            email: Some("not an email".into()),
            ..account()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.iter().map(|e| e.field).collect::<Vec<_>>(),
            ["PersonalNumber", "Email"],
        );
        assert_eq!(
            errors.get("Email"),
            Some("E-post fältet är inte en giltig e-postadress!"),
        );
    }

    #[test]
    fn registration_requires_matching_passwords() {
        let form = Registration {
            email: Some("anna@example.se".into()),
            registration_code: Some("ABCD1234".into()),
            password: Some("long enough".into()),
            confirm_password: Some("different!".into()),
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.get("ConfirmPassword"),
            Some("Lösenorden matchar inte!"),
        );
    }
}
