//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Platform user: an administrator, a host or a tenant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`PersonalNumber`] of this [`User`], unique per [`Role`].
    pub personal_number: PersonalNumber,

    /// First [`Name`] of this [`User`].
    pub first_name: Option<Name>,

    /// Last [`Name`] of this [`User`].
    pub last_name: Option<Name>,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// Primary [`Phone`] number of this [`User`].
    pub phone_number: Option<Phone>,

    /// Secondary [`Phone`] number of this [`User`].
    pub phone_number2: Option<Phone>,

    /// [`PasswordHash`] of this [`User`].
    #[serde(skip)]
    pub password_hash: PasswordHash,

    /// [`RegistrationCode`] of this [`User`], until the registration is
    /// completed.
    #[serde(skip)]
    pub registration_code: Option<RegistrationCode>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

impl User {
    /// Returns the name this [`User`] is addressed by: the first [`Name`] if
    /// any, the last [`Name`] otherwise.
    #[must_use]
    pub fn addressed_name(&self) -> Option<&Name> {
        self.first_name.as_ref().or(self.last_name.as_ref())
    }

    /// Indicates whether this [`User`] has completed the registration.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registration_code.is_none()
    }
}

define_kind! {
    #[doc = "Role of a [`User`]."]
    enum Role {
        #[doc = "Administrator managing the whole platform."]
        Admin = 1,

        #[doc = "Landlord hosting one or more addresses."]
        Host = 2,

        #[doc = "Tenant living in one or more flats."]
        User = 3,
    }
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Personal identity number of a [`User`]."]
    PersonalNumber(max = 32)
}

define_text! {
    #[doc = "First or last name of a [`User`]."]
    Name(max = 128)
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Returns the normalized form of this [`Email`] used for lookups.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_uppercase()
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 256 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s-]{3,18}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Minimum number of characters in a [`Password`].
    pub const MIN_LEN: usize = 8;

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Generates a new random [`Password`].
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let len = password.as_ref().chars().count();
        (Self::MIN_LEN..=128).contains(&len)
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2id] hash of a [`Password`] in the PHC string format.
///
/// [Argon2id]: https://en.wikipedia.org/wiki/Argon2
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the provided [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If [`argon2`] fails to hash the [`Password`].
    pub fn new(
        password: &Password,
    ) -> Result<Self, argon2::password_hash::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, SaltString},
            Argon2, PasswordHasher as _,
        };

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
    }

    /// Checks whether this [`PasswordHash`] matches the provided [`Password`].
    ///
    /// A malformed [`PasswordHash`] matches nothing.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        use argon2::{Argon2, PasswordVerifier as _};

        argon2::PasswordHash::new(&self.0).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &hash)
                .is_ok()
        })
    }
}

/// Code mailed to a new [`User`] to complete the registration.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct RegistrationCode(String);

impl RegistrationCode {
    /// Number of characters in a [`RegistrationCode`].
    const LEN: usize = 8;

    /// Generates a new random [`RegistrationCode`].
    #[must_use]
    pub fn generate() -> Self {
        let mut code = Uuid::new_v4().simple().to_string();
        code.truncate(Self::LEN);
        Self(code.to_uppercase())
    }

    /// Checks whether the provided `input` matches this [`RegistrationCode`],
    /// ignoring surrounding whitespace and letter case.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.0.eq_ignore_ascii_case(input.trim())
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Email, Password, PasswordHash, Phone, RegistrationCode, Role};

    #[test]
    fn password_hash_verifies_only_original() {
        let password = Password::new("correct horse").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("wrong horse").unwrap()));
    }

    #[test]
    fn password_hash_is_salted() {
        let password = Password::new("correct horse").unwrap();

        assert_ne!(
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );
    }

    #[test]
    fn email_normalizes_to_upper_case() {
        let email = Email::new("Anna.Berg@example.se").unwrap();

        assert_eq!(email.normalized(), "ANNA.BERG@EXAMPLE.SE");
    }

    #[test]
    fn email_rejects_malformed() {
        assert!(Email::new("anna").is_none());
        assert!(Email::new("anna@example").is_none());
        assert!(Email::new("an na@example.se").is_none());
    }

    #[test]
    fn phone_accepts_common_forms() {
        assert!(Phone::new("+46 70-123 45 67").is_some());
        assert!(Phone::new("0701234567").is_some());
        assert!(Phone::new("call me").is_none());
    }

    #[test]
    fn registration_code_matches_case_insensitively() {
        let code = RegistrationCode::generate();

        assert_eq!(code.as_ref().len(), 8);
        assert!(code.matches(&format!(" {} ", code.as_ref().to_lowercase())));
        assert!(!code.matches("nope"));
    }

    #[test]
    fn role_round_trips_through_u8() {
        for role in Role::ALL {
            assert_eq!(Role::from_u8(role.u8()), Some(*role));
        }
        assert_eq!(Role::Host.to_string(), "HOST");
    }
}
