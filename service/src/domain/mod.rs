//! Domain definitions.

/// Defines a free-text newtype rejecting empty, untrimmed or too long values.
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        $name:ident(max = $max:literal)
    ) => {
        #[doc = $doc]
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            PartialEq,
            ::serde::Serialize,
        )]
        #[as_ref(str)]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent)
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Maximum number of characters.
            pub const MAX_LEN: usize = $max;

            #[doc = concat!(
                "Creates a new [`", stringify!($name), "`] if the given ",
                "`value` is valid.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            #[doc = concat!(
                "Checks whether the given `value` is a valid [`",
                stringify!($name), "`].",
            )]
            fn check(value: &str) -> bool {
                value.trim() == value
                    && !value.is_empty()
                    && value.chars().count() <= Self::MAX_LEN
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
                    .ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

pub mod address;
pub mod address_host;
pub mod error_report;
pub mod flat;
pub mod parameter;
pub mod user;

pub use self::{
    address::Address, address_host::AddressHost, error_report::ErrorReport,
    flat::Flat, parameter::Parameter, user::User,
};

#[cfg(test)]
mod spec {
    use super::address::Street;

    #[test]
    fn text_rejects_blank_and_untrimmed() {
        assert!(Street::new("Storgatan").is_some());
        assert!(Street::new("").is_none());
        assert!(Street::new(" Storgatan").is_none());
        assert!(Street::new("Storgatan ").is_none());
        assert!(Street::new("x".repeat(Street::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn text_counts_characters_not_bytes() {
        assert!(Street::new("å".repeat(Street::MAX_LEN)).is_some());
    }
}
