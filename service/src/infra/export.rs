//! Zip export of [`Address`] tenants.

use std::io::{self, Cursor, Write as _};

use derive_more::{Display, Error as StdError, From};
use serde::Serialize;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    domain::{flat, user, Address},
    read::address::FlatEntry,
};

/// Name of the archived file listing the tenants.
pub const USERS_FILE: &str = "users.json";

/// Exported file ready to be downloaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Export {
    /// Name of the exported file.
    pub file_name: String,

    /// Contents of the exported file.
    pub bytes: Vec<u8>,
}

/// Export error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O error.
    #[display("I/O failed: {_0}")]
    Io(io::Error),

    /// Tenants serialization error.
    #[display("Failed to serialize tenants: {_0}")]
    Json(serde_json::Error),

    /// Archive error.
    #[display("Failed to write archive: {_0}")]
    Zip(zip::result::ZipError),
}

/// Exported entry of a tenant.
#[derive(Debug, Serialize)]
struct Tenant<'a> {
    floor: flat::Floor,
    flat: &'a flat::Number,
    personal_number: &'a user::PersonalNumber,
    first_name: Option<&'a user::Name>,
    last_name: Option<&'a user::Name>,
    email: &'a user::Email,
    phone_number: Option<&'a user::Phone>,
    phone_number2: Option<&'a user::Phone>,
}

/// Exports all the tenants of the provided [`FlatEntry`]s located at the
/// provided [`Address`] as a zip archive named after that [`Address`].
///
/// # Errors
///
/// If failed to serialize the tenants or to write the archive.
pub fn users(
    address: &Address,
    flats: &[FlatEntry],
) -> Result<Export, Error> {
    let tenants = flats
        .iter()
        .flat_map(|entry| {
            entry.tenants.iter().map(|t| Tenant {
                floor: entry.flat.floor,
                flat: &entry.flat.number,
                personal_number: &t.user.personal_number,
                first_name: t.user.first_name.as_ref(),
                last_name: t.user.last_name.as_ref(),
                email: &t.user.email,
                phone_number: t.user.phone_number.as_ref(),
                phone_number2: t.user.phone_number2.as_ref(),
            })
        })
        .collect::<Vec<_>>();
    let json = serde_json::to_vec_pretty(&tenants)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(
        USERS_FILE,
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated),
    )?;
    zip.write_all(&json)?;
    let bytes = zip.finish()?.into_inner();

    Ok(Export {
        file_name: format!("{} {}.zip", address.street, address.number),
        bytes,
    })
}

#[cfg(test)]
mod spec {
    use std::io::{Cursor, Read as _};

    use zip::ZipArchive;

    use crate::{
        domain::Parameter,
        read::{
            address::FlatEntry,
            parameter::Tenant,
            test::{address, flat, user},
        },
    };

    use super::{users, USERS_FILE};

    #[test]
    fn names_archive_after_address() {
        let export = users(&address(1), &[]).unwrap();

        assert_eq!(export.file_name, "Gata 1 1.zip");
    }

    #[test]
    fn archives_every_tenant() {
        let flat = flat(1, 1, 2);
        let tenant = user("Berg");
        let entry = FlatEntry {
            tenants: vec![Tenant {
                parameter: Parameter {
                    user_id: tenant.id,
                    flat_id: flat.id,
                    is_email_visible: false,
                    is_phone_number_visible: false,
                    can_be_contacted: false,
                },
                user: tenant,
            }],
            flat,
        };

        let export = users(&address(1), &[entry]).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(export.bytes)).unwrap();
        let mut json = String::new();
        _ = archive
            .by_name(USERS_FILE)
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        let tenants: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(tenants.as_array().map(Vec::len), Some(1));
        assert_eq!(tenants[0]["last_name"], "Berg");
        assert_eq!(tenants[0]["floor"], 2);
    }
}
