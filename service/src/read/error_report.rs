//! [`ErrorReport`]-related read definitions.

use std::collections::HashMap;

use common::Groups;
use serde::Serialize;

use crate::domain::{
    address, error_report, flat,
    user::{self, Role},
    Address, ErrorReport, Flat,
};

/// Selector of the [`ErrorReport`]s visible to a viewer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Filter {
    /// Every [`ErrorReport`].
    All,

    /// [`ErrorReport`]s submitted by the [`user::User`].
    SubmittedBy(user::Id),

    /// [`ErrorReport`]s about [`Flat`]s at [`Address`]es hosted by the
    /// [`user::User`].
    HostedBy(user::Id),
}

impl Filter {
    /// Returns the [`Filter`] of the [`ErrorReport`]s visible to the provided
    /// viewer.
    #[must_use]
    pub fn visible_to(viewer: user::Id, role: Role) -> Self {
        match role {
            Role::Admin => Self::All,
            Role::Host => Self::HostedBy(viewer),
            Role::User => Self::SubmittedBy(viewer),
        }
    }
}

/// [`ErrorReport`] along with its [`error_report::Comment`]s.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Entry {
    /// [`ErrorReport`] itself.
    pub report: ErrorReport,

    /// [`error_report::Comment`]s in their creation order.
    pub comments: Vec<error_report::Comment>,
}

/// Detailed view of an [`ErrorReport`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Details {
    /// [`ErrorReport`] with its comments.
    #[serde(flatten)]
    pub entry: Entry,

    /// Reported [`Flat`], if it still exists.
    pub flat: Option<Flat>,

    /// [`Address`] of the reported [`Flat`], if it still exists.
    pub address: Option<Address>,
}

/// [`Entry`]s located at the same [`Address`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AddressGroup {
    /// [`Address`] the [`Entry`]s are located at, or [`None`] for the ones
    /// whose [`Address`] cannot be resolved.
    pub address: Option<Address>,

    /// [`Entry`]s grouped by their [`error_report::Id`].
    pub reports: Groups<error_report::Id, Entry>,
}

/// Groups the provided [`Entry`]s by the [`Address`] of the reported [`Flat`],
/// and then by the report ID inside every [`AddressGroup`].
///
/// Groups follow the first-seen order. Entries whose [`Flat`] or [`Address`]
/// cannot be resolved from the provided lookups share a single
/// [`AddressGroup`] without an [`Address`].
#[must_use]
pub fn group_by_address(
    entries: Vec<Entry>,
    flats: &HashMap<flat::Id, Flat>,
    addresses: &HashMap<address::Id, Address>,
) -> Vec<AddressGroup> {
    let resolve = |e: &Entry| -> Option<address::Id> {
        let flat = flats.get(&e.report.flat_id)?;
        addresses.contains_key(&flat.address_id).then_some(flat.address_id)
    };

    Groups::by(entries, resolve)
        .into_iter()
        .map(|group| AddressGroup {
            address: group.key.and_then(|id| addresses.get(&id).cloned()),
            reports: Groups::by(group.values, |e| e.report.id),
        })
        .collect()
}
