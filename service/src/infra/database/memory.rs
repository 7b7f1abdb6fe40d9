//! In-memory [`Database`] implementation.
//!
//! Transactions share the state with their origin and are never rolled back,
//! so this implementation suits tests only.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{
        address, error_report,
        error_report::{comment, Comment},
        flat,
        user::{self, Role},
        Address, AddressHost, ErrorReport, Flat, Parameter, User,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`].
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<State>>);

/// Stored entities of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Last assigned serial ID.
    serial: i32,

    /// Stored [`Address`]es.
    addresses: BTreeMap<address::Id, Address>,

    /// Stored [`Flat`]s.
    flats: BTreeMap<flat::Id, Flat>,

    /// Stored [`User`]s in their creation order.
    users: Vec<User>,

    /// Stored [`Parameter`]s in their creation order.
    parameters: Vec<Parameter>,

    /// Stored [`AddressHost`]s in their creation order.
    address_hosts: Vec<AddressHost>,

    /// Stored [`ErrorReport`]s.
    error_reports: BTreeMap<error_report::Id, ErrorReport>,

    /// Stored [`Comment`]s in their creation order.
    comments: Vec<Comment>,
}

impl State {
    /// Assigns a new serial ID.
    fn next_serial(&mut self) -> i32 {
        self.serial += 1;
        self.serial
    }

    /// Returns the [`User`] with the provided ID, if any.
    fn user(&self, id: user::Id) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Indicates whether the [`Flat`] with the provided ID is located at the
    /// [`Address`] with the provided ID.
    fn is_flat_at(&self, flat: flat::Id, address: address::Id) -> bool {
        self.flats.get(&flat).is_some_and(|f| f.address_id == address)
    }

    /// Removes the [`ErrorReport`]s matching the `predicate` along with their
    /// [`Comment`]s.
    fn remove_reports(&mut self, predicate: impl Fn(&ErrorReport) -> bool) {
        let removed = self
            .error_reports
            .values()
            .filter(|r| predicate(r))
            .map(|r| r.id)
            .collect::<HashSet<_>>();
        self.error_reports.retain(|id, _| !removed.contains(id));
        self.comments.retain(|c| !removed.contains(&c.report_id));
    }

    /// Removes the [`Flat`]s matching the `predicate` along with everything
    /// referencing them.
    fn remove_flats(&mut self, predicate: impl Fn(&Flat) -> bool) -> u64 {
        let removed = self
            .flats
            .values()
            .filter(|f| predicate(f))
            .map(|f| f.id)
            .collect::<HashSet<_>>();
        self.flats.retain(|id, _| !removed.contains(id));
        self.parameters.retain(|p| !removed.contains(&p.flat_id));
        self.remove_reports(|r| removed.contains(&r.flat_id));
        removed.len() as u64
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Address>, address::Id>>> for Memory {
    type Ok = Option<Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Address>, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.addresses.get(by.as_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Address>, ()>>> for Memory {
    type Ok = Vec<Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Address>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.addresses.values().cloned().collect())
    }
}

impl Database<Select<By<Vec<Address>, user::Id>>> for Memory {
    type Ok = Vec<Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Address>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let host = by.into_inner();
        let state = self.0.read().await;
        Ok(state
            .addresses
            .values()
            .filter(|a| {
                state
                    .address_hosts
                    .iter()
                    .any(|h| h.address_id == a.id && h.user_id == host)
            })
            .cloned()
            .collect())
    }
}

impl Database<Select<By<HashMap<address::Id, Address>, Vec<address::Id>>>>
    for Memory
{
    type Ok = HashMap<address::Id, Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<address::Id, Address>, Vec<address::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.0.read().await;
        Ok(by
            .into_inner()
            .into_iter()
            .filter_map(|id| Some((id, state.addresses.get(&id)?.clone())))
            .collect())
    }
}

impl Database<Select<By<read::address::AvailableFlats, address::Id>>>
    for Memory
{
    type Ok = read::address::AvailableFlats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::address::AvailableFlats, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let address = by.into_inner();
        let state = self.0.read().await;
        let count = state
            .flats
            .values()
            .filter(|f| f.address_id == address)
            .filter(|f| !state.parameters.iter().any(|p| p.flat_id == f.id))
            .count();
        Ok(read::address::AvailableFlats(
            i64::try_from(count).unwrap_or(i64::MAX),
        ))
    }
}

impl Database<Insert<address::Draft>> for Memory {
    type Ok = Address;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<address::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        let address =
            Address::from_draft(address::Id::from(state.next_serial()), draft);
        drop(state.addresses.insert(address.id, address.clone()));
        Ok(address)
    }
}

impl Database<Update<Address>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(address): Update<Address>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if let Some(stored) = state.addresses.get_mut(&address.id) {
            *stored = address;
        }
        Ok(())
    }
}

impl Database<Delete<By<Address, address::Id>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Address, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.0.write().await;
        if state.addresses.remove(&id).is_none() {
            return Ok(0);
        }
        _ = state.remove_flats(|f| f.address_id == id);
        state.address_hosts.retain(|h| h.address_id != id);
        Ok(1)
    }
}

impl Database<Lock<By<Address, address::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Address, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Flat>, flat::Id>>> for Memory {
    type Ok = Option<Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Flat>, flat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.flats.get(by.as_inner()).cloned())
    }
}

impl Database<Select<By<Option<Flat>, flat::Position>>> for Memory {
    type Ok = Option<Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Flat>, flat::Position>>,
    ) -> Result<Self::Ok, Self::Err> {
        let position = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .flats
            .values()
            .find(|f| f.position() == position)
            .cloned())
    }
}

impl Database<Select<By<Vec<Flat>, address::Id>>> for Memory {
    type Ok = Vec<Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Flat>, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let address = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .flats
            .values()
            .filter(|f| f.address_id == address)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<HashMap<flat::Id, Flat>, Vec<flat::Id>>>> for Memory {
    type Ok = HashMap<flat::Id, Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<flat::Id, Flat>, Vec<flat::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.0.read().await;
        Ok(by
            .into_inner()
            .into_iter()
            .filter_map(|id| Some((id, state.flats.get(&id)?.clone())))
            .collect())
    }
}

impl Database<Insert<flat::Draft>> for Memory {
    type Ok = Flat;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<flat::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        let flat = Flat::from_draft(flat::Id::from(state.next_serial()), draft);
        drop(state.flats.insert(flat.id, flat.clone()));
        Ok(flat)
    }
}

impl Database<Update<Flat>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(flat): Update<Flat>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if let Some(stored) = state.flats.get_mut(&flat.id) {
            *stored = flat;
        }
        Ok(())
    }
}

impl Database<Delete<By<Flat, flat::Id>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Flat, flat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.write().await.remove_flats(|f| f.id == id))
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.user(by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<User>, (user::PersonalNumber, Role)>>>
    for Memory
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, (user::PersonalNumber, Role)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (personal_number, role) = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .users
            .iter()
            .find(|u| u.personal_number == personal_number && u.role == role)
            .cloned())
    }
}

impl Database<Select<By<Option<User>, user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let normalized = by.into_inner().normalized();
        Ok(self
            .0
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email.normalized() == normalized)
            .cloned())
    }
}

impl Database<Select<By<Vec<User>, ()>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.users.clone())
    }
}

impl Database<Select<By<Vec<User>, Role>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, Role>>,
    ) -> Result<Self::Ok, Self::Err> {
        let role = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<User>, read::user::HostsOf>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, read::user::HostsOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::HostsOf(address) = by.into_inner();
        let state = self.0.read().await;
        Ok(state
            .address_hosts
            .iter()
            .filter(|h| h.address_id == address)
            .filter_map(|h| state.user(h.user_id).cloned())
            .collect())
    }
}

impl Database<Select<By<Vec<User>, read::user::TenantsOf>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, read::user::TenantsOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::TenantsOf(address) = by.into_inner();
        let state = self.0.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| {
                state.parameters.iter().any(|p| {
                    p.user_id == u.id && state.is_flat_at(p.flat_id, address)
                })
            })
            .cloned()
            .collect())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.write().await.users.push(user);
        Ok(())
    }
}

impl Database<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if let Some(stored) = state.users.iter_mut().find(|u| u.id == user.id)
        {
            *stored = user;
        }
        Ok(())
    }
}

impl Database<Delete<By<User, user::Id>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.0.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Ok(0);
        }
        state.parameters.retain(|p| p.user_id != id);
        state.address_hosts.retain(|h| h.user_id != id);
        state.remove_reports(|r| r.user_id == id);
        state.comments.retain(|c| c.user_id != id);
        Ok(1)
    }
}

impl Database<Lock<By<User, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Vec<read::parameter::Tenant>, flat::Id>>> for Memory {
    type Ok = Vec<read::parameter::Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::parameter::Tenant>, flat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let flat = by.into_inner();
        let state = self.0.read().await;
        Ok(state
            .parameters
            .iter()
            .filter(|p| p.flat_id == flat)
            .filter_map(|p| {
                Some(read::parameter::Tenant {
                    parameter: *p,
                    user: state.user(p.user_id)?.clone(),
                })
            })
            .collect())
    }
}

impl Database<Select<By<Vec<read::parameter::Residence>, user::Id>>>
    for Memory
{
    type Ok = Vec<read::parameter::Residence>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::parameter::Residence>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user = by.into_inner();
        let state = self.0.read().await;
        Ok(state
            .parameters
            .iter()
            .filter(|p| p.user_id == user)
            .filter_map(|p| {
                let flat = state.flats.get(&p.flat_id)?;
                Some(read::parameter::Residence {
                    parameter: *p,
                    flat: flat.clone(),
                    address: state.addresses.get(&flat.address_id)?.clone(),
                })
            })
            .collect())
    }
}

impl Database<Select<By<Option<Parameter>, (user::Id, flat::Id)>>> for Memory {
    type Ok = Option<Parameter>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parameter>, (user::Id, flat::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .parameters
            .iter()
            .find(|p| p.key() == key)
            .copied())
    }
}

impl Database<Insert<Parameter>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(parameter): Insert<Parameter>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if !state.parameters.iter().any(|p| p.key() == parameter.key()) {
            state.parameters.push(parameter);
        }
        Ok(())
    }
}

impl Database<Update<Parameter>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(parameter): Update<Parameter>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if let Some(stored) =
            state.parameters.iter_mut().find(|p| p.key() == parameter.key())
        {
            *stored = parameter;
        }
        Ok(())
    }
}

impl Database<Delete<By<Parameter, (user::Id, flat::Id)>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Parameter, (user::Id, flat::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        let mut state = self.0.write().await;
        let before = state.parameters.len();
        state.parameters.retain(|p| p.key() != key);
        Ok((before - state.parameters.len()) as u64)
    }
}

impl Database<Select<By<Option<AddressHost>, (address::Id, user::Id)>>>
    for Memory
{
    type Ok = Option<AddressHost>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<AddressHost>, (address::Id, user::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (address_id, user_id) = by.into_inner();
        let link = AddressHost {
            address_id,
            user_id,
        };
        Ok(self
            .0
            .read()
            .await
            .address_hosts
            .contains(&link)
            .then_some(link))
    }
}

impl Database<Insert<AddressHost>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(link): Insert<AddressHost>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if !state.address_hosts.contains(&link) {
            state.address_hosts.push(link);
        }
        Ok(())
    }
}

impl Database<Delete<By<AddressHost, (address::Id, user::Id)>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<AddressHost, (address::Id, user::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (address_id, user_id) = by.into_inner();
        let mut state = self.0.write().await;
        let before = state.address_hosts.len();
        state
            .address_hosts
            .retain(|h| !(h.address_id == address_id && h.user_id == user_id));
        Ok((before - state.address_hosts.len()) as u64)
    }
}

impl Database<Select<By<Option<ErrorReport>, error_report::Id>>> for Memory {
    type Ok = Option<ErrorReport>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ErrorReport>, error_report::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.error_reports.get(by.as_inner()).cloned())
    }
}

impl Database<Select<By<Vec<ErrorReport>, read::error_report::Filter>>>
    for Memory
{
    type Ok = Vec<ErrorReport>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<ErrorReport>, read::error_report::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        use read::error_report::Filter;

        let filter = by.into_inner();
        let state = self.0.read().await;
        Ok(state
            .error_reports
            .values()
            .rev()
            .filter(|r| match filter {
                Filter::All => true,
                Filter::SubmittedBy(user) => r.user_id == user,
                Filter::HostedBy(host) => {
                    state.address_hosts.iter().any(|h| {
                        h.user_id == host
                            && state.is_flat_at(r.flat_id, h.address_id)
                    })
                }
            })
            .cloned()
            .collect())
    }
}

impl Database<Insert<error_report::Draft>> for Memory {
    type Ok = ErrorReport;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<error_report::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        let report = ErrorReport::from_draft(
            error_report::Id::from(state.next_serial()),
            draft,
        );
        drop(state.error_reports.insert(report.id, report.clone()));
        Ok(report)
    }
}

impl Database<Update<ErrorReport>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(report): Update<ErrorReport>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if let Some(stored) = state.error_reports.get_mut(&report.id) {
            *stored = report;
        }
        Ok(())
    }
}

impl Database<Delete<By<ErrorReport, error_report::Id>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<ErrorReport, error_report::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.0.write().await;
        let existed = state.error_reports.contains_key(&id);
        state.remove_reports(|r| r.id == id);
        Ok(u64::from(existed))
    }
}

impl Database<Select<By<Vec<Comment>, error_report::Id>>> for Memory {
    type Ok = Vec<Comment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Comment>, error_report::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let report = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.report_id == report)
            .cloned()
            .collect())
    }
}

impl Database<Insert<comment::Draft>> for Memory {
    type Ok = Comment;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<comment::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        let comment =
            Comment::from_draft(comment::Id::from(state.next_serial()), draft);
        state.comments.push(comment.clone());
        Ok(comment)
    }
}
