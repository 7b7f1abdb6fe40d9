//! [`Query`] collection related to multiple [`ErrorReport`]s.

use std::collections::HashMap;

use common::operations::By;
use futures::future;
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{
        address, error_report::Comment, flat, Address, ErrorReport, Flat,
    },
    infra::database,
    query::error_report,
    read::error_report::{group_by_address, AddressGroup, Entry, Filter},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries all the [`ErrorReport`]s matching a [`Filter`], newest first.
pub type ByFilter = DatabaseQuery<By<Vec<ErrorReport>, Filter>>;

/// Queries the [`Flat`]s having the provided IDs.
pub type Flats = DatabaseQuery<By<HashMap<flat::Id, Flat>, Vec<flat::Id>>>;

/// Queries the [`Address`]es having the provided IDs.
pub type Addresses =
    DatabaseQuery<By<HashMap<address::Id, Address>, Vec<address::Id>>>;

/// [`Query`] of the [`ErrorReport`]s matching a [`Filter`] grouped by the
/// [`Address`] of the reported [`Flat`].
#[derive(Clone, Copy, Debug)]
pub struct List {
    /// [`Filter`] of the [`ErrorReport`]s.
    pub filter: Filter,
}

impl<Db, Ml> Query<List> for Service<Db, Ml>
where
    Self: Query<ByFilter, Ok = Vec<ErrorReport>, Err = Traced<database::Error>>
        + Query<
            error_report::Comments,
            Ok = Vec<Comment>,
            Err = Traced<database::Error>,
        > + Query<
            Flats,
            Ok = HashMap<flat::Id, Flat>,
            Err = Traced<database::Error>,
        > + Query<
            Addresses,
            Ok = HashMap<address::Id, Address>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<AddressGroup>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List { filter }: List,
    ) -> Result<Self::Ok, Self::Err> {
        let reports = self
            .execute(ByFilter::by(filter))
            .await
            .map_err(tracerr::wrap!())?;

        let flat_ids = reports.iter().map(|r| r.flat_id).unique().collect();
        let flats = self
            .execute(Flats::by(flat_ids))
            .await
            .map_err(tracerr::wrap!())?;
        let address_ids =
            flats.values().map(|f| f.address_id).unique().collect();
        let addresses = self
            .execute(Addresses::by(address_ids))
            .await
            .map_err(tracerr::wrap!())?;

        let entries =
            future::try_join_all(reports.into_iter().map(|report| async move {
                let comments = self
                    .execute(error_report::Comments::by(report.id))
                    .await
                    .map_err(tracerr::wrap!())?;
                Ok::<_, Traced<database::Error>>(Entry { report, comments })
            }))
            .await?;

        Ok(group_by_address(entries, &flats, &addresses))
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime};

    use crate::{
        domain::{
            error_report::{self, Priority},
            flat, user,
        },
        infra::Database as _,
        read::error_report::Filter,
        test::{address_draft, flat_draft, service, TestService},
        Query as _,
    };

    use super::List;

    async fn report(
        service: &TestService,
        flat_id: flat::Id,
        user_id: user::Id,
    ) -> error_report::Id {
        service
            .database()
            .execute(Insert(error_report::Draft {
                flat_id,
                user_id,
                subject: error_report::Subject::new("Läcka").unwrap(),
                description: error_report::Description::new("Det droppar")
                    .unwrap(),
                submitted_at: DateTime::now().coerce(),
                priority: Priority::Low,
            }))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn groups_newest_first_by_address() {
        let service = service();
        let db = service.database();
        let first =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let second =
            db.execute(Insert(address_draft("Kungsgatan"))).await.unwrap();
        let here = db
            .execute(Insert(flat_draft(first.id, 1, "1")))
            .await
            .unwrap();
        let there = db
            .execute(Insert(flat_draft(second.id, 1, "1")))
            .await
            .unwrap();
        let author = user::Id::new();
        let oldest = report(&service, here.id, author).await;
        let middle = report(&service, there.id, author).await;
        let newest = report(&service, here.id, author).await;

        let groups =
            service.execute(List { filter: Filter::All }).await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].address, Some(first));
        assert_eq!(
            groups[0].reports.keys().copied().collect::<Vec<_>>(),
            [newest, oldest],
        );
        assert_eq!(groups[1].address, Some(second));
        assert_eq!(
            groups[1].reports.keys().copied().collect::<Vec<_>>(),
            [middle],
        );
    }

    #[tokio::test]
    async fn filters_by_submitter() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let flat = db
            .execute(Insert(flat_draft(address.id, 1, "1")))
            .await
            .unwrap();
        let (mine, theirs) = (user::Id::new(), user::Id::new());
        let own = report(&service, flat.id, mine).await;
        _ = report(&service, flat.id, theirs).await;

        let groups = service
            .execute(List {
                filter: Filter::SubmittedBy(mine),
            })
            .await
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].reports.keys().copied().collect::<Vec<_>>(), [
            own
        ]);
    }

    #[tokio::test]
    async fn no_reports_give_no_groups() {
        let service = service();

        let groups =
            service.execute(List { filter: Filter::All }).await.unwrap();

        assert!(groups.is_empty());
    }
}
