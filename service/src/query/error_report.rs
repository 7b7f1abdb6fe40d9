//! [`Query`] collection related to a single [`ErrorReport`].

use common::operations::By;
use tracerr::Traced;

use crate::{
    domain::{error_report, Address, ErrorReport, Flat},
    infra::database,
    query::{address, flat},
    read, Query, Service,
};

use super::DatabaseQuery;

/// Queries an [`ErrorReport`] by its [`error_report::Id`].
pub type ById = DatabaseQuery<By<Option<ErrorReport>, error_report::Id>>;

/// Queries all the [`error_report::Comment`]s of an [`ErrorReport`] in their
/// creation order.
pub type Comments =
    DatabaseQuery<By<Vec<error_report::Comment>, error_report::Id>>;

/// [`Query`] of [`read::error_report::Details`] of an [`ErrorReport`].
#[derive(Clone, Copy, Debug)]
pub struct Details {
    /// ID of the [`ErrorReport`].
    pub id: error_report::Id,
}

impl<Db, Ml> Query<Details> for Service<Db, Ml>
where
    Self: Query<ById, Ok = Option<ErrorReport>, Err = Traced<database::Error>>
        + Query<
            Comments,
            Ok = Vec<error_report::Comment>,
            Err = Traced<database::Error>,
        > + Query<flat::ById, Ok = Option<Flat>, Err = Traced<database::Error>>
        + Query<
            address::ById,
            Ok = Option<Address>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::error_report::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Details { id }: Details,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(report) = self
            .execute(ById::by(id))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let comments = self
            .execute(Comments::by(id))
            .await
            .map_err(tracerr::wrap!())?;
        let flat = self
            .execute(flat::ById::by(report.flat_id))
            .await
            .map_err(tracerr::wrap!())?;
        let address = match &flat {
            Some(f) => self
                .execute(address::ById::by(f.address_id))
                .await
                .map_err(tracerr::wrap!())?,
            None => None,
        };

        Ok(Some(read::error_report::Details {
            entry: read::error_report::Entry { report, comments },
            flat,
            address,
        }))
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime};

    use crate::{
        domain::{
            error_report::{self, comment, Priority, Status},
            user,
        },
        infra::Database as _,
        test::{address_draft, flat_draft, service},
        Query as _,
    };

    use super::Details;

    #[tokio::test]
    async fn resolves_flat_address_and_comments() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let flat = db
            .execute(Insert(flat_draft(address.id, 1, "11")))
            .await
            .unwrap();
        let author = user::Id::new();
        let report = db
            .execute(Insert(error_report::Draft {
                flat_id: flat.id,
                user_id: author,
                subject: error_report::Subject::new("Läcka").unwrap(),
                description: error_report::Description::new("Det droppar")
                    .unwrap(),
                submitted_at: DateTime::now().coerce(),
                priority: Priority::High,
            }))
            .await
            .unwrap();
        let comment = db
            .execute(Insert(comment::Draft {
                report_id: report.id,
                user_id: author,
                text: comment::Text::new("Fortfarande trasig").unwrap(),
                created_at: DateTime::now().coerce(),
            }))
            .await
            .unwrap();

        let details =
            service.execute(Details { id: report.id }).await.unwrap().unwrap();

        assert_eq!(details.entry.report.status, Status::Registered);
        assert_eq!(details.entry.comments, [comment]);
        assert_eq!(details.flat, Some(flat));
        assert_eq!(details.address, Some(address));
    }

    #[tokio::test]
    async fn absent_report_has_no_details() {
        let service = service();

        let details = service
            .execute(Details {
                id: error_report::Id::from(3),
            })
            .await
            .unwrap();

        assert_eq!(details, None);
    }
}
