//! [`Command`] definition.

pub mod add_address_host;
pub mod authorize_user_session;
pub mod comment_error_report;
pub mod complete_registration;
pub mod create_account;
pub mod create_address;
pub mod create_error_report;
pub mod create_flat;
pub mod create_parameter;
pub mod create_user_session;
pub mod delete_address;
pub mod delete_error_report;
pub mod delete_flat;
pub mod delete_parameter;
pub mod delete_user;
pub mod mark_error_report_seen;
pub mod remove_address_host;
pub mod update_account;
pub mod update_address;
pub mod update_error_report;
pub mod update_flat;
pub mod update_parameter;
pub mod update_user_password;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_address_host::AddAddressHost,
    authorize_user_session::AuthorizeUserSession,
    comment_error_report::CommentErrorReport,
    complete_registration::CompleteRegistration,
    create_account::CreateAccount, create_address::CreateAddress,
    create_error_report::CreateErrorReport, create_flat::CreateFlat,
    create_parameter::CreateParameter,
    create_user_session::CreateUserSession, delete_address::DeleteAddress,
    delete_error_report::DeleteErrorReport, delete_flat::DeleteFlat,
    delete_parameter::DeleteParameter, delete_user::DeleteUser,
    mark_error_report_seen::MarkErrorReportSeen,
    remove_address_host::RemoveAddressHost, update_account::UpdateAccount,
    update_address::UpdateAddress, update_error_report::UpdateErrorReport,
    update_flat::UpdateFlat, update_parameter::UpdateParameter,
    update_user_password::UpdateUserPassword,
};
