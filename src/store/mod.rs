//! Persistence for accounts, the pass catalog, issued passes, payments and
//! the gate entry log.
//!
//! Handlers and services only see the [`PassStore`] trait. Production runs
//! on [`PgPassStore`]; [`InMemoryPassStore`] keeps the same rules in process
//! memory for tests.

use std::future::Future;

use uuid::Uuid;

use crate::models::{
    ActivePass, EntryEvent, NewPass, NewPayment, NewUser, Pass, PassType, Payment, PoolEntryView,
    User, UserPassView,
};
use crate::utils::error::Result;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryPassStore;
pub use postgres::PgPassStore;

pub trait PassStore: Clone + Send + Sync + 'static {
    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// `AppError::Conflict` if the email or username is taken.
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User>> + Send;

    fn find_user_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    fn user_exists(
        &self,
        email: &str,
        username: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Catalog ordered by duration, shortest first.
    fn list_pass_types(&self) -> impl Future<Output = Result<Vec<PassType>>> + Send;

    fn find_pass_type(&self, id: Uuid) -> impl Future<Output = Result<Option<PassType>>> + Send;

    /// Writes the payment and the pass it funds as one unit: either both
    /// rows are stored or neither is.
    fn issue_pass(
        &self,
        payment: NewPayment,
        pass: NewPass,
    ) -> impl Future<Output = Result<(Payment, Pass)>> + Send;

    /// A holder's passes, newest first.
    fn list_user_passes(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<UserPassView>>> + Send;

    /// The active pass whose stored payload equals `payload` exactly.
    fn find_active_pass(
        &self,
        payload: &str,
    ) -> impl Future<Output = Result<Option<ActivePass>>> + Send;

    /// Moves an active pass to expired. Returns `false` if the pass was no
    /// longer active.
    fn expire_pass(&self, pass_id: Uuid) -> impl Future<Output = Result<bool>> + Send;

    /// Appends an entry for a pass that is still active. Returns `None` when
    /// the pass stopped being active since it was looked up.
    fn record_entry(
        &self,
        pass_id: Uuid,
        user_id: Uuid,
        staff_id: &str,
    ) -> impl Future<Output = Result<Option<EntryEvent>>> + Send;

    /// Most recent entries first.
    fn recent_entries(&self, limit: i64)
        -> impl Future<Output = Result<Vec<PoolEntryView>>> + Send;
}
