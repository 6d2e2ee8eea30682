use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    ActivePass, EntryEvent, NewPass, NewPayment, NewUser, Pass, PassStatus, PassType, Payment,
    PoolEntryView, User, UserPassView,
};
use crate::store::PassStore;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    pass_types: Vec<PassType>,
    payments: Vec<Payment>,
    passes: Vec<Pass>,
    entries: Vec<EntryEvent>,
}

/// Process-local store with the same rules as the Postgres schema. One lock
/// guards every table, so each operation is atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPassStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryPassStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the catalog the seed migration installs.
    pub fn with_default_catalog() -> Self {
        let store = Self::new();
        for (name, description, price, days) in [
            ("Daily Pass", "Access to swimming pool for one day", 500, 1),
            ("Monthly Pass", "Access to swimming pool for one month", 5000, 30),
            ("Yearly Pass", "Access to swimming pool for one year", 50000, 365),
        ] {
            store.add_pass_type(name, Some(description), Decimal::new(price, 2), days);
        }
        store
    }

    pub fn add_pass_type(
        &self,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        duration_days: i32,
    ) -> PassType {
        let pass_type = PassType {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price,
            duration_days,
        };
        if let Ok(mut tables) = self.tables.lock() {
            tables.pass_types.push(pass_type.clone());
        }
        pass_type
    }

    /// Test helper that reads a stored pass row by id.
    pub fn pass(&self, id: Uuid) -> Option<Pass> {
        self.lock()
            .ok()
            .and_then(|tables| tables.passes.iter().find(|p| p.id == id).cloned())
    }

    /// Test helper that overwrites a pass's validity window.
    pub fn set_pass_dates(&self, id: Uuid, start: chrono::NaiveDate, end: chrono::NaiveDate) {
        if let Ok(mut tables) = self.lock() {
            if let Some(pass) = tables.passes.iter_mut().find(|p| p.id == id) {
                pass.start_date = start;
                pass.end_date = end;
            }
        }
    }

    /// Test helper that snapshots the entry log in insertion order.
    pub fn entries(&self) -> Vec<EntryEvent> {
        self.lock()
            .map(|tables| tables.entries.clone())
            .unwrap_or_default()
    }

    /// Test helper that snapshots the payments table in insertion order.
    pub fn payments(&self) -> Vec<Payment> {
        self.lock()
            .map(|tables| tables.payments.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError("store lock poisoned".to_string()))
    }
}

impl PassStore for InMemoryPassStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.lock()?;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            phone: user.phone,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_exists(&self, email: &str, username: &str) -> Result<bool> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .any(|u| u.email == email || u.username == username))
    }

    async fn list_pass_types(&self) -> Result<Vec<PassType>> {
        let mut pass_types = self.lock()?.pass_types.clone();
        pass_types.sort_by_key(|pt| pt.duration_days);
        Ok(pass_types)
    }

    async fn find_pass_type(&self, id: Uuid) -> Result<Option<PassType>> {
        let tables = self.lock()?;
        Ok(tables.pass_types.iter().find(|pt| pt.id == id).cloned())
    }

    async fn issue_pass(&self, payment: NewPayment, pass: NewPass) -> Result<(Payment, Pass)> {
        let mut tables = self.lock()?;

        // Check every constraint before touching either table
        if !tables.users.iter().any(|u| u.id == payment.user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if tables.passes.iter().any(|p| p.qr_code_data == pass.qr_code_data) {
            return Err(AppError::Conflict("Pass payload already issued".to_string()));
        }

        let now = Utc::now();
        let payment = Payment {
            id: payment.id,
            user_id: payment.user_id,
            pass_type_id: payment.pass_type_id,
            amount: payment.amount,
            payment_method: payment.payment_method,
            payment_intent_id: payment.payment_intent_id,
            status: payment.status.as_str().to_string(),
            created_at: now,
        };
        let pass = Pass {
            id: pass.id,
            user_id: pass.user_id,
            pass_type_id: pass.pass_type_id,
            start_date: pass.start_date,
            end_date: pass.end_date,
            status: PassStatus::Active.as_str().to_string(),
            qr_code_data: pass.qr_code_data,
            payment_id: payment.id,
            created_at: now,
        };

        tables.payments.push(payment.clone());
        tables.passes.push(pass.clone());
        Ok((payment, pass))
    }

    async fn list_user_passes(&self, user_id: Uuid) -> Result<Vec<UserPassView>> {
        let tables = self.lock()?;
        let mut views: Vec<UserPassView> = tables
            .passes
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| {
                let pass_type = tables.pass_types.iter().find(|pt| pt.id == p.pass_type_id)?;
                Some(UserPassView {
                    id: p.id,
                    start_date: p.start_date,
                    end_date: p.end_date,
                    status: p.status.clone(),
                    qr_code_data: p.qr_code_data.clone(),
                    created_at: p.created_at,
                    pass_type_name: pass_type.name.clone(),
                    price: pass_type.price,
                    duration_days: pass_type.duration_days,
                })
            })
            .collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(views)
    }

    async fn find_active_pass(&self, payload: &str) -> Result<Option<ActivePass>> {
        let tables = self.lock()?;
        let active = PassStatus::Active.as_str();

        Ok(tables
            .passes
            .iter()
            .find(|p| p.qr_code_data == payload && p.status == active)
            .and_then(|p| {
                let pass_type = tables.pass_types.iter().find(|pt| pt.id == p.pass_type_id)?;
                let user = tables.users.iter().find(|u| u.id == p.user_id)?;
                Some(ActivePass {
                    id: p.id,
                    user_id: p.user_id,
                    start_date: p.start_date,
                    end_date: p.end_date,
                    pass_type_name: pass_type.name.clone(),
                    full_name: user.full_name.clone(),
                    email: user.email.clone(),
                })
            }))
    }

    async fn expire_pass(&self, pass_id: Uuid) -> Result<bool> {
        let mut tables = self.lock()?;
        match tables
            .passes
            .iter_mut()
            .find(|p| p.id == pass_id && p.status == PassStatus::Active.as_str())
        {
            Some(pass) => {
                pass.status = PassStatus::Expired.as_str().to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_entry(
        &self,
        pass_id: Uuid,
        user_id: Uuid,
        staff_id: &str,
    ) -> Result<Option<EntryEvent>> {
        let mut tables = self.lock()?;
        let still_active = tables
            .passes
            .iter()
            .any(|p| p.id == pass_id && p.status == PassStatus::Active.as_str());
        if !still_active {
            return Ok(None);
        }

        let entry = EntryEvent {
            id: Uuid::new_v4(),
            user_pass_id: pass_id,
            user_id,
            staff_id: staff_id.to_string(),
            entry_time: Utc::now(),
        };
        tables.entries.push(entry.clone());
        Ok(Some(entry))
    }

    async fn recent_entries(&self, limit: i64) -> Result<Vec<PoolEntryView>> {
        let tables = self.lock()?;
        let limit = usize::try_from(limit).unwrap_or(0);

        let mut views: Vec<PoolEntryView> = tables
            .entries
            .iter()
            .rev()
            .filter_map(|e| {
                let user = tables.users.iter().find(|u| u.id == e.user_id)?;
                let pass = tables.passes.iter().find(|p| p.id == e.user_pass_id)?;
                let pass_type = tables.pass_types.iter().find(|pt| pt.id == pass.pass_type_id)?;
                Some(PoolEntryView {
                    id: e.id,
                    entry_time: e.entry_time,
                    staff_id: e.staff_id.clone(),
                    full_name: user.full_name.clone(),
                    email: user.email.clone(),
                    pass_type_name: pass_type.name.clone(),
                })
            })
            .collect();
        views.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        views.truncate(limit);
        Ok(views)
    }
}
