use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{
    ActivePass, EntryEvent, NewPass, NewPayment, NewUser, Pass, PassStatus, PassType, Payment,
    PoolEntryView, User, UserPassView,
};
use crate::store::PassStore;
use crate::utils::error::{AppError, Result};

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, phone, created_at";

#[derive(Clone)]
pub struct PgPassStore {
    pool: PgPool,
}

impl PgPassStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the pool and brings the schema up to date.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        tracing::info!("Successfully connected to database");

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Applies the bundled migrations, including the pass type seed.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalServerError(format!("migration failed: {}", e)))?;

        tracing::info!("Migrations run successfully");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}

impl PassStore for PgPassStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, full_name, phone) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(&user.phone)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("User already exists".to_string())
                } else {
                    AppError::DatabaseError(e)
                }
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_exists(&self, email: &str, username: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_pass_types(&self) -> Result<Vec<PassType>> {
        Ok(sqlx::query_as::<_, PassType>(
            "SELECT id, name, description, price, duration_days \
             FROM pass_types ORDER BY duration_days",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_pass_type(&self, id: Uuid) -> Result<Option<PassType>> {
        Ok(sqlx::query_as::<_, PassType>(
            "SELECT id, name, description, price, duration_days FROM pass_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn issue_pass(&self, payment: NewPayment, pass: NewPass) -> Result<(Payment, Pass)> {
        // Dropping the transaction without commit rolls both inserts back
        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments \
                 (id, user_id, pass_type_id, amount, payment_method, payment_intent_id, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, user_id, pass_type_id, amount, payment_method, payment_intent_id, \
                       status, created_at",
        )
        .bind(payment.id)
        .bind(payment.user_id)
        .bind(payment.pass_type_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.payment_intent_id)
        .bind(payment.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let pass = sqlx::query_as::<_, Pass>(
            "INSERT INTO user_passes \
                 (id, user_id, pass_type_id, start_date, end_date, status, qr_code_data, payment_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, user_id, pass_type_id, start_date, end_date, status, qr_code_data, \
                       payment_id, created_at",
        )
        .bind(pass.id)
        .bind(pass.user_id)
        .bind(pass.pass_type_id)
        .bind(pass.start_date)
        .bind(pass.end_date)
        .bind(PassStatus::Active.as_str())
        .bind(&pass.qr_code_data)
        .bind(payment.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Pass payload already issued".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        tx.commit().await?;

        Ok((payment, pass))
    }

    async fn list_user_passes(&self, user_id: Uuid) -> Result<Vec<UserPassView>> {
        Ok(sqlx::query_as::<_, UserPassView>(
            r#"
            SELECT
                up.id,
                up.start_date,
                up.end_date,
                up.status,
                up.qr_code_data,
                up.created_at,
                pt.name AS pass_type_name,
                pt.price,
                pt.duration_days
            FROM user_passes up
            JOIN pass_types pt ON up.pass_type_id = pt.id
            WHERE up.user_id = $1
            ORDER BY up.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_active_pass(&self, payload: &str) -> Result<Option<ActivePass>> {
        Ok(sqlx::query_as::<_, ActivePass>(
            r#"
            SELECT
                up.id,
                up.user_id,
                up.start_date,
                up.end_date,
                pt.name AS pass_type_name,
                u.full_name,
                u.email
            FROM user_passes up
            JOIN pass_types pt ON up.pass_type_id = pt.id
            JOIN users u ON up.user_id = u.id
            WHERE up.qr_code_data = $1 AND up.status = $2
            "#,
        )
        .bind(payload)
        .bind(PassStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn expire_pass(&self, pass_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE user_passes SET status = $1 WHERE id = $2 AND status = $3")
            .bind(PassStatus::Expired.as_str())
            .bind(pass_id)
            .bind(PassStatus::Active.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_entry(
        &self,
        pass_id: Uuid,
        user_id: Uuid,
        staff_id: &str,
    ) -> Result<Option<EntryEvent>> {
        Ok(sqlx::query_as::<_, EntryEvent>(
            r#"
            INSERT INTO pool_entries (id, user_pass_id, user_id, staff_id)
            SELECT $1, up.id, $3, $4
            FROM user_passes up
            WHERE up.id = $2 AND up.status = $5
            RETURNING id, user_pass_id, user_id, staff_id, entry_time
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(pass_id)
        .bind(user_id)
        .bind(staff_id)
        .bind(PassStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn recent_entries(&self, limit: i64) -> Result<Vec<PoolEntryView>> {
        Ok(sqlx::query_as::<_, PoolEntryView>(
            r#"
            SELECT
                pe.id,
                pe.entry_time,
                pe.staff_id,
                u.full_name,
                u.email,
                pt.name AS pass_type_name
            FROM pool_entries pe
            JOIN users u ON pe.user_id = u.id
            JOIN user_passes up ON pe.user_pass_id = up.id
            JOIN pass_types pt ON up.pass_type_id = pt.id
            ORDER BY pe.entry_time DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}
