//! Accounts and user profiles.

use crate::{PostgresStore, corrupt, db_err, unique_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storefront_core::domain::account::{Account, User, UserPatch, UserView};
use storefront_core::stores::{AccountStore, StoreResult};
use storefront_core::{AccountId, Role, UserId};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = storefront_core::error::StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(|e| corrupt("account role", e))?,
            user_id: UserId::from_uuid(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    account_id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            account_id: AccountId::from_uuid(row.account_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserViewRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
}

impl TryFrom<UserViewRow> for UserView {
    type Error = storefront_core::error::StoreError;

    fn try_from(row: UserViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            user_type: row.role.parse::<Role>().map_err(|e| corrupt("account role", e))?,
        })
    }
}

const ACCOUNT_COLUMNS: &str =
    "SELECT id, email, password_hash, role, user_id, created_at, updated_at FROM accounts";
const USER_COLUMNS: &str =
    "SELECT id, account_id, name, email, phone, created_at, updated_at FROM users";
const USER_VIEW_COLUMNS: &str = "SELECT u.id, u.name, u.email, u.phone, a.role
     FROM users u JOIN accounts a ON a.id = u.account_id";

#[async_trait]
impl AccountStore for PostgresStore {
    async fn create_account(&self, account: Account, user: User) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;

        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, role, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.user_id.as_uuid())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(unique_err("insert account", "Email already registered".to_string()))?;

        sqlx::query(
            "INSERT INTO users (id, account_id, name, email, phone, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id.as_uuid())
        .bind(user.account_id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("insert user"))?;

        tx.commit().await.map_err(db_err("commit account"))?;
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!("{ACCOUNT_COLUMNS} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("load account"))?
            .map(Account::try_from)
            .transpose()
    }

    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!("{ACCOUNT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("load account"))?
            .map(Account::try_from)
            .transpose()
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, UserRow>(&format!("{USER_COLUMNS} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err("load user"))?
                .map(User::from),
        )
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        Ok(
            sqlx::query_as::<_, UserRow>(&format!("{USER_COLUMNS} WHERE id = ANY($1)"))
                .bind(&ids)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err("load users"))?
                .into_iter()
                .map(User::from)
                .collect(),
        )
    }

    async fn get_user_view(&self, id: UserId) -> StoreResult<Option<UserView>> {
        sqlx::query_as::<_, UserViewRow>(&format!("{USER_VIEW_COLUMNS} WHERE u.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("load user"))?
            .map(UserView::try_from)
            .transpose()
    }

    async fn list_user_views(&self) -> StoreResult<Vec<UserView>> {
        sqlx::query_as::<_, UserViewRow>(&format!("{USER_VIEW_COLUMNS} ORDER BY u.created_at"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list users"))?
            .into_iter()
            .map(UserView::try_from)
            .collect()
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;

        let Some(row) =
            sqlx::query_as::<_, UserRow>(&format!("{USER_COLUMNS} WHERE id = $1 FOR UPDATE"))
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err("load user"))?
        else {
            return Ok(None);
        };

        let mut user = User::from(row);
        patch.apply(&mut user, now);

        sqlx::query("UPDATE users SET name = $2, email = $3, phone = $4, updated_at = $5 WHERE id = $1")
            .bind(user.id.as_uuid())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(user.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err("update user"))?;

        tx.commit().await.map_err(db_err("commit user"))?;
        Ok(Some(user))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        // The profile row cascades from its account.
        let result = sqlx::query("DELETE FROM accounts WHERE user_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete account"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn admin_user_ids(&self) -> StoreResult<Vec<UserId>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT user_id FROM accounts WHERE role = 'admin'")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list admins"))?;
        Ok(rows.into_iter().map(|(id,)| UserId::from_uuid(id)).collect())
    }
}
