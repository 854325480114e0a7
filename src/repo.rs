use std::marker::PhantomData;

use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// A value bound into a generated statement. Column names always come from
/// entity descriptors in this crate, never from request input.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Null,
}

/// Descriptor for a table the generic repository can operate on.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Column holding the owning user id, for ownership-scoped tables.
    const OWNER_COLUMN: Option<&'static str>;
}

/// Drops values that are absent, empty, or whitespace-only. Update payloads
/// are pruned with this before any statement is built.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Generic data-access layer over one entity kind. Each method issues a
/// single statement, so every call is atomic on its own.
pub struct Repo<E> {
    pool: PgPool,
    _entity: PhantomData<E>,
}

impl<E> Clone for Repo<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repo<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch rows matching every filter pair (AND semantics), ordered by
    /// primary key. Negative paging inputs are treated as zero.
    pub async fn find(
        &self,
        filter: &[(&'static str, SqlValue)],
        skip: i64,
        limit: i64,
    ) -> AppResult<Vec<E>> {
        debug!(table = E::TABLE, skip, limit, "find records");
        let mut qb = Self::select_builder(filter, skip.max(0), limit.max(0));
        let rows = qb.build_query_as::<E>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Fetch the single row matching the filter, or `None`. Callers use this
    /// with unique-key filters; more than one match fails loudly instead of
    /// silently picking a row.
    pub async fn find_one(&self, filter: &[(&'static str, SqlValue)]) -> AppResult<Option<E>> {
        let mut rows = self.find(filter, 0, 2).await?;
        if rows.len() > 1 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "unique filter on {} matched more than one row",
                E::TABLE
            )));
        }
        Ok(rows.pop())
    }

    /// Insert one row and return it. Unique-constraint violations surface
    /// as `Conflict`.
    pub async fn create(&self, fields: &[(&'static str, SqlValue)]) -> AppResult<E> {
        debug!(table = E::TABLE, "create record");
        let mut qb = Self::insert_builder(fields);
        let row = qb
            .build_query_as::<E>()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from_sqlx)?;
        Ok(row)
    }

    /// Update the row matching the primary key and, if given, the owner
    /// filter, in one statement. `None` means no row matched; not-found and
    /// not-owned are deliberately indistinguishable.
    pub async fn update(
        &self,
        id: i64,
        fields: &[(&'static str, SqlValue)],
        owner: Option<i64>,
    ) -> AppResult<Option<E>> {
        debug!(table = E::TABLE, id, "update record");
        let mut qb = Self::update_builder(id, fields, owner)?;
        let row = qb
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from_sqlx)?;
        Ok(row)
    }

    /// Delete with the same ownership-scoped matching as `update`; returns
    /// the deleted id, or `None` if no row matched.
    pub async fn delete(&self, id: i64, owner: Option<i64>) -> AppResult<Option<i64>> {
        debug!(table = E::TABLE, id, "delete record");
        let mut qb = Self::delete_builder(id, owner)?;
        let deleted = qb
            .build_query_scalar::<i64>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted)
    }

    fn column_list() -> String {
        E::COLUMNS.join(", ")
    }

    fn owner_column() -> AppResult<&'static str> {
        E::OWNER_COLUMN.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("{} is not ownership-scoped", E::TABLE))
        })
    }

    fn select_builder(
        filter: &[(&'static str, SqlValue)],
        skip: i64,
        limit: i64,
    ) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            Self::column_list(),
            E::TABLE
        ));
        if !filter.is_empty() {
            qb.push(" WHERE ");
            for (i, (column, value)) in filter.iter().enumerate() {
                if i > 0 {
                    qb.push(" AND ");
                }
                qb.push(*column).push(" = ");
                push_bind_value(&mut qb, value);
            }
        }
        qb.push(" ORDER BY id OFFSET ");
        qb.push_bind(skip);
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb
    }

    fn insert_builder(fields: &[(&'static str, SqlValue)]) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", E::TABLE));
        for (i, (column, _)) in fields.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column);
        }
        qb.push(") VALUES (");
        for (i, (_, value)) in fields.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_bind_value(&mut qb, value);
        }
        qb.push(") RETURNING ");
        qb.push(Self::column_list());
        qb
    }

    pub(crate) fn update_builder(
        id: i64,
        fields: &[(&'static str, SqlValue)],
        owner: Option<i64>,
    ) -> AppResult<QueryBuilder<'static, Postgres>> {
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
        for (i, (column, value)) in fields.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column).push(" = ");
            push_bind_value(&mut qb, value);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        if let Some(owner_id) = owner {
            qb.push(format!(" AND {} = ", Self::owner_column()?));
            qb.push_bind(owner_id);
        }
        qb.push(" RETURNING ");
        qb.push(Self::column_list());
        Ok(qb)
    }

    fn delete_builder(
        id: i64,
        owner: Option<i64>,
    ) -> AppResult<QueryBuilder<'static, Postgres>> {
        let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", E::TABLE));
        qb.push_bind(id);
        if let Some(owner_id) = owner {
            qb.push(format!(" AND {} = ", Self::owner_column()?));
            qb.push_bind(owner_id);
        }
        qb.push(" RETURNING id");
        Ok(qb)
    }
}

fn push_bind_value(qb: &mut QueryBuilder<'static, Postgres>, value: &SqlValue) {
    match value {
        SqlValue::Int(v) => {
            qb.push_bind(*v);
        }
        SqlValue::Text(v) => {
            qb.push_bind(v.clone());
        }
        SqlValue::Null => {
            qb.push_bind(Option::<String>::None);
        }
    }
}
