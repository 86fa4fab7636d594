//! In-memory entity collections mirrored to the backend.
//!
//! A [`Repository`] holds every row of one entity kind. Reads and writes go
//! to memory first; the backend is touched only by the `async` methods, and
//! failures there are logged rather than surfaced to program logic.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::{debug, error, warn};
use sea_orm::sea_query::{
    Cond, Expr, MysqlQueryBuilder, PostgresQueryBuilder, Query, QueryStatementWriter,
    SqliteQueryBuilder, Values,
};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, QueryResult, Statement,
    TransactionTrait,
};
use skyisle_core::{Island, IslandId, IsleError, IsleResult};

use crate::db::SkyisleIslands;
use crate::record::Record;

/// Keys per `DELETE` statement; keeps bound-parameter counts well under the
/// SQLite limit.
const DELETE_CHUNK: usize = 200;

pub(crate) fn build_stmt<S: QueryStatementWriter>(
    backend: DatabaseBackend,
    stmt: &S,
) -> (String, Values) {
    match backend {
        DatabaseBackend::Sqlite => stmt.build(SqliteQueryBuilder),
        DatabaseBackend::Postgres => stmt.build(PostgresQueryBuilder),
        DatabaseBackend::MySql => stmt.build(MysqlQueryBuilder),
    }
}

pub(crate) async fn exec<C, S>(conn: &C, stmt: &S) -> IsleResult<()>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    conn.execute(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(())
}

pub(crate) async fn query_all<C, S>(conn: &C, stmt: &S) -> IsleResult<Vec<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    let rows = conn
        .query_all(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(rows)
}

pub(crate) async fn query_one<C, S>(conn: &C, stmt: &S) -> IsleResult<Option<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    let row = conn
        .query_one(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(row)
}

/// Outcome of flushing one repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlushReport {
    pub kind: &'static str,
    pub rows: usize,
    pub ok: bool,
}

pub struct Repository<R: Record> {
    rows: Mutex<Vec<R>>,
}

impl<R: Record> Default for Repository<R> {
    fn default() -> Self {
        Self::from_rows(Vec::new())
    }
}

impl<R: Record> Repository<R> {
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Startup load. A backend failure yields an empty collection so the
    /// process can still start.
    pub async fn load(conn: &DatabaseConnection) -> Self {
        match Self::fetch_all(conn).await {
            Ok(rows) => {
                debug!("repo: loaded {} {} rows", rows.len(), R::KIND);
                Self::from_rows(rows)
            }
            Err(err) => {
                error!("repo: load {} failed, starting empty: {err}", R::KIND);
                Self::default()
            }
        }
    }

    pub async fn fetch_all<C: ConnectionTrait>(conn: &C) -> IsleResult<Vec<R>> {
        query_all(conn, &R::select())
            .await?
            .iter()
            .map(R::decode)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<R>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn all(&self) -> Vec<R> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, key: &R::Key) -> Option<R> {
        self.lock().iter().find(|row| &row.key() == key).cloned()
    }

    pub fn find(&self, predicate: impl Fn(&R) -> bool) -> Option<R> {
        self.lock().iter().find(|row| predicate(row)).cloned()
    }

    pub fn filter(&self, predicate: impl Fn(&R) -> bool) -> Vec<R> {
        self.lock()
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// Inserts or replaces by key; new rows keep insertion order.
    pub fn put(&self, row: R) {
        let mut rows = self.lock();
        let key = row.key();
        match rows.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
    }

    /// Applies `change` to the row under `key` and returns the new value.
    pub fn update(&self, key: &R::Key, change: impl FnOnce(&mut R)) -> Option<R> {
        let mut rows = self.lock();
        let row = rows.iter_mut().find(|row| &row.key() == key)?;
        change(row);
        Some(row.clone())
    }

    /// Find-or-create under one lock acquisition.
    pub fn update_or_insert(
        &self,
        key: &R::Key,
        create: impl FnOnce() -> R,
        change: impl FnOnce(&mut R),
    ) -> R {
        let mut rows = self.lock();
        let index = match rows.iter().position(|row| &row.key() == key) {
            Some(index) => index,
            None => {
                rows.push(create());
                rows.len() - 1
            }
        };
        let row = &mut rows[index];
        change(row);
        row.clone()
    }

    /// Applies `change` to every matching row; returns the changed rows.
    pub fn update_where(&self, predicate: impl Fn(&R) -> bool, change: impl Fn(&mut R)) -> Vec<R> {
        let mut rows = self.lock();
        let mut changed = Vec::new();
        for row in rows.iter_mut().filter(|row| predicate(row)) {
            change(row);
            changed.push(row.clone());
        }
        changed
    }

    pub fn remove(&self, key: &R::Key) -> Option<R> {
        let mut rows = self.lock();
        let index = rows.iter().position(|row| &row.key() == key)?;
        Some(rows.remove(index))
    }

    pub fn remove_where(&self, predicate: impl Fn(&R) -> bool) -> Vec<R> {
        let mut rows = self.lock();
        let (removed, kept): (Vec<R>, Vec<R>) = rows.drain(..).partition(|row| predicate(row));
        *rows = kept;
        removed
    }

    /// Upserts the persistable part of `rows` in one transaction.
    pub async fn write(conn: &DatabaseConnection, rows: &[R]) -> IsleResult<()> {
        let rows: Vec<&R> = rows.iter().filter(|row| row.persistable()).collect();
        if rows.is_empty() {
            return Ok(());
        }
        let tx = conn.begin().await?;
        for row in rows {
            exec(&tx, &row.upsert()).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Deletes `keys` in one transaction, chunked.
    pub async fn erase(conn: &DatabaseConnection, keys: &[R::Key]) -> IsleResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let tx = conn.begin().await?;
        for chunk in keys.chunks(DELETE_CHUNK) {
            let mut cond = Cond::any();
            for key in chunk {
                cond = cond.add(R::key_condition(key));
            }
            let delete = Query::delete()
                .from_table(R::TABLE)
                .cond_where(cond)
                .to_owned();
            exec(&tx, &delete).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Memory first, then a logged best-effort backend write.
    pub async fn upsert(&self, conn: &DatabaseConnection, row: R) {
        self.put(row.clone());
        self.persist(conn, &[row]).await;
    }

    /// Best-effort backend write of rows already held in memory.
    pub async fn persist(&self, conn: &DatabaseConnection, rows: &[R]) {
        if let Err(err) = Self::write(conn, rows).await {
            error!("repo: upsert {} x{} failed: {err}", R::KIND, rows.len());
        }
    }

    /// Best-effort backend delete; memory is not touched.
    pub async fn discard(&self, conn: &DatabaseConnection, keys: &[R::Key]) {
        if let Err(err) = Self::erase(conn, keys).await {
            error!("repo: delete {} x{} failed: {err}", R::KIND, keys.len());
        }
    }

    /// Removes the row from memory, then from the backend. Returns the
    /// removed row.
    pub async fn delete(&self, conn: &DatabaseConnection, key: &R::Key) -> Option<R> {
        let removed = self.remove(key)?;
        self.discard(conn, &[removed.key()]).await;
        Some(removed)
    }

    /// Writes the whole collection in one transaction.
    pub async fn flush_all(&self, conn: &DatabaseConnection) -> FlushReport {
        let snapshot = self.all();
        let ok = match Self::write(conn, &snapshot).await {
            Ok(()) => true,
            Err(err) => {
                error!("repo: flush {} x{} failed: {err}", R::KIND, snapshot.len());
                false
            }
        };
        FlushReport {
            kind: R::KIND,
            rows: snapshot.len(),
            ok,
        }
    }

    /// Bulk delete. The backend goes first inside one transaction; memory is
    /// only pruned once it commits, so a failure leaves both sides as they
    /// were. Rows changed while the delete was in flight stay in memory.
    pub async fn delete_where(
        &self,
        conn: &DatabaseConnection,
        predicate: impl Fn(&R) -> bool,
    ) -> IsleResult<usize> {
        let doomed = self.filter(&predicate);
        if doomed.is_empty() {
            return Ok(0);
        }
        let keys: Vec<R::Key> = doomed.iter().map(Record::key).collect();
        if let Err(err) = Self::erase(conn, &keys).await {
            error!(
                "repo: bulk delete {} x{} failed, memory unchanged: {err}",
                R::KIND,
                keys.len()
            );
            return Err(err);
        }
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|row| !doomed.contains(row));
        let removed = before - rows.len();
        if removed < doomed.len() {
            debug!(
                "repo: {} {} rows changed during bulk delete, kept in memory",
                doomed.len() - removed,
                R::KIND
            );
        }
        Ok(removed)
    }
}

/// Object-safe flush handle so a store can walk every repository in turn.
#[async_trait]
pub trait Flushable: Send + Sync {
    async fn flush(&self, conn: &DatabaseConnection) -> FlushReport;
}

#[async_trait]
impl<R: Record> Flushable for Repository<R> {
    async fn flush(&self, conn: &DatabaseConnection) -> FlushReport {
        self.flush_all(conn).await
    }
}

impl Repository<Island> {
    /// Inserts a new island without an id and reads it back by its unique
    /// name to learn the backend-assigned id. The re-read row joins the
    /// in-memory collection unless memory already holds a different island
    /// under that id, which is reported as a conflict.
    pub async fn insert_and_refetch(
        &self,
        conn: &DatabaseConnection,
        name: &str,
    ) -> IsleResult<Island> {
        let insert = Query::insert()
            .into_table(SkyisleIslands::Table)
            .columns([SkyisleIslands::Name, SkyisleIslands::Value])
            .values_panic([name.into(), 0.0_f64.into()])
            .to_owned();
        exec(conn, &insert).await?;
        let select = Island::select()
            .and_where(Expr::col(SkyisleIslands::Name).eq(name))
            .to_owned();
        let row = query_one(conn, &select)
            .await?
            .ok_or_else(|| IsleError::persistence(format!("island '{name}' missing after insert")))?;
        let island = Island::decode(&row)?;
        let clash = {
            let mut rows = self.lock();
            match rows.iter().find(|held| held.id == island.id) {
                Some(held) if held.name != island.name => Some(held.name.clone()),
                _ => {
                    rows.retain(|held| held.id != island.id);
                    rows.push(island.clone());
                    None
                }
            }
        };
        if let Some(held) = clash {
            if let Err(err) = Self::erase(conn, &[island.id]).await {
                warn!("repo: could not undo insert of island '{name}': {err}");
            }
            return Err(IsleError::conflict(format!(
                "backend assigned {} to '{name}' but memory holds '{held}' under it",
                island.id
            )));
        }
        Ok(island)
    }

    /// Id used when the backend cannot assign one. Counts down from -1 so it
    /// never meets a backend id.
    pub fn next_provisional_id(&self) -> IslandId {
        let min = self.lock().iter().map(|island| island.id.as_i32()).min();
        IslandId(min.unwrap_or(0).min(0) - 1)
    }

    pub fn warn_provisional(island: &Island, err: &IsleError) {
        warn!(
            "repo: island '{}' registered with provisional id {} after backend failure: {err}",
            island.name, island.id
        );
    }
}
