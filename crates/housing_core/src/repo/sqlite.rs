//! SQLite implementation of the housing repositories.
//!
//! # Responsibility
//! - Translate `Repository<T>` calls into parameterized SQL.
//! - Stage writes in one explicit transaction that `persist` commits.
//!
//! # Invariants
//! - The first write after a persist/discard opens `BEGIN IMMEDIATE`.
//! - Foreign keys are deferred, so orphans surface at COMMIT as
//!   `RepoError::Integrity` and the unit is rolled back.
//! - Dropping the store rolls back anything still staged.

use crate::model::{
    Address, DependentFilter, Entity, Garage, House, HouseFilter, NewAddress, NewGarage, NewHouse,
};
use crate::repo::{RepoError, RepoResult, Repository, UnitOfWork};
use log::{debug, error, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};

const HOUSE_SELECT_SQL: &str = "SELECT
    id,
    owner,
    year_built,
    area,
    floors
FROM houses";

const ADDRESS_SELECT_SQL: &str = "SELECT
    id,
    house_id,
    street,
    city,
    postal_code,
    country,
    notes
FROM addresses";

const GARAGE_SELECT_SQL: &str = "SELECT
    id,
    house_id,
    kind,
    size
FROM garages";

const REQUIRED_TABLES: [&str; 3] = ["houses", "addresses", "garages"];

/// SQLite-backed store for houses, addresses and garages.
pub struct SqliteHousingStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHousingStore<'conn> {
    /// Wraps a connection returned by `db::open_db` / `db::open_db_in_memory`.
    ///
    /// Fails with `MissingRequiredTable` on an unmigrated connection and with
    /// `TransactionInProgress` when the caller already opened a transaction;
    /// the store commits and rolls back the connection's transaction itself.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !conn.is_autocommit() {
            return Err(RepoError::TransactionInProgress);
        }
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    fn begin_pending(&self) -> RepoResult<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN IMMEDIATE;")?;
            debug!("event=unit_begin module=repo status=ok store=sqlite");
        }
        Ok(())
    }

    fn query_rows<T>(
        &self,
        sql: &str,
        bind_values: Vec<Value>,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }

    fn query_one<T>(
        &self,
        sql: &str,
        id: i64,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Option<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse(row)?));
        }
        Ok(None)
    }

    fn delete_row<T: Entity>(&self, table: &str, id: i64) -> RepoResult<()> {
        self.begin_pending()?;
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id])?;
        if changed == 0 {
            return Err(RepoError::not_found::<T>(id));
        }
        Ok(())
    }
}

impl Drop for SqliteHousingStore<'_> {
    fn drop(&mut self) {
        if !self.conn.is_autocommit() {
            warn!("event=unit_discard module=repo status=ok store=sqlite reason=drop");
            if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
                error!("event=unit_discard module=repo status=error store=sqlite error={err}");
            }
        }
    }
}

impl UnitOfWork for SqliteHousingStore<'_> {
    fn persist(&self) -> RepoResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }

        match self.conn.execute_batch("COMMIT;") {
            Ok(()) => Ok(()),
            Err(err) => {
                // A failed COMMIT (deferred FK) leaves the transaction open.
                if !self.conn.is_autocommit() {
                    self.conn.execute_batch("ROLLBACK;")?;
                }
                Err(classify_commit_error(err))
            }
        }
    }

    fn discard(&self) -> RepoResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK;")?;
        }
        Ok(())
    }

    fn has_pending(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl Repository<House> for SqliteHousingStore<'_> {
    fn fetch_where(&self, filter: &HouseFilter) -> RepoResult<Vec<House>> {
        let mut sql = format!("{HOUSE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        // lower() folds ASCII only, matching HouseFilter::matches.
        if let Some(owner) = filter.owner_contains.as_ref() {
            sql.push_str(" AND instr(lower(owner), lower(?)) > 0");
            bind_values.push(Value::Text(owner.clone()));
        }

        if let Some(year_built) = filter.year_built {
            sql.push_str(" AND year_built = ?");
            bind_values.push(Value::Integer(i64::from(year_built)));
        }

        if let Some(floors) = filter.floors {
            sql.push_str(" AND floors = ?");
            bind_values.push(Value::Integer(i64::from(floors)));
        }

        sql.push_str(" ORDER BY id ASC");
        self.query_rows(&sql, bind_values, parse_house_row)
    }

    fn fetch_by_id(&self, id: i64) -> RepoResult<Option<House>> {
        self.query_one(
            &format!("{HOUSE_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_house_row,
        )
    }

    fn add(&self, draft: &NewHouse) -> RepoResult<House> {
        draft.validate()?;
        self.begin_pending()?;

        self.conn.execute(
            "INSERT INTO houses (owner, year_built, area, floors)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.owner.as_str(),
                draft.year_built,
                draft.area,
                draft.floors,
            ],
        )?;

        Ok(draft.clone().into_house(self.conn.last_insert_rowid()))
    }

    fn update(&self, house: &House) -> RepoResult<()> {
        house.validate()?;
        self.begin_pending()?;

        let changed = self.conn.execute(
            "UPDATE houses
             SET
                owner = ?1,
                year_built = ?2,
                area = ?3,
                floors = ?4
             WHERE id = ?5;",
            params![
                house.owner.as_str(),
                house.year_built,
                house.area,
                house.floors,
                house.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found::<House>(house.id));
        }
        Ok(())
    }

    fn remove(&self, house: &House) -> RepoResult<()> {
        self.delete_row::<House>("houses", house.id)
    }
}

impl Repository<Address> for SqliteHousingStore<'_> {
    fn fetch_where(&self, filter: &DependentFilter) -> RepoResult<Vec<Address>> {
        let (sql, bind_values) = dependent_query(ADDRESS_SELECT_SQL, filter);
        self.query_rows(&sql, bind_values, parse_address_row)
    }

    fn fetch_by_id(&self, id: i64) -> RepoResult<Option<Address>> {
        self.query_one(
            &format!("{ADDRESS_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_address_row,
        )
    }

    fn add(&self, draft: &NewAddress) -> RepoResult<Address> {
        draft.validate()?;
        self.begin_pending()?;

        self.conn.execute(
            "INSERT INTO addresses (house_id, street, city, postal_code, country, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.house_id,
                draft.street.as_str(),
                draft.city.as_str(),
                draft.postal_code.as_str(),
                draft.country.as_str(),
                draft.notes.as_str(),
            ],
        )?;

        Ok(draft.clone().into_address(self.conn.last_insert_rowid()))
    }

    fn update(&self, address: &Address) -> RepoResult<()> {
        address.validate()?;
        self.begin_pending()?;

        let changed = self.conn.execute(
            "UPDATE addresses
             SET
                street = ?1,
                city = ?2,
                postal_code = ?3,
                country = ?4,
                notes = ?5
             WHERE id = ?6;",
            params![
                address.street.as_str(),
                address.city.as_str(),
                address.postal_code.as_str(),
                address.country.as_str(),
                address.notes.as_str(),
                address.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found::<Address>(address.id));
        }
        Ok(())
    }

    fn remove(&self, address: &Address) -> RepoResult<()> {
        self.delete_row::<Address>("addresses", address.id)
    }
}

impl Repository<Garage> for SqliteHousingStore<'_> {
    fn fetch_where(&self, filter: &DependentFilter) -> RepoResult<Vec<Garage>> {
        let (sql, bind_values) = dependent_query(GARAGE_SELECT_SQL, filter);
        self.query_rows(&sql, bind_values, parse_garage_row)
    }

    fn fetch_by_id(&self, id: i64) -> RepoResult<Option<Garage>> {
        self.query_one(
            &format!("{GARAGE_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_garage_row,
        )
    }

    fn add(&self, draft: &NewGarage) -> RepoResult<Garage> {
        draft.validate()?;
        self.begin_pending()?;

        self.conn.execute(
            "INSERT INTO garages (house_id, kind, size)
             VALUES (?1, ?2, ?3);",
            params![draft.house_id, draft.kind.as_str(), draft.size],
        )?;

        Ok(draft.clone().into_garage(self.conn.last_insert_rowid()))
    }

    fn update(&self, garage: &Garage) -> RepoResult<()> {
        garage.validate()?;
        self.begin_pending()?;

        let changed = self.conn.execute(
            "UPDATE garages
             SET
                kind = ?1,
                size = ?2
             WHERE id = ?3;",
            params![garage.kind.as_str(), garage.size, garage.id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found::<Garage>(garage.id));
        }
        Ok(())
    }

    fn remove(&self, garage: &Garage) -> RepoResult<()> {
        self.delete_row::<Garage>("garages", garage.id)
    }
}

fn dependent_query(select_sql: &str, filter: &DependentFilter) -> (String, Vec<Value>) {
    let mut sql = format!("{select_sql} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(house_id) = filter.house_id {
        sql.push_str(" AND house_id = ?");
        bind_values.push(Value::Integer(house_id));
    }

    sql.push_str(" ORDER BY id ASC");
    (sql, bind_values)
}

fn parse_house_row(row: &Row<'_>) -> RepoResult<House> {
    let house = House {
        id: row.get("id")?,
        owner: row.get("owner")?,
        year_built: row.get("year_built")?,
        area: row.get("area")?,
        floors: row.get("floors")?,
    };
    house
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("houses.id={}: {err}", house.id)))?;
    Ok(house)
}

fn parse_address_row(row: &Row<'_>) -> RepoResult<Address> {
    Ok(Address {
        id: row.get("id")?,
        house_id: row.get("house_id")?,
        street: row.get("street")?,
        city: row.get("city")?,
        postal_code: row.get("postal_code")?,
        country: row.get("country")?,
        notes: row.get("notes")?,
    })
}

fn parse_garage_row(row: &Row<'_>) -> RepoResult<Garage> {
    Ok(Garage {
        id: row.get("id")?,
        house_id: row.get("house_id")?,
        kind: row.get("kind")?,
        size: row.get("size")?,
    })
}

fn classify_commit_error(err: rusqlite::Error) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::Integrity(
                message
                    .clone()
                    .unwrap_or_else(|| "constraint failed".to_string()),
            )
        }
        _ => RepoError::from(err),
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
