use anyhow::Result;
use diesel::{
    Connection, PgConnection,
    connection::CacheSize,
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
    result::{DatabaseErrorKind, Error as DieselError},
};

#[derive(Debug, Default)]
struct DisablePreparedStatements;

impl CustomizeConnection<PgConnection, R2d2Error> for DisablePreparedStatements {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

pub fn establish_connection(database_url: &str) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(DisablePreparedStatements::default()))
        .build(manager)?;
    Ok(pool)
}

const SERIALIZATION_RETRIES: usize = 3;

/// Runs `f` inside a serializable transaction and retries a bounded number of
/// times when Postgres aborts it with a serialization failure. Used by the
/// contended read-check-write paths (confirm and capture); everything else
/// runs in plain transactions.
pub fn run_serializable<T, F>(conn: &mut PgConnection, f: F) -> Result<T, DieselError>
where
    F: Fn(&mut PgConnection) -> Result<T, DieselError>,
{
    let mut attempts = 0;
    loop {
        match conn.build_transaction().serializable().run(|conn| f(conn)) {
            Err(DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _))
                if attempts < SERIALIZATION_RETRIES =>
            {
                attempts += 1;
            }
            other => return other,
        }
    }
}
