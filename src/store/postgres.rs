use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{types::Json, Executor, Pool, Postgres, Row};
use uuid::Uuid;

use super::RideStore;
use crate::entities::{Passenger, Ride, Status};
use crate::error::{conflict_error, Error};

/// Postgres-backed store. Entities live in JSONB rows; the extra columns
/// mirror the fields the queries filter on, and the version column carries
/// the optimistic check.
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip_all)]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute(
            "CREATE TABLE IF NOT EXISTS rides (id UUID PRIMARY KEY, status VARCHAR NOT NULL, available_seats INT4 NOT NULL, version INT8 NOT NULL, data JSONB NOT NULL)",
        )
        .await?;
        pool.execute(
            "CREATE TABLE IF NOT EXISTS passengers (id UUID PRIMARY KEY, version INT8 NOT NULL, data JSONB NOT NULL)",
        )
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl RideStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn find_poolable_rides(&self, status: Status) -> Result<Vec<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM rides WHERE status = $1 AND available_seats > 0 ORDER BY data->>'created_at' ASC, id ASC",
                )
                .bind(status.name()),
            )
            .await?;

        let mut pool = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(ride): Json<Ride> = row.try_get("data")?;
            pool.push(ride);
        }

        Ok(pool)
    }

    #[tracing::instrument(skip(self))]
    async fn count_by_status(&self, status: Status) -> Result<i64, Error> {
        let mut conn = self.pool.acquire().await?;

        let row = conn
            .fetch_one(
                sqlx::query("SELECT COUNT(*) AS count FROM rides WHERE status = $1")
                    .bind(status.name()),
            )
            .await?;

        let count: i64 = row.try_get("count")?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn find_ride(&self, id: Uuid) -> Result<Option<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_row = conn
            .fetch_optional(sqlx::query("SELECT data FROM rides WHERE id = $1").bind(&id))
            .await?;

        match maybe_row {
            Some(row) => {
                let Json(ride): Json<Ride> = row.try_get("data")?;
                Ok(Some(ride))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, ride))]
    async fn create_ride(&self, ride: Ride) -> Result<Ride, Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO rides (id, status, available_seats, version, data) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&ride.id)
            .bind(ride.status.name())
            .bind(ride.available_seats as i32)
            .bind(ride.version)
            .bind(Json(&ride)),
        )
        .await?;

        Ok(ride)
    }

    #[tracing::instrument(skip(self, ride))]
    async fn save_ride(&self, ride: Ride) -> Result<Ride, Error> {
        let mut conn = self.pool.acquire().await?;

        let expected = ride.version;
        let mut ride = ride;
        ride.version += 1;

        let result = conn
            .execute(
                sqlx::query(
                    "UPDATE rides SET status = $2, available_seats = $3, version = $4, data = $5 WHERE id = $1 AND version = $6",
                )
                .bind(&ride.id)
                .bind(ride.status.name())
                .bind(ride.available_seats as i32)
                .bind(ride.version)
                .bind(Json(&ride))
                .bind(expected),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(conflict_error());
        }

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn find_passenger(&self, id: Uuid) -> Result<Option<Passenger>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_row = conn
            .fetch_optional(sqlx::query("SELECT data FROM passengers WHERE id = $1").bind(&id))
            .await?;

        match maybe_row {
            Some(row) => {
                let Json(passenger): Json<Passenger> = row.try_get("data")?;
                Ok(Some(passenger))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, passenger))]
    async fn create_passenger(&self, passenger: Passenger) -> Result<Passenger, Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO passengers (id, version, data) VALUES ($1, $2, $3)")
                .bind(&passenger.id)
                .bind(passenger.version)
                .bind(Json(&passenger)),
        )
        .await?;

        Ok(passenger)
    }

    #[tracing::instrument(skip(self, passenger))]
    async fn save_passenger(&self, passenger: Passenger) -> Result<Passenger, Error> {
        let mut conn = self.pool.acquire().await?;

        let expected = passenger.version;
        let mut passenger = passenger;
        passenger.version += 1;

        let result = conn
            .execute(
                sqlx::query(
                    "UPDATE passengers SET version = $2, data = $3 WHERE id = $1 AND version = $4",
                )
                .bind(&passenger.id)
                .bind(passenger.version)
                .bind(Json(&passenger))
                .bind(expected),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(conflict_error());
        }

        Ok(passenger)
    }
}
