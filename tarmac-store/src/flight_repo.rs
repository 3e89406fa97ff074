use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tarmac_core::search::{rank_itineraries, FlightSearchRequest};
use tarmac_core::{Flight, FlightRepository, Itinerary, StoreResult};
use tracing::{debug, warn};

use crate::database::map_db_error;

/// Columns decoded by [`flight_from_row`] with an empty suffix
pub(crate) const FLIGHT_COLUMNS: &str =
    "f.fid, f.flight_date, c.name AS carrier, f.flight_num, f.origin_city, f.dest_city, f.actual_time";

/// Reads one flight out of a row whose columns carry `suffix`, e.g. `fid2`.
pub(crate) fn flight_from_row(row: &PgRow, suffix: &str) -> Result<Flight, sqlx::Error> {
    let col = |name: &str| format!("{}{}", name, suffix);
    Ok(Flight {
        id: row.try_get(col("fid").as_str())?,
        date: row.try_get(col("flight_date").as_str())?,
        carrier: row.try_get(col("carrier").as_str())?,
        flight_number: row.try_get(col("flight_num").as_str())?,
        origin_city: row.try_get(col("origin_city").as_str())?,
        dest_city: row.try_get(col("dest_city").as_str())?,
        duration_minutes: row
            .try_get::<Option<i32>, _>(col("actual_time").as_str())?
            .unwrap_or_default(),
    })
}

pub struct PgFlightRepository {
    pool: PgPool,
}

impl PgFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn direct_flights(&self, request: &FlightSearchRequest) -> Result<Vec<Itinerary>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {FLIGHT_COLUMNS}
            FROM flights f
            JOIN carriers c ON f.carrier_id = c.cid
            WHERE f.actual_time IS NOT NULL
                AND f.flight_date = $1
                AND f.origin_city = $2
                AND f.dest_city = $3
            ORDER BY f.actual_time ASC, f.fid ASC
            LIMIT $4
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(request.date)
            .bind(&request.origin_city)
            .bind(&request.dest_city)
            .bind(request.limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut itineraries = Vec::with_capacity(rows.len());
        for row in &rows {
            let leg = flight_from_row(row, "")?;
            match Itinerary::new(vec![leg]) {
                Ok(itinerary) => itineraries.push(itinerary),
                Err(e) => warn!("Skipping malformed direct flight: {}", e),
            }
        }
        Ok(itineraries)
    }

    async fn one_stop_flights(&self, request: &FlightSearchRequest) -> Result<Vec<Itinerary>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                f1.fid AS fid1, f1.flight_date AS flight_date1, c1.name AS carrier1, f1.flight_num AS flight_num1,
                f1.origin_city AS origin_city1, f1.dest_city AS dest_city1, f1.actual_time AS actual_time1,
                f2.fid AS fid2, f2.flight_date AS flight_date2, c2.name AS carrier2, f2.flight_num AS flight_num2,
                f2.origin_city AS origin_city2, f2.dest_city AS dest_city2, f2.actual_time AS actual_time2
            FROM flights f1
            JOIN carriers c1 ON f1.carrier_id = c1.cid
            JOIN flights f2 ON f2.origin_city = f1.dest_city AND f2.flight_date = f1.flight_date
            JOIN carriers c2 ON f2.carrier_id = c2.cid
            WHERE f1.actual_time IS NOT NULL
                AND f2.actual_time IS NOT NULL
                AND f1.flight_date = $1
                AND f1.origin_city = $2
                AND f2.dest_city = $3
            ORDER BY f1.actual_time + f2.actual_time ASC, f1.fid ASC, f2.fid ASC
            LIMIT $4
            "#,
        )
        .bind(request.date)
        .bind(&request.origin_city)
        .bind(&request.dest_city)
        .bind(request.limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut itineraries = Vec::with_capacity(rows.len());
        for row in &rows {
            let legs = vec![flight_from_row(row, "1")?, flight_from_row(row, "2")?];
            match Itinerary::new(legs) {
                Ok(itinerary) => itineraries.push(itinerary),
                Err(e) => warn!("Skipping malformed connection: {}", e),
            }
        }
        Ok(itineraries)
    }
}

#[async_trait]
impl FlightRepository for PgFlightRepository {
    async fn search(&self, request: &FlightSearchRequest) -> StoreResult<Vec<Itinerary>> {
        let mut candidates = self.direct_flights(request).await.map_err(map_db_error)?;
        let direct_count = candidates.len();
        candidates.extend(self.one_stop_flights(request).await.map_err(map_db_error)?);

        debug!(
            direct = direct_count,
            one_stop = candidates.len() - direct_count,
            "Flight search candidates for {} -> {} on {}",
            request.origin_city,
            request.dest_city,
            request.date
        );

        Ok(rank_itineraries(candidates, request.limit))
    }

    async fn get_flights(&self, ids: &[i32]) -> StoreResult<Vec<Flight>> {
        let sql = format!(
            r#"
            SELECT {FLIGHT_COLUMNS}
            FROM flights f
            JOIN carriers c ON f.carrier_id = c.cid
            WHERE f.fid = ANY($1)
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let found = rows
            .iter()
            .map(|row| flight_from_row(row, ""))
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_db_error)?;

        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|f| f.id == *id).cloned())
            .collect())
    }
}
