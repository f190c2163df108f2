use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::airport::{Airport, CountryStats, NearbyAirport};
use super::fuzzy::{self, FuzzyMatch};
use super::open_read_only;

pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_RADIUS_DEG: f64 = 1.0;
pub const DEFAULT_SUGGESTIONS: usize = 10;

const ICAO_MIN_SCORE: f64 = 30.0;
const FALLBACK_MIN_SCORE: f64 = 20.0;

/// Read-only lookups over a finished airports database
pub struct AirportQueries {
    conn: Connection,
}

impl AirportQueries {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_read_only(db_path)?,
        })
    }

    pub fn by_icao(&self, code: &str) -> Result<Option<Airport>> {
        self.conn
            .query_row(
                "SELECT * FROM airports WHERE icao_code = ?1",
                [code],
                Airport::from_row,
            )
            .optional()
            .with_context(|| format!("Failed to look up ICAO code {}", code))
    }

    pub fn by_iata(&self, code: &str) -> Result<Option<Airport>> {
        self.conn
            .query_row(
                "SELECT * FROM airports WHERE iata_code = ?1",
                [code],
                Airport::from_row,
            )
            .optional()
            .with_context(|| format!("Failed to look up IATA code {}", code))
    }

    /// ICAO first, then IATA. Codes are matched upper-cased.
    pub fn by_code(&self, code: &str) -> Result<Option<Airport>> {
        let code = code.trim().to_uppercase();
        match self.by_icao(&code)? {
            Some(airport) => Ok(Some(airport)),
            None => self.by_iata(&code),
        }
    }

    pub fn by_country(&self, iso_country: &str, limit: usize) -> Result<Vec<Airport>> {
        self.collect(
            "SELECT * FROM airports WHERE iso_country = ?1 ORDER BY score DESC LIMIT ?2",
            params![iso_country, limit as i64],
        )
        .with_context(|| format!("Failed to list airports in {}", iso_country))
    }

    pub fn by_type(&self, airport_type: &str, limit: usize) -> Result<Vec<Airport>> {
        self.collect(
            "SELECT * FROM airports WHERE type = ?1 ORDER BY score DESC LIMIT ?2",
            params![airport_type, limit as i64],
        )
        .with_context(|| format!("Failed to list airports of type {}", airport_type))
    }

    /// Substring match on name, ICAO, IATA and municipality
    pub fn search(&self, term: &str, limit: usize) -> Result<Vec<Airport>> {
        let pattern = format!("%{}%", escape_like(term));
        self.collect(
            "SELECT * FROM airports
             WHERE name LIKE ?1 ESCAPE '\\'
                OR icao_code LIKE ?1 ESCAPE '\\'
                OR iata_code LIKE ?1 ESCAPE '\\'
                OR municipality LIKE ?1 ESCAPE '\\'
             ORDER BY score DESC
             LIMIT ?2",
            params![pattern, limit as i64],
        )
        .with_context(|| format!("Failed to search for {:?}", term))
    }

    /// Municipality substring match. Exact matches rank first, then
    /// prefix matches, then the rest; ties by name.
    pub fn by_city(&self, city: &str, limit: usize) -> Result<Vec<Airport>> {
        let escaped = escape_like(city);
        let contains = format!("%{}%", escaped);
        let prefix = format!("{}%", escaped);
        self.collect(
            "SELECT * FROM airports
             WHERE municipality LIKE ?1 ESCAPE '\\'
             ORDER BY
                CASE
                    WHEN municipality = ?2 THEN 1
                    WHEN municipality LIKE ?3 ESCAPE '\\' THEN 2
                    ELSE 3
                END,
                name
             LIMIT ?4",
            params![contains, city, prefix, limit as i64],
        )
        .with_context(|| format!("Failed to search city {:?}", city))
    }

    /// Airports inside a square of `radius_deg` around a point, nearest first
    pub fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_deg: f64,
        limit: usize,
    ) -> Result<Vec<NearbyAirport>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT *, ABS(latitude_deg - ?1) + ABS(longitude_deg - ?2) AS distance
             FROM airports
             WHERE latitude_deg IS NOT NULL
               AND longitude_deg IS NOT NULL
               AND ABS(latitude_deg - ?1) <= ?3
               AND ABS(longitude_deg - ?2) <= ?3
             ORDER BY distance ASC
             LIMIT ?4",
        )?;

        let rows = stmt
            .query_map(
                params![latitude, longitude, radius_deg, limit as i64],
                |row| {
                    Ok(NearbyAirport {
                        airport: Airport::from_row(row)?,
                        distance: row.get("distance")?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to search nearby airports")?;

        Ok(rows)
    }

    /// Airport counts per country, largest first
    pub fn country_stats(&self, limit: usize) -> Result<Vec<CountryStats>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT
                country_name,
                COUNT(*) AS total_airports,
                COUNT(CASE WHEN type = 'large_airport' THEN 1 END) AS large_airports,
                COUNT(CASE WHEN scheduled_service = 1 THEN 1 END) AS scheduled_airports
             FROM airports
             GROUP BY country_name
             ORDER BY total_airports DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(CountryStats {
                    country_name: row.get(0)?,
                    total_airports: row.get::<_, i64>(1)? as u64,
                    large_airports: row.get::<_, i64>(2)? as u64,
                    scheduled_airports: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to compute country statistics")?;

        Ok(rows)
    }

    /// Every airport, highest score first. The candidate set for fuzzy
    /// ranking.
    pub fn all(&self) -> Result<Vec<Airport>> {
        self.collect("SELECT * FROM airports ORDER BY score DESC", [])
            .context("Failed to load airports")
    }

    /// Typo-tolerant search over codes, name, municipality and keywords
    pub fn fuzzy_search(&self, query: &str, limit: usize, min_score: f64) -> Result<Vec<FuzzyMatch>> {
        Ok(fuzzy::rank(&self.all()?, query, limit, min_score))
    }

    /// Fuzzy search restricted to airports that have an ICAO code
    pub fn fuzzy_icao(&self, query: &str, limit: usize) -> Result<Vec<FuzzyMatch>> {
        if query.trim().chars().count() < 3 {
            return Ok(Vec::new());
        }
        let candidates: Vec<Airport> = self
            .all()?
            .into_iter()
            .filter(|a| a.icao_code.is_some())
            .collect();
        Ok(fuzzy::rank(&candidates, query, limit, ICAO_MIN_SCORE))
    }

    /// Fuzzy search over airports with a municipality. An exact city
    /// match ranks first, then a city prefix match, then score.
    pub fn fuzzy_city(&self, city: &str, limit: usize) -> Result<Vec<FuzzyMatch>> {
        let candidates: Vec<Airport> = self
            .all()?
            .into_iter()
            .filter(|a| a.municipality.as_deref().is_some_and(|m| !m.is_empty()))
            .collect();

        let needle = city.trim().to_lowercase();
        let mut ranked = fuzzy::rank(&candidates, city, candidates.len(), fuzzy::DEFAULT_MIN_SCORE);
        ranked.sort_by_key(|m| {
            let municipality = m
                .airport
                .municipality
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            if municipality == needle {
                0
            } else if municipality.starts_with(&needle) {
                1
            } else {
                2
            }
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Substring matches first, topped up with fuzzy matches
    pub fn search_with_fuzzy(&self, term: &str, limit: usize) -> Result<Vec<Airport>> {
        let mut found = self.search(term, (limit / 2).max(1))?;
        let remaining = limit.saturating_sub(found.len());
        if remaining > 0 {
            for m in self.fuzzy_search(term, limit, FALLBACK_MIN_SCORE)? {
                if found.len() >= limit {
                    break;
                }
                if !found.iter().any(|a| a.id == m.airport.id) {
                    found.push(m.airport);
                }
            }
        }
        found.truncate(limit);
        Ok(found)
    }

    /// ICAO and IATA codes starting with `prefix`, for completion
    pub fn suggestions(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        Ok(fuzzy::suggestions(&self.all()?, prefix, limit))
    }

    fn collect(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Airport>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, Airport::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
