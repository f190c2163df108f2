use rusqlite::Row;
use serde::Serialize;

/// One row of the `airports` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub id: i64,
    pub ident: String,
    #[serde(rename = "type")]
    pub airport_type: String,
    pub name: String,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub elevation_ft: Option<i64>,
    pub continent: Option<String>,
    pub country_name: Option<String>,
    pub iso_country: Option<String>,
    pub region_name: Option<String>,
    pub iso_region: Option<String>,
    pub local_region: Option<String>,
    pub municipality: Option<String>,
    pub scheduled_service: Option<i64>,
    pub gps_code: Option<String>,
    pub icao_code: Option<String>,
    pub iata_code: Option<String>,
    pub local_code: Option<String>,
    pub home_link: Option<String>,
    pub wikipedia_link: Option<String>,
    pub keywords: Option<String>,
    pub score: Option<i64>,
    pub last_updated: String,
}

impl Airport {
    /// Read from a row that selected every airports column by name
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            ident: row.get("ident")?,
            airport_type: row.get("type")?,
            name: row.get("name")?,
            latitude_deg: row.get("latitude_deg")?,
            longitude_deg: row.get("longitude_deg")?,
            elevation_ft: row.get("elevation_ft")?,
            continent: row.get("continent")?,
            country_name: row.get("country_name")?,
            iso_country: row.get("iso_country")?,
            region_name: row.get("region_name")?,
            iso_region: row.get("iso_region")?,
            local_region: row.get("local_region")?,
            municipality: row.get("municipality")?,
            scheduled_service: row.get("scheduled_service")?,
            gps_code: row.get("gps_code")?,
            icao_code: row.get("icao_code")?,
            iata_code: row.get("iata_code")?,
            local_code: row.get("local_code")?,
            home_link: row.get("home_link")?,
            wikipedia_link: row.get("wikipedia_link")?,
            keywords: row.get("keywords")?,
            score: row.get("score")?,
            last_updated: row.get("last_updated")?,
        })
    }
}

impl std::fmt::Display for Airport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes: Vec<&str> = [self.icao_code.as_deref(), self.iata_code.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        write!(f, "{} ({})", self.name, self.ident)?;
        if !codes.is_empty() {
            write!(f, " [{}]", codes.join("/"))?;
        }
        if let Some(city) = &self.municipality {
            write!(f, " - {}", city)?;
        }
        if let Some(country) = &self.country_name {
            write!(f, ", {}", country)?;
        }
        write!(f, " <{}>", self.airport_type)
    }
}

/// Airport within a search radius and its Manhattan distance in degrees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyAirport {
    #[serde(flatten)]
    pub airport: Airport,
    pub distance: f64,
}

/// Per-country airport counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryStats {
    pub country_name: Option<String>,
    pub total_airports: u64,
    pub large_airports: u64,
    pub scheduled_airports: u64,
}
