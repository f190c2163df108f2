//! Table schema definition for the airports store

use super::types::*;

pub static AIRPORTS: TableSchema = TableSchema {
    name: "airports",
    primary_key: "id",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("ident", ColumnType::Text),
        Column::required("type", ColumnType::Text),
        Column::required("name", ColumnType::Text),
        Column::new("latitude_deg", ColumnType::Real),
        Column::new("longitude_deg", ColumnType::Real),
        Column::new("elevation_ft", ColumnType::Integer),
        Column::new("continent", ColumnType::Text),
        Column::new("country_name", ColumnType::Text),
        Column::new("iso_country", ColumnType::Text),
        Column::new("region_name", ColumnType::Text),
        Column::new("iso_region", ColumnType::Text),
        Column::new("local_region", ColumnType::Text),
        Column::new("municipality", ColumnType::Text),
        Column::new("scheduled_service", ColumnType::Integer),
        Column::new("gps_code", ColumnType::Text),
        Column::new("icao_code", ColumnType::Text),
        Column::new("iata_code", ColumnType::Text),
        Column::new("local_code", ColumnType::Text),
        Column::new("home_link", ColumnType::Text),
        Column::new("wikipedia_link", ColumnType::Text),
        Column::new("keywords", ColumnType::Text),
        Column::new("score", ColumnType::Integer),
        Column::required("last_updated", ColumnType::Text),
    ],
    indexes: &[
        Index::on("idx_airports_ident", "ident"),
        Index::on("idx_airports_icao_code", "icao_code"),
        Index::on("idx_airports_iata_code", "iata_code"),
        Index::on("idx_airports_country", "iso_country"),
        Index::on("idx_airports_type", "type"),
        Index::on("idx_airports_municipality", "municipality"),
        Index::on("idx_airports_scheduled", "scheduled_service"),
    ],
};
