use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::query::fuzzy::DEFAULT_MIN_SCORE;
use crate::query::{DEFAULT_LIMIT, DEFAULT_RADIUS_DEG, DEFAULT_SUGGESTIONS};

/// Default input CSV path
pub const DEFAULT_INPUT: &str = "eu-airports.csv";

/// Default output database path
pub const DEFAULT_DB: &str = "eu-airports.db";

#[derive(Parser, Debug)]
#[command(name = "airports-to-sqlite")]
#[command(version, about = "Convert an airport CSV export to an indexed SQLite database")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Used when no subcommand is given
    #[command(flatten)]
    pub run: RunArgs,

    /// Without a subcommand, converts the CSV and verifies the result
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options for a full convert-and-verify run
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Input CSV path
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output SQLite database path
    #[arg(short, long, default_value = DEFAULT_DB)]
    pub output: PathBuf,

    /// Skip the verification queries
    #[arg(long)]
    pub skip_verify: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Convert the CSV to SQLite, then run the verification queries
    Run(RunArgs),

    /// Convert the CSV to SQLite only
    Convert {
        /// Input CSV path
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Output SQLite database path
        #[arg(short, long, default_value = DEFAULT_DB)]
        output: PathBuf,
    },

    /// Run the verification queries against an existing database
    Verify {
        /// SQLite database path
        #[arg(short, long, default_value = DEFAULT_DB)]
        db: PathBuf,
    },

    /// Look up one airport by ICAO or IATA code
    Lookup {
        /// ICAO or IATA code
        code: String,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// List airports in a country, highest score first
    Country {
        /// ISO 3166-1 alpha-2 country code
        iso_country: String,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// List airports of one type (large_airport, heliport, ...)
    Type {
        airport_type: String,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// Search name, ICAO, IATA and municipality
    Search {
        term: String,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Top up substring matches with fuzzy matches
        #[arg(long)]
        fuzzy: bool,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// Search airports by municipality
    City {
        name: String,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// Typo-tolerant search, best match first
    Fuzzy {
        query: String,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Drop matches scoring below this (ignored with --city and --icao)
        #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,

        /// Match against municipalities, exact city first
        #[arg(long, conflicts_with = "icao")]
        city: bool,

        /// Only consider airports with an ICAO code
        #[arg(long)]
        icao: bool,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// Complete an ICAO or IATA code prefix
    Suggest {
        prefix: String,

        #[arg(short, long, default_value_t = DEFAULT_SUGGESTIONS)]
        limit: usize,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// Airports near a coordinate, nearest first
    Nearby {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        /// Search radius in degrees
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_DEG)]
        radius: f64,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        #[command(flatten)]
        output: QueryArgs,
    },

    /// Airport counts per country
    Stats {
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        #[command(flatten)]
        output: QueryArgs,
    },
}

/// Options shared by the query subcommands
#[derive(clap::Args, Debug, PartialEq)]
pub struct QueryArgs {
    /// SQLite database path
    #[arg(short, long, default_value = DEFAULT_DB)]
    pub db: PathBuf,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The command to run; without a subcommand, `run` with the top-level
    /// options
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Run(self.run))
    }
}
