use airports_to_sqlite::{
    cli::{Cli, Commands, QueryArgs, RunArgs},
    query::AirportQueries,
    verify::verify_database,
    writer::convert_to_sqlite,
    ConsoleUi, Phase, Ui,
};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    match run(cli.command()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let mut ui = ConsoleUi::new();

    match command {
        Commands::Run(RunArgs {
            input,
            output,
            skip_verify,
        }) => {
            convert(&input, &output, &mut ui)?;
            if !skip_verify {
                verify(&output, &mut ui)?;
            }
            ui.set_phase(Phase::Complete);
            println!(
                "\n✅ Successfully converted CSV to SQLite database: {}",
                output.display()
            );
        }

        Commands::Convert { input, output } => {
            convert(&input, &output, &mut ui)?;
            ui.set_phase(Phase::Complete);
            println!(
                "\n✅ Successfully converted CSV to SQLite database: {}",
                output.display()
            );
        }

        Commands::Verify { db } => verify(&db, &mut ui)?,

        Commands::Lookup { code, output } => {
            let airport = AirportQueries::open(&output.db)?.by_code(&code)?;
            match airport {
                Some(airport) => print_results(&output, std::slice::from_ref(&airport))?,
                None => println!("No airport with code {}", code.to_uppercase()),
            }
        }

        Commands::Country {
            iso_country,
            limit,
            output,
        } => {
            let airports = AirportQueries::open(&output.db)?.by_country(&iso_country, limit)?;
            print_results(&output, &airports)?;
        }

        Commands::Type {
            airport_type,
            limit,
            output,
        } => {
            let airports = AirportQueries::open(&output.db)?.by_type(&airport_type, limit)?;
            print_results(&output, &airports)?;
        }

        Commands::Search {
            term,
            limit,
            fuzzy,
            output,
        } => {
            let queries = AirportQueries::open(&output.db)?;
            let airports = if fuzzy {
                queries.search_with_fuzzy(&term, limit)?
            } else {
                queries.search(&term, limit)?
            };
            print_results(&output, &airports)?;
        }

        Commands::City {
            name,
            limit,
            output,
        } => {
            let airports = AirportQueries::open(&output.db)?.by_city(&name, limit)?;
            print_results(&output, &airports)?;
        }

        Commands::Fuzzy {
            query,
            limit,
            min_score,
            city,
            icao,
            output,
        } => {
            let queries = AirportQueries::open(&output.db)?;
            let matches = if city {
                queries.fuzzy_city(&query, limit)?
            } else if icao {
                queries.fuzzy_icao(&query, limit)?
            } else {
                queries.fuzzy_search(&query, limit, min_score)?
            };
            print_results(&output, &matches)?;
        }

        Commands::Suggest {
            prefix,
            limit,
            output,
        } => {
            let codes = AirportQueries::open(&output.db)?.suggestions(&prefix, limit)?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&codes)?);
            } else {
                for code in &codes {
                    println!("  {}", code);
                }
            }
        }

        Commands::Nearby {
            latitude,
            longitude,
            radius,
            limit,
            output,
        } => {
            let nearby =
                AirportQueries::open(&output.db)?.nearby(latitude, longitude, radius, limit)?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&nearby)?);
            } else {
                for entry in &nearby {
                    println!("  {:.3}°  {}", entry.distance, entry.airport);
                }
            }
        }

        Commands::Stats { limit, output } => {
            let stats = AirportQueries::open(&output.db)?.country_stats(limit)?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                for s in &stats {
                    println!(
                        "  {:30} total {:>6}  large {:>4}  scheduled {:>5}",
                        s.country_name.as_deref().unwrap_or("(unknown)"),
                        s.total_airports,
                        s.large_airports,
                        s.scheduled_airports
                    );
                }
            }
        }
    }

    Ok(())
}

fn convert(input: &Path, output: &Path, ui: &mut ConsoleUi) -> Result<()> {
    println!("Converting {} to SQLite...", input.display());
    let summary = convert_to_sqlite(input, output, ui)?;
    println!("\n{}", summary);
    Ok(())
}

fn verify(db: &Path, ui: &mut ConsoleUi) -> Result<()> {
    ui.set_phase(Phase::Verifying);
    println!("\n=== Testing Database ===");
    for result in verify_database(db)? {
        println!("\n{}", result);
    }
    Ok(())
}

fn print_results<T: Serialize + std::fmt::Display>(args: &QueryArgs, items: &[T]) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else if items.is_empty() {
        println!("No airports found");
    } else {
        for item in items {
            println!("  {}", item);
        }
    }
    Ok(())
}
