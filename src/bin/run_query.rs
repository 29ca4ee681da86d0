use anyhow::{Context, Result, anyhow, bail};

use cricbuzz_terminal::config::{self, DbConfig};
use cricbuzz_terminal::db::{self, queries};
use cricbuzz_terminal::logging;

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_stderr_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() || args.iter().any(|a| a == "--list") {
        for query in &queries::PRESET_QUERIES {
            println!("{}", query.label);
        }
        return Ok(());
    }

    let number = positional_arg(&args)
        .ok_or_else(|| anyhow!("usage: run_query <1-16> [--sqlite=PATH] | --list"))?;
    let number = number
        .trim_start_matches(['Q', 'q'])
        .parse::<usize>()
        .with_context(|| format!("invalid query number: {number}"))?;
    let Some(query) = queries::find(number) else {
        bail!("no preset query {number}; choose 1-{}", queries::PRESET_QUERIES.len());
    };

    let db_config = match parse_sqlite_arg(&args) {
        Some(path) => DbConfig::Sqlite(path.into()),
        None => DbConfig::from_env().context("database is not configured")?,
    };
    let mut backend = db::connect(&db_config)
        .with_context(|| format!("connect to {}", db_config.describe()))?;
    let table = backend
        .query(query.sql, &[])
        .with_context(|| format!("run {}", query.label))?;

    println!("{}", query.label);
    if table.is_empty() {
        println!("Query executed, but returned no results.");
    } else {
        println!("{}", table.to_text());
        println!("({} rows)", table.len());
    }
    Ok(())
}

fn positional_arg(args: &[String]) -> Option<&String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--sqlite" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(arg);
        }
    }
    None
}

fn parse_sqlite_arg(args: &[String]) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--sqlite=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--sqlite"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.clone());
        }
    }
    None
}
