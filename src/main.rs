//! Searchlight command line
//!
//! Runs a search, count or scroll against the configured cluster and prints
//! the results as JSON.

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use searchlight::{
    config::Settings,
    network::{HttpClient, HttpMethod},
    search::{CountResult, RequestOptions, Search},
    util::replace_boolean_words_and_escape_term,
    OptionValue,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Parsed command line
struct Args {
    command: String,
    indices: String,
    query: String,
    limit: Option<u64>,
    expiry: Option<String>,
    escape: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1).collect())? {
        Some(args) => args,
        None => return Ok(()),
    };

    let settings = load_settings()?;
    let client = HttpClient::with_settings(&settings.connection)?;
    info!("Using cluster at {}", client.base_url());

    let mut search = Search::new(Arc::new(client));
    match args.indices.as_str() {
        "_all" => {}
        "-" => {
            search.add_indices(&settings.search.default_indices)?;
        }
        list => {
            search.add_indices(list.split(',').map(str::trim))?;
        }
    }

    let query = if args.escape {
        replace_boolean_words_and_escape_term(&args.query)
    } else {
        args.query.clone()
    };

    match args.command.as_str() {
        "search" => {
            let options = search_options(args.limit.unwrap_or(settings.search.default_limit))?;

            let result = search
                .search(query, Some(options), HttpMethod::Post)
                .await?;
            let output = json!({
                "total": result.total_hits(),
                "took": result.took(),
                "hits": result.hits(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "count" => {
            let total = match search.count(query, false, HttpMethod::Post).await? {
                CountResult::Total(total) => total,
                CountResult::Full(result) => result.total_hits(),
            };
            println!("{}", json!({ "count": total }));
        }
        "scroll" => {
            if let Some(limit) = args.limit {
                search.set_query(query)?.query_mut().set_size(limit);
            } else {
                search.set_query(query)?;
            }
            let expiry = args
                .expiry
                .unwrap_or_else(|| settings.search.scroll_expiry.clone());

            let mut pages = search.scroll(expiry).into_stream().boxed_local();
            while let Some(page) = pages.next().await {
                for hit in page?.iter() {
                    println!("{}", serde_json::to_string(hit)?);
                }
            }
        }
        other => bail!("Unknown command: {}", other),
    }

    Ok(())
}

/// Parse arguments; `None` when only help or version was requested
fn parse_args(raw: Vec<String>) -> Result<Option<Args>> {
    let mut positional = vec![];
    let mut limit = None;
    let mut expiry = None;
    let mut escape = false;

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("searchlight {}", searchlight::VERSION);
                return Ok(None);
            }
            "-l" | "--limit" => {
                let value = iter.next().context("--limit needs a value")?;
                limit = Some(value.parse().context("--limit must be a number")?);
            }
            "-e" | "--expiry" => {
                expiry = Some(iter.next().context("--expiry needs a value")?);
            }
            "--escape" => escape = true,
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(command), Some(indices)) = (positional.next(), positional.next()) else {
        print_usage();
        bail!("Missing command or indices");
    };
    let query = positional.collect::<Vec<_>>().join(" ");

    Ok(Some(Args {
        command,
        indices,
        query,
        limit,
        expiry,
        escape,
    }))
}

/// Request options for a single page of `limit` hits
fn search_options(limit: u64) -> Result<RequestOptions> {
    let limit = i64::try_from(limit).context("--limit is too large")?;
    let mut options = RequestOptions::new();
    options.insert("limit".to_string(), OptionValue::Integer(limit));
    Ok(options)
}

/// Load settings from file or use defaults
fn load_settings() -> Result<Settings> {
    // Check environment variable first
    if let Ok(path) = std::env::var("SEARCHLIGHT_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("searchlight/settings.yml"));
    }

    for path in paths.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
Searchlight v{}
Search request builder for Elasticsearch-compatible clusters

USAGE:
    searchlight <COMMAND> <INDICES> [QUERY...] [OPTIONS]

COMMANDS:
    search    Print the first page of hits
    count     Print the number of matching documents
    scroll    Print every matching hit, one JSON document per line

INDICES:
    Comma-separated index names, `_all` for every index, or `-` for the
    configured default indices

OPTIONS:
    -l, --limit <N>        Hits per page
    -e, --expiry <TIME>    Scroll keep-alive (e.g. 1m)
        --escape           Escape query syntax and replace AND/OR/NOT
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    SEARCHLIGHT_SETTINGS_PATH  Path to settings.yml
    SEARCHLIGHT_URL            Cluster URL
    SEARCHLIGHT_TIMEOUT        Request timeout in seconds
    SEARCHLIGHT_USERNAME       Basic auth user
    SEARCHLIGHT_PASSWORD       Basic auth password
    SEARCHLIGHT_VERIFY_SSL     Verify TLS certificates (true/false)
    SEARCHLIGHT_INDICES        Default indices, comma-separated
    RUST_LOG                   Log filter (e.g. searchlight=debug)
"#,
        searchlight::VERSION
    );
}
