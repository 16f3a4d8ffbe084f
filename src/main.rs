use std::fs;
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;

use artcat_core::*;

/// Artwork catalog manager - hierarchical category metadata over collections
///
/// Examples:
///   # List the category paths a collection defines
///   artcat --data ./data paths Plakaty
///
///   # Quick search: exact value at any category depth
///   artcat --data ./data search Plakaty --text 1999
///
///   # Advanced search: per-category conditions
///   artcat --data ./data search Plakaty --where Rok=1999 --where Rok.Miesiąc=Maj
///
///   # Top-level lookup, case-insensitive
///   artcat --data ./data search Plakaty --topmost cyrk
///
///   # Replace a schema and reconcile the stored artworks
///   artcat --data ./data edit-schema Plakaty new-schema.json
///
///   # Spreadsheet round trip
///   artcat --data ./data import Plakaty rows.csv --new
///   artcat --data ./data export Plakaty rows.csv
#[derive(Parser, Debug)]
#[command(name = "artcat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding collection and artwork documents
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the dotted category paths a collection defines
    Paths { collection: String },

    /// Check every stored artwork against the collection schema
    Validate { collection: String },

    /// Search a collection's artworks
    Search {
        collection: String,

        /// Exact value to look for at any category depth
        #[arg(long, value_name = "TEXT", conflicts_with_all = ["topmost", "conditions"])]
        text: Option<String>,

        /// Exact, case-insensitive top-level category value
        #[arg(long, value_name = "TEXT", conflicts_with = "conditions")]
        topmost: Option<String>,

        /// Per-category condition, `path=value` or bare `path` (repeatable)
        #[arg(short = 'w', long = "where", value_name = "PATH[=VALUE]")]
        conditions: Vec<String>,

        /// Dotted category path to sort the results by
        #[arg(long, value_name = "PATH")]
        sort: Option<String>,

        /// Reverse the sorted order
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Print the compiled document query before the results
        #[arg(long)]
        show_query: bool,
    },

    /// Replace a collection's schema and reconcile its stored artworks
    EditSchema {
        collection: String,

        /// JSON file holding the new category tree
        schema_file: String,
    },

    /// Import artworks from a delimited file whose header row holds dotted paths
    Import {
        collection: String,
        file: String,

        /// Create the collection from the header instead of matching an existing schema
        #[arg(long)]
        new: bool,
    },

    /// Export artworks to a delimited file, one column per category path
    Export { collection: String, file: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(&cli) {
        eprintln!("{} {:#}", "error:".red().bold(), error);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let store = Store::new(&cli.data);
    match &cli.command {
        Command::Paths { collection } => paths_command(&store, collection),
        Command::Validate { collection } => validate_command(&store, collection),
        Command::Search {
            collection,
            text,
            topmost,
            conditions,
            sort,
            desc,
            show_query,
        } => search_command(
            &store,
            collection,
            text.as_deref(),
            topmost.as_deref(),
            conditions,
            sort.as_deref(),
            *desc,
            *show_query,
        ),
        Command::EditSchema {
            collection,
            schema_file,
        } => edit_schema_command(&store, collection, schema_file),
        Command::Import {
            collection,
            file,
            new,
        } => import_command(&store, collection, file, *new),
        Command::Export { collection, file } => export_command(&store, collection, file),
    }
}

fn paths_command(store: &Store, collection: &str) -> anyhow::Result<()> {
    let owner = store.fetch_schema(collection)?;
    for path in flatten_paths(&owner.schema) {
        println!("{}", path);
    }
    Ok(())
}

fn validate_command(store: &Store, collection: &str) -> anyhow::Result<()> {
    let owner = store.fetch_schema(collection)?;
    let artworks = store.fetch_items(collection, None)?;

    let mut failures = 0;
    for artwork in &artworks {
        match validate_create(&owner.schema, &artwork.values) {
            Ok(()) => println!("{} {}", "ok ".green(), artwork.id),
            Err(error) => {
                failures += 1;
                println!("{} {} {}", "bad".red().bold(), artwork.id, error);
            }
        }
    }
    if failures > 0 {
        bail!("{} of {} artworks failed validation", failures, artworks.len());
    }
    println!(
        "{} {} artworks match the schema",
        "ok:".green().bold(),
        artworks.len()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn search_command(
    store: &Store,
    collection: &str,
    text: Option<&str>,
    topmost: Option<&str>,
    conditions: &[String],
    sort: Option<&str>,
    desc: bool,
    show_query: bool,
) -> anyhow::Result<()> {
    let owner = store.fetch_schema(collection)?;

    let filter = if let Some(text) = text {
        compile_quick_filter(text, &owner.schema, &owner.name)
    } else if let Some(text) = topmost {
        compile_topmost_filter(text)
    } else if !conditions.is_empty() {
        let params = parse_search_params(conditions);
        compile_advanced_filter(&params, &owner.name)
    } else {
        bail!("nothing to search for: give --text, --topmost or --where");
    };

    if show_query {
        println!("{}", serde_json::to_string_pretty(&filter.to_document())?);
    }

    let mut items = store.fetch_items(collection, Some(&filter))?;
    if let Some(path) = sort {
        let direction = if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        items = sort_by_path(items, path, direction);
    }

    println!("{} {}\n", "matching artworks:".bold(), items.len());
    for artwork in &items {
        print_artwork(artwork);
    }
    Ok(())
}

fn parse_search_params(conditions: &[String]) -> SearchParams {
    let mut params = SearchParams::new();
    for condition in conditions {
        match condition.split_once('=') {
            Some((path, value)) => {
                params.insert(path.trim().to_string(), Some(value.trim().to_string()))
            }
            None => params.insert(condition.trim().to_string(), None),
        };
    }
    params
}

fn print_artwork(artwork: &Artwork) {
    println!("{} {}", "-".bold(), artwork.id.to_string().dimmed());
    print_nodes(&artwork.values, 1);
}

fn print_nodes(nodes: &[ValueNode], indent: usize) {
    let padding = "  ".repeat(indent);
    for node in nodes {
        if node.value.is_empty() {
            println!("{}{}", padding, node.name.cyan());
        } else {
            println!("{}{}: {}", padding, node.name.cyan(), node.value);
        }
        print_nodes(&node.children, indent + 1);
    }
}

fn edit_schema_command(store: &Store, collection: &str, schema_file: &str) -> anyhow::Result<()> {
    let contents =
        fs::read_to_string(schema_file).with_context(|| format!("reading '{}'", schema_file))?;
    let new_schema: Vec<SchemaNode> =
        serde_json::from_str(&contents).with_context(|| format!("parsing '{}'", schema_file))?;
    well_formed_schema(&new_schema)?;

    let mut owner = store.fetch_schema(collection)?;
    let artworks = store.fetch_items(collection, None)?;
    let trees: Vec<&[ValueNode]> = artworks
        .iter()
        .map(|artwork| artwork.values.as_slice())
        .collect();
    check_schema_edit(&trees, &new_schema)?;

    let count = artworks.len();
    let reconciled = reconcile_artworks(artworks, &new_schema);
    owner.schema = new_schema;
    store.save_collection(&owner)?;
    store.save_artworks(collection, &reconciled)?;

    println!(
        "{} schema replaced, {} artworks reconciled",
        "ok:".green().bold(),
        count
    );
    Ok(())
}

fn import_command(store: &Store, collection: &str, file: &str, new: bool) -> anyhow::Result<()> {
    let (header, rows) = read_delimited(file)?;

    let existing = if new {
        None
    } else {
        Some(store.fetch_schema(collection)?)
    };
    let paths = validate_header(
        &header,
        &rows,
        existing.as_ref().map(|owner| owner.schema.as_slice()),
    )?;

    let artworks = parse_rows(&header, &rows, collection);

    if new {
        let schema = schema_from_paths(&paths);
        store.save_collection(&Collection::new(collection, "", schema))?;
    }

    let mut all = store.fetch_items(collection, None)?;
    let added = artworks.len();
    all.extend(artworks);
    store.save_artworks(collection, &all)?;

    println!(
        "{} {} artworks imported into '{}'",
        "ok:".green().bold(),
        added,
        collection
    );
    Ok(())
}

fn read_delimited(file: &str) -> anyhow::Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(file)
        .with_context(|| format!("reading '{}'", file))?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => bail!("'{}' is empty", file),
    };
    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok((header, rows))
}

fn export_command(store: &Store, collection: &str, file: &str) -> anyhow::Result<()> {
    let owner = store.fetch_schema(collection)?;
    let paths = flatten_paths(&owner.schema);
    let artworks = store.fetch_items(collection, None)?;

    let mut writer =
        csv::Writer::from_path(file).with_context(|| format!("writing '{}'", file))?;
    writer.write_record(&paths)?;
    for artwork in &artworks {
        let filled = fill_row(&paths, &artwork.values);
        let record: Vec<&str> = paths
            .iter()
            .map(|path| filled.get(path).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!(
        "{} {} artworks exported to '{}'",
        "ok:".green().bold(),
        artworks.len(),
        file
    );
    Ok(())
}
