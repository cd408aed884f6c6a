//! CLI command implementations
//!
//! Every command follows the same sequence:
//! 1. Load and validate the configuration
//! 2. Apply the configured log threshold
//! 3. Build the catalogs and index the object dump
//! 4. Run the command and print one JSON response
//!
//! Indexes live in memory only; each invocation rebuilds them from the dump.

use serde_json::{json, Value};

use crate::catalog::{CatalogRegistry, PopulateReport};
use crate::config::CatalogConfig;
use crate::model::{Iid, JsonLinesScan};
use crate::observability::Logger;
use crate::query::parse_criterion;

use super::args::{Cli, Command, Source};
use super::errors::CliResult;
use super::io::write_response;

/// Catalogs populated from an object dump
pub struct Loaded {
    pub registry: CatalogRegistry,
    pub scan: JsonLinesScan,
    pub report: PopulateReport,
}

/// Loads the configuration and indexes every object of the dump
pub fn load(source: &Source) -> CliResult<Loaded> {
    let config = CatalogConfig::load(&source.config)?;
    Logger::set_threshold(config.log_level);

    let mut registry = CatalogRegistry::from_config(&config);
    let mut scan = JsonLinesScan::open(&source.objects)?;
    let report = registry.populate(&mut scan)?;
    Ok(Loaded {
        registry,
        scan,
        report,
    })
}

/// Parse arguments and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and print its response
pub fn run_command(cmd: Command) -> CliResult<()> {
    let data = execute(cmd)?;
    write_response(data)
}

/// Run a command and return its response data
pub fn execute(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Stats { source } => stats(&source),
        Command::Search {
            source,
            class,
            criteria,
            sort,
            reverse,
            page,
            page_size,
        } => search(
            &source,
            &class,
            &criteria,
            sort.as_deref(),
            reverse,
            page,
            page_size,
        ),
        Command::Recompute {
            source,
            class,
            index,
        } => recompute(&source, &class, index.as_deref()),
        Command::Show {
            source,
            class,
            index,
            iid,
        } => show(&source, &class, &index, iid),
    }
}

/// Sizes of every catalog and index
pub fn stats(source: &Source) -> CliResult<Value> {
    let loaded = load(source)?;
    Ok(json!({
        "populate": serde_json::to_value(&loaded.report)?,
        "catalogs": serde_json::to_value(loaded.registry.stats())?,
    }))
}

/// One page of the ids matching `criteria`, sorted on `sort` when given,
/// in id order otherwise
pub fn search(
    source: &Source,
    class: &str,
    criteria: &[String],
    sort: Option<&str>,
    reverse: bool,
    page: usize,
    page_size: usize,
) -> CliResult<Value> {
    let criteria = criteria
        .iter()
        .map(|c| parse_criterion(c))
        .collect::<Result<Vec<_>, _>>()?;

    let loaded = load(source)?;
    let catalog = loaded.registry.catalog(class)?;

    let (total, ids): (usize, Vec<Iid>) = match sort {
        Some(index) => {
            let sorted = catalog.search_sorted(&criteria, index, reverse)?;
            (sorted.len(), sorted.page(page, page_size))
        }
        None => {
            let found = catalog.search(&criteria)?.unwrap_or_default();
            let ids = found
                .iter()
                .copied()
                .skip(page.saturating_mul(page_size))
                .take(page_size)
                .collect();
            (found.len(), ids)
        }
    };

    Ok(json!({
        "catalog": class,
        "total": total,
        "page": page,
        "page_size": page_size,
        "ids": ids,
    }))
}

/// Rebuilds one index, or all indexes of a catalog, from the dump
pub fn recompute(source: &Source, class: &str, index: Option<&str>) -> CliResult<Value> {
    let mut loaded = load(source)?;
    let reports = match index {
        Some(name) => vec![loaded.registry.recompute(class, name, &mut loaded.scan)?],
        None => loaded
            .registry
            .catalog_mut(class)?
            .recompute_all(&mut loaded.scan)?,
    };
    Ok(json!({
        "populate": serde_json::to_value(&loaded.report)?,
        "recompute": serde_json::to_value(&reports)?,
    }))
}

/// Entries of index `index`, or the entry of object `iid`
pub fn show(source: &Source, class: &str, index: &str, iid: Option<Iid>) -> CliResult<Value> {
    let loaded = load(source)?;
    let index = loaded.registry.catalog(class)?.index(index)?;

    let data = match iid {
        Some(iid) => {
            let value = index.get_by_object(iid)?;
            json!({
                "index": index.name(),
                "codec": index.codec().as_str(),
                "iid": iid,
                "stored": index.stored_value(iid).map(|v| v.to_string()),
                "value": value.as_ref().map(|v| v.to_string()),
                "display": value.as_ref().and_then(|v| index.display(v)),
            })
        }
        None => {
            let entries: Vec<Value> = index
                .by_value()
                .iter()
                .map(|(key, ids)| json!({ "key": key.to_string(), "ids": ids }))
                .collect();
            json!({
                "index": index.name(),
                "codec": index.codec().as_str(),
                "values": index.value_count(),
                "objects": index.object_count(),
                "entries": entries,
            })
        }
    };
    Ok(data)
}
