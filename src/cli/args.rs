//! CLI argument definitions using clap
//!
//! Commands:
//! - appy-catalog stats --config <path> --objects <path>
//! - appy-catalog search --class <name> [--where field=expr]... [--sort <index>]
//! - appy-catalog recompute --class <name> [--index <name>]
//! - appy-catalog show --class <name> --index <name> [--iid <id>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Appy catalog - indexes, searches and sorts stored objects
#[derive(Parser, Debug)]
#[command(name = "appy-catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where to find the configuration and the stored objects
#[derive(Args, Debug, Clone)]
pub struct Source {
    /// Path to configuration file
    #[arg(long, default_value = "./catalog.json")]
    pub config: PathBuf,

    /// Path to the JSON-lines object dump
    #[arg(long, default_value = "./objects.jsonl")]
    pub objects: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index every object and print catalog sizes
    Stats {
        #[command(flatten)]
        source: Source,
    },

    /// Search a catalog, optionally sorting the result
    Search {
        #[command(flatten)]
        source: Source,

        /// Catalog (class name) to search
        #[arg(long)]
        class: String,

        /// Criterion `field=expr`, applied in the order given
        #[arg(long = "where", value_name = "FIELD=EXPR")]
        criteria: Vec<String>,

        /// Index to sort on
        #[arg(long)]
        sort: Option<String>,

        /// Sort in descending order
        #[arg(long)]
        reverse: bool,

        /// Page number, starting at 0
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Ids per page
        #[arg(long, default_value_t = 50)]
        page_size: usize,
    },

    /// Rebuild indexes from the object dump and report the changes
    Recompute {
        #[command(flatten)]
        source: Source,

        #[arg(long)]
        class: String,

        /// Index to rebuild; every index of the catalog when absent
        #[arg(long)]
        index: Option<String>,
    },

    /// Print the content of one index, or one object's entry in it
    Show {
        #[command(flatten)]
        source: Source,

        #[arg(long)]
        class: String,

        #[arg(long)]
        index: String,

        #[arg(long)]
        iid: Option<u64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "appy-catalog",
            "search",
            "--class",
            "Person",
            "--where",
            "age=30..40",
            "--where",
            "name=bob",
            "--sort",
            "name",
            "--reverse",
        ])
        .unwrap();

        match cli.command {
            Command::Search {
                source,
                class,
                criteria,
                sort,
                reverse,
                page,
                page_size,
            } => {
                assert_eq!(source.config, PathBuf::from("./catalog.json"));
                assert_eq!(class, "Person");
                assert_eq!(criteria, vec!["age=30..40", "name=bob"]);
                assert_eq!(sort.as_deref(), Some("name"));
                assert!(reverse);
                assert_eq!(page, 0);
                assert_eq!(page_size, 50);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_show_requires_index() {
        assert!(Cli::try_parse_from(["appy-catalog", "show", "--class", "Person"]).is_err());
    }
}
