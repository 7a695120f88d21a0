use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cpt_service::{AgentConfig, CatalogConfig, DEFAULT_CATALOG_PATH};

#[derive(Parser, Debug)]
#[command(name = "cpt-agent")]
#[command(about = "ENT CPT code search and coding rule analysis", long_about = None)]
pub struct Args {
    /// CPT catalog table (CSV or TSV).
    #[arg(long, env = "CPT_CATALOG_PATH", default_value = DEFAULT_CATALOG_PATH)]
    pub catalog: PathBuf,

    /// JSON synonym table merged over the built-in keyword expansions.
    #[arg(long, env = "CPT_SYNONYMS_PATH")]
    pub synonyms: Option<PathBuf>,

    /// Field delimiter of the catalog table.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Default number of search results.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for candidate codes.
    Search(SearchArgs),
    /// Apply coding rules to a procedure description.
    Analyze(AnalyzeArgs),
    /// Check whether a code exists.
    Validate { code: String },
    /// Show a code's catalog entry.
    Details { code: String },
    /// List the codes in a category.
    Category { name: String },
    /// Show coding tips for a code.
    Tips {
        code: String,
        /// Procedure description the code applies to.
        #[arg(long, default_value = "")]
        procedure: String,
    },
    /// List the coding rules.
    Rules,
    /// Summarize the loaded catalog.
    Health,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-text query.
    pub query: String,

    /// Maximum number of results (0 uses --limit).
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Procedure description.
    pub procedure: String,

    /// Candidate codes, comma-separated. Searched from the description when omitted.
    #[arg(long, value_delimiter = ',')]
    pub codes: Option<Vec<String>>,
}

impl Args {
    /// Builds the agent configuration from global options.
    pub fn agent_config(&self) -> Result<AgentConfig, String> {
        let delimiter = u8::try_from(self.delimiter)
            .map_err(|_| format!("Delimiter must be a single-byte character: {:?}", self.delimiter))?;

        Ok(AgentConfig {
            catalog_path: self.catalog.clone(),
            synonyms_path: self.synonyms.clone(),
            catalog: CatalogConfig {
                delimiter,
                ..CatalogConfig::default()
            },
            default_limit: self.limit,
            ..AgentConfig::default()
        })
    }
}
