use crate::config::toml_config::{AppConfig, LogFormat};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Parser)]
#[command(name = "simple-cards")]
#[command(about = "Import flashcard modules from Quizlet or CSV files")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory where modules are stored")]
    pub data_dir: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import a CSV file (`term,meaning` per row) as a new module
    ImportCsv {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        name: String,
        file: PathBuf,
    },
    /// Import a public Quizlet set as a new module
    ImportQuizlet {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        name: String,
        module_id: String,
    },
    /// Fetch a Quizlet set and print its cards without storing them
    ParseQuizlet { module_id: String },
    /// List the modules of a user
    List {
        #[arg(long)]
        user: Uuid,
    },
    /// Print a module with its cards
    Show {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        module: Uuid,
    },
}

impl CliConfig {
    /// 命令列參數覆寫設定檔的值
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(data_dir) = &self.data_dir {
            validation::validate_non_empty_string("data_dir", data_dir)?;
        }

        match &self.command {
            Command::ImportCsv { name, .. } => validation::validate_module_name("name", name),
            Command::ImportQuizlet {
                name, module_id, ..
            } => {
                validation::validate_module_name("name", name)?;
                validation::validate_non_empty_string("module_id", module_id)
            }
            Command::ParseQuizlet { module_id } => {
                validation::validate_non_empty_string("module_id", module_id)
            }
            Command::List { .. } | Command::Show { .. } => Ok(()),
        }
    }
}
