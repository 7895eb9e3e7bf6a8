use std::{io::IsTerminal, path::PathBuf};

use clap::{ColorChoice, Parser};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use reconcile_annotations::ProofreadConfig;

/// Check a plain text file for spelling and grammar issues and print them
/// as JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Plain text file with one paragraph per blank-line separated block
    #[arg(index = 1)]
    pub input_path: PathBuf,

    /// YAML configuration file, command line options take precedence
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// LanguageTool compatible endpoint, e.g. https://api.languagetool.org/v2/check
    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(long)]
    pub language: Option<String>,

    /// Hide the issues ignored for this document
    #[arg(long)]
    pub document_id: Option<String>,

    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Colorize log output
    #[arg(
        long,
        value_name = "WHEN",
        default_value_t = ColorChoice::Auto,
        default_missing_value = "always",
        value_enum
    )]
    pub color: ColorChoice,
}

impl Args {
    pub fn use_colors(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
            }
        }
    }

    pub fn apply_to(&self, config: &mut ProofreadConfig) {
        if let Some(api_url) = &self.api_url {
            config.api_url = Some(api_url.clone());
        }

        if let Some(language) = &self.language {
            config.language.clone_from(language);
        }

        if let Some(document_id) = &self.document_id {
            config.document_id = Some(document_id.clone());
        }
    }
}
