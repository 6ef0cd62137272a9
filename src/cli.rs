use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::formats::{Language, Theme};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Nav(NavArgs),
    Toc(TocArgs),
    Render(RenderArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Content API base URL (default: $DOCSITE_API_URL).
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct NavArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Language edition to group.
    #[arg(long, value_parser = Language::parse, default_value = "id")]
    pub lang: Language,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TocArgs {
    /// Markdown file to scan for headings.
    #[arg(long)]
    pub file: String,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Document slug (default: first document of the collection).
    #[arg(long)]
    pub slug: Option<String>,

    /// Language edition (default: saved preference, else `id`).
    #[arg(long, value_parser = Language::parse)]
    pub lang: Option<Language>,

    /// Theme (default: saved preference, else `dark`).
    #[arg(long, value_parser = Theme::parse)]
    pub theme: Option<Theme>,

    /// Preferences file to read defaults from (never written).
    #[arg(long)]
    pub prefs: Option<String>,

    /// Output HTML file (default: stdout).
    #[arg(long)]
    pub out: Option<String>,

    /// Brand shown in the top bar and sidebar.
    #[arg(long, default_value = "Docs")]
    pub brand: String,
}
