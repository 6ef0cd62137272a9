use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::cli::{NavArgs, OutputFormat, RenderArgs, TocArgs};
use crate::client::{ContentSource, HttpContentClient};
use crate::config::ApiConfig;
use crate::controller::{PageController, PageState};
use crate::nav::NavigationTree;
use crate::prefs::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, UserPreferences};
use crate::toc::extract_headings;
use crate::tracker::ActivePolicy;
use crate::view::{SiteChrome, doc_path, render_page};

pub async fn nav(args: NavArgs) -> anyhow::Result<()> {
    let config = ApiConfig::resolve(args.api.api_url.as_deref()).context("load api config")?;
    let client = HttpContentClient::new(&config)?;
    let records = client
        .fetch_collection(args.lang)
        .await
        .context("fetch documentation collection")?;

    let tree = NavigationTree::build(&records);
    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&tree).context("serialize nav json")?,
        OutputFormat::Yaml => serde_yaml::to_string(&tree).context("serialize nav yaml")?,
    };
    write_stdout(&rendered)
}

pub fn toc(args: TocArgs) -> anyhow::Result<()> {
    let path = PathBuf::from(&args.file);
    let body = std::fs::read_to_string(&path)
        .with_context(|| format!("read markdown: {}", path.display()))?;
    let headings = extract_headings(&body);
    let json = serde_json::to_string_pretty(&headings).context("serialize headings")?;
    write_stdout(&json)
}

pub async fn render(args: RenderArgs) -> anyhow::Result<()> {
    let config = ApiConfig::resolve(args.api.api_url.as_deref()).context("load api config")?;
    let client = HttpContentClient::new(&config)?;

    let mut prefs = match &args.prefs {
        Some(path) => FilePreferenceStore::new(path)
            .load()
            .await
            .context("load preferences")?,
        None => UserPreferences::default(),
    };
    if let Some(language) = args.lang {
        prefs.language = language;
    }
    if let Some(theme) = args.theme {
        prefs.theme = theme;
    }

    let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::with(prefs));
    let controller = PageController::start(Arc::new(client), store, ActivePolicy::default())
        .await
        .context("start page controller")?;
    controller.navigate(args.slug.as_deref()).await;

    let snapshot = controller.snapshot();
    if let PageState::Error { message } = &snapshot.state {
        anyhow::bail!("{message}");
    }

    let chrome = SiteChrome {
        brand: args.brand,
        ..SiteChrome::default()
    };
    let html = render_page(&snapshot, &chrome, &doc_path(args.slug.as_deref()));

    match &args.out {
        Some(out) => {
            let out_path = PathBuf::from(out);
            if let Some(parent) = out_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir: {}", parent.display()))?;
            }
            std::fs::write(&out_path, html)
                .with_context(|| format!("write html: {}", out_path.display()))?;
            tracing::info!(path = %out_path.display(), "wrote page");
            Ok(())
        }
        None => write_stdout(&html),
    }
}

fn write_stdout(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes()).context("write stdout")?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n").context("write stdout")?;
    }
    stdout.flush().context("flush stdout")
}
