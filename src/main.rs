//! MediaCat command-line client.
//!
//! ```text
//! mediacat [--config PATH] upload <FILE>...
//! mediacat [--config PATH] list [--page N] [--type all|image|video|audio]
//! mediacat [--config PATH] show <ASSET_ID>
//! mediacat [--config PATH] search text <QUERY>...
//! mediacat [--config PATH] search image <FILE>
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use mediacat::{
    FilePayload, LoadStatus, MediaCatConfig, MediaCatalog, SearchMode,
    TransferEvent, TransferStatus, TypeFilter,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: mediacat [--config PATH] <upload FILE... | list [--page N] [--type T] | show ID | search text QUERY... | search image FILE>";

/// How long `show` waits for its view record before exiting.
const HISTORY_FLUSH: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Upload(Vec<PathBuf>),
    List { page: u32, filter: TypeFilter },
    Show(String),
    SearchText(String),
    SearchImage(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cli {
    config: Option<PathBuf>,
    command: Command,
}

fn parse_args<I>(args: I) -> anyhow::Result<Cli>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut config = None;
    while args.peek().is_some_and(|a| a == "--config") {
        args.next();
        let path = args.next().ok_or_else(|| anyhow!("--config needs a path"))?;
        config = Some(PathBuf::from(path));
    }

    let verb = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let command = match verb.as_str() {
        "upload" => {
            let files: Vec<PathBuf> = args.map(PathBuf::from).collect();
            if files.is_empty() {
                bail!("upload needs at least one file");
            }
            Command::Upload(files)
        }
        "list" => {
            let mut page = 1;
            let mut filter = TypeFilter::All;
            while let Some(flag) = args.next() {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("{flag} needs a value"))?;
                match flag.as_str() {
                    "--page" => {
                        page = value
                            .parse()
                            .with_context(|| format!("invalid page `{value}`"))?;
                    }
                    "--type" => filter = value.parse()?,
                    other => bail!("unknown list option `{other}`"),
                }
            }
            Command::List { page, filter }
        }
        "show" => Command::Show(args.next().ok_or_else(|| anyhow!("show needs an asset id"))?),
        "search" => match args.next().as_deref() {
            Some("text") => {
                let query = args.collect::<Vec<_>>().join(" ");
                Command::SearchText(query)
            }
            Some("image") => Command::SearchImage(PathBuf::from(
                args.next().ok_or_else(|| anyhow!("search image needs a file"))?,
            )),
            _ => bail!("search mode must be `text` or `image`"),
        },
        other => bail!("unknown command `{other}`\n{USAGE}"),
    };
    Ok(Cli { config, command })
}

fn init_tracing(config: &MediaCatConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn read_payload(path: &Path) -> anyhow::Result<FilePayload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;
    Ok(FilePayload::new(name, bytes))
}

async fn upload(app: &mut MediaCatalog, paths: &[PathBuf]) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_payload(path).await?);
    }

    let queued = app.uploads.enqueue(files);
    for rejected in &queued.rejected {
        println!("skipped   {}: {}", rejected.file_name, rejected.error);
    }

    let names: HashMap<_, _> = app
        .uploads
        .items()
        .iter()
        .map(|item| (item.id(), item.file_name().to_string()))
        .collect();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<TransferEvent>();
    app.uploads.subscribe(Arc::new(tx));
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let name = names.get(&event.id).map(String::as_str).unwrap_or("?");
            match &event.status {
                TransferStatus::Uploading => println!("uploading {name}"),
                TransferStatus::Succeeded => println!("done      {name}"),
                TransferStatus::Failed(detail) => println!("failed    {name}: {detail}"),
                TransferStatus::Pending => {}
            }
        }
    });

    let summary = app.uploads.run_all().await;
    let rejected = queued.rejected.len();
    // Dropping the sender lets the printer drain and finish.
    app.uploads.unsubscribe_all();
    let _ = printer.await;

    println!(
        "{} of {} uploaded, {} failed, {} skipped",
        summary.succeeded, summary.total, summary.failed, rejected
    );
    if summary.failed > 0 || rejected > 0 {
        bail!("some files were not uploaded");
    }
    Ok(())
}

async fn list(app: &mut MediaCatalog, page: u32, filter: TypeFilter) -> anyhow::Result<()> {
    let _ = app.listing.set_type_filter(filter);
    app.goto_page(page).await;

    let view = app.listing.view();
    if let LoadStatus::Failed(detail) = &view.status {
        bail!("listing failed: {detail}");
    }
    println!(
        "page {}/{} ({} {} assets)",
        view.page, view.total_pages, view.total, view.filter
    );
    for asset in &view.items {
        println!("{:<38} {:<6} {}", asset.id, asset.media_type, asset.name);
    }
    Ok(())
}

async fn show(app: &MediaCatalog, id: &str) -> anyhow::Result<()> {
    let (asset, pending) = app.open_asset_tracked(id).await?;
    if let Some(pending) = pending {
        // A short-lived process would otherwise cancel the record on exit.
        let _ = tokio::time::timeout(HISTORY_FLUSH, pending).await;
    }
    println!("{}", serde_json::to_string_pretty(&asset)?);
    Ok(())
}

async fn search(app: &mut MediaCatalog, query: SearchInput) -> anyhow::Result<()> {
    match query {
        SearchInput::Text(text) => {
            app.search.set_mode(SearchMode::Text);
            app.search.set_text(text);
        }
        SearchInput::Image(path) => {
            app.search.set_mode(SearchMode::Image);
            app.search.select_image(read_payload(&path).await?)?;
        }
    }
    if !app.run_search().await {
        bail!("nothing to search for");
    }
    if let Some(detail) = app.search.last_error() {
        bail!("search failed: {detail}");
    }
    if app.search.results().is_empty() {
        println!("no results");
    }
    for hit in app.search.results() {
        let at = match (hit.frame_index, hit.timestamp_ms) {
            (Some(frame), _) => format!(" @frame {frame}"),
            (None, Some(ms)) => format!(" @{:.1}s", ms as f64 / 1000.0),
            (None, None) => String::new(),
        };
        println!(
            "{:.3}  {:<6} {}{}  ({})",
            hit.score, hit.asset.media_type, hit.asset.name, at, hit.asset.id
        );
    }
    Ok(())
}

enum SearchInput {
    Text(String),
    Image(PathBuf),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_args(std::env::args().skip(1))?;
    let config = MediaCatConfig::load(cli.config.as_deref())?;
    init_tracing(&config);

    let mut app = MediaCatalog::connect(&config)?;
    match cli.command {
        Command::Upload(paths) => upload(&mut app, &paths).await,
        Command::List { page, filter } => list(&mut app, page, filter).await,
        Command::Show(id) => show(&app, &id).await,
        Command::SearchText(query) => search(&mut app, SearchInput::Text(query)).await,
        Command::SearchImage(path) => search(&mut app, SearchInput::Image(path)).await,
    }
}
