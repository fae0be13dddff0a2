use clap::{Args as ClapArgs, Parser, Subcommand};
use reelmatch::export::{export_csv, similarity_percentage, to_json};
use reelmatch::{CatalogStats, Engine, EngineConfig, EngineHandle, Recommendations, RestApi};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Content-based show and movie recommendations
#[derive(Parser, Debug)]
#[command(name = "reelmatch")]
#[command(about = "Recommend similar shows and movies from a catalog", long_about = None)]
struct Args {
    /// Path to the catalog CSV
    #[arg(short, long, default_value = "./data/netflix_sample.csv")]
    catalog: PathBuf,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API
    Serve {
        /// HTTP API port
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Recommend items similar to a title
    Title {
        query: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Recommend items around one tag
    Tag {
        tag: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Recommend items around several tags
    Tags {
        #[arg(required = true)]
        tags: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List every tag in the catalog
    ListTags,
    /// Print catalog statistics
    Stats {
        /// Number of top tags to show
        #[arg(long, default_value_t = 12)]
        top: usize,
    },
}

#[derive(ClapArgs, Debug)]
struct OutputArgs {
    /// Number of recommendations
    #[arg(short, default_value_t = 10)]
    k: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Also write results to a CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    info!("Starting reelmatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);

    let handle = Arc::new(EngineHandle::open(&args.catalog, config)?);

    let engine = handle.current();
    match args.command {
        Command::Serve { port } => {
            drop(engine);
            serve(handle, port).await
        }
        Command::Title { query, output } => {
            let recs = engine.recommend_by_title(&query, output.k)?;
            print_results(&engine, &recs, &output)
        }
        Command::Tag { tag, output } => {
            let recs = engine.recommend_by_tag(&tag, output.k)?;
            print_results(&engine, &recs, &output)
        }
        Command::Tags { tags, output } => {
            let recs = engine.recommend_by_tags(tags.as_slice(), output.k)?;
            print_results(&engine, &recs, &output)
        }
        Command::ListTags => {
            for tag in engine.all_tags() {
                println!("{tag}");
            }
            Ok(())
        }
        Command::Stats { top } => {
            let stats = CatalogStats::compute(engine.items(), top);
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

async fn serve(handle: Arc<EngineHandle>, port: u16) -> anyhow::Result<()> {
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(handle, port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn print_results(engine: &Engine, recs: &Recommendations, output: &OutputArgs) -> anyhow::Result<()> {
    if let Some(path) = &output.export {
        export_csv(&recs.results, path)?;
        info!("Exported {} results to {:?}", recs.len(), path);
    }

    if output.json {
        println!("{}", to_json(&recs.results)?);
        return Ok(());
    }

    let seeds: Vec<&str> = recs
        .seeds
        .iter()
        .filter_map(|&id| engine.item(id).map(|item| item.title.as_str()))
        .collect();
    match seeds.as_slice() {
        [one] => println!("Because you liked {one}:"),
        many => println!("Based on {} matching titles:", many.len()),
    }

    if recs.is_empty() {
        println!("  (no other items in the catalog)");
    }
    for (rank, rec) in recs.results.iter().enumerate() {
        println!(
            "{:>3}. {} [{}, {}] {} match  ({})",
            rank + 1,
            rec.title,
            rec.kind,
            rec.release_year,
            similarity_percentage(rec.similarity_score),
            rec.tags
        );
    }
    Ok(())
}
