use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lakehouse_utils::audit::{JobConfig, PipelineRunContext};
use lakehouse_utils::delta::TableWriter;
use lakehouse_utils::ingestion::{
    create_preview_views, list_lakehouse_files, raw_view_name, summary_view_name,
    AnalyticSession, FileFormat, ReadOptions, DEFAULT_FILES_FOLDER,
};
use lakehouse_utils::observability::init_tracing;
use lakehouse_utils::platform::{LocalFileSystem, StaticTokenProvider};
use lakehouse_utils::{
    get_metadata, IngestionPipeline, LakehouseConfig, StorageTarget, TableAddress,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "lakehouse-utils")]
#[command(about = "Lakehouse ingestion helpers: paths, discovery, preview and Delta loads")]
struct Args {
    /// Where table writes land: onelake or mounted (overrides LAKEHOUSE_TARGET)
    #[arg(long, global = true)]
    target: Option<StorageTarget>,

    /// Mounted lakehouse root (overrides LAKEHOUSE_MOUNT_ROOT)
    #[arg(long, global = true)]
    mount_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one execution-context property (workspace, lakehouse, user, notebook, header, footer)
    Metadata { property: String },

    /// Print the storage and mounted paths of a table
    Paths { schema: String, table: String },

    /// List CSV/XLSX files in a lakehouse folder
    List {
        #[arg(short, long, default_value = DEFAULT_FILES_FOLDER)]
        folder: String,

        /// Only names containing this text
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Load a file into raw/summary views and print them
    Preview {
        path: String,

        /// csv or xlsx; taken from the extension when absent
        #[arg(short, long)]
        format: Option<FileFormat>,

        #[arg(long)]
        sheet: Option<String>,

        #[arg(long)]
        all_text: bool,

        #[arg(long)]
        normalize_names: bool,

        /// Rows of the raw view to show
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,
    },

    /// Run an ingestion job described by a JSON file of string keys
    Ingest { job: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let mut config = LakehouseConfig::from_env().context("loading LAKEHOUSE_* configuration")?;
    if let Some(target) = args.target {
        config.target = target;
    }
    if let Some(root) = args.mount_root {
        config.mount_root = root;
    }

    match args.command {
        Command::Metadata { property } => {
            println!("{}", get_metadata(&config.context, &property)?);
        }
        Command::Paths { schema, table } => {
            let resolver = config.resolver();
            let address = TableAddress::new(schema, table);
            println!("table:    {}", address);
            println!("storage:  {}", resolver.storage_path(&address));
            println!("mounted:  {}", resolver.mounted_path(&address));
            println!("writes:   {}", resolver.resolve(&address));
        }
        Command::List { folder, pattern } => {
            let fs = LocalFileSystem::new();
            for path in list_lakehouse_files(&fs, &folder, pattern.as_deref())? {
                println!("{}", path);
            }
        }
        Command::Preview {
            path,
            format,
            sheet,
            all_text,
            normalize_names,
            rows,
        } => {
            let format = match format {
                Some(format) => format,
                None => FileFormat::from_path(&path)?,
            };
            let options = ReadOptions {
                all_text,
                normalize_names,
                sheet,
            };

            let mut session = AnalyticSession::new();
            let message = create_preview_views(&mut session, format, &path, &options)?;
            info!("{}", message);

            let raw = session.sql(&format!("SELECT * FROM {} LIMIT {}", raw_view_name(format), rows))?;
            let summary = session.sql(&format!("SELECT * FROM {}", summary_view_name(format)))?;
            println!("{}", raw);
            println!("{}", summary);
        }
        Command::Ingest { job } => {
            let json = std::fs::read_to_string(&job)
                .with_context(|| format!("reading job file {}", job.display()))?;
            let job = JobConfig::from_json(&json)?;

            // Mounted writes need no bearer token, but the writer still asks for one
            let token = config.storage_token.clone().or_else(|| {
                (config.target == StorageTarget::Mounted).then(String::new)
            });
            let credentials = Arc::new(StaticTokenProvider::new(token));
            let writer = Arc::new(TableWriter::new(config.resolver(), credentials));
            let pipeline = IngestionPipeline::new(Arc::new(LocalFileSystem::new()), writer);

            let run = PipelineRunContext::manual(&config.context);
            let reports = pipeline.run(&job, &run).await?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    Ok(())
}
