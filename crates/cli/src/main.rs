use anyhow::Context;
use cenad_files::{
    parse_category, paths, Category, FilesService, FolderKey, IncomingFile, StorageConfig,
};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cenad-files")]
#[command(about = "CENAD file storage operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Identifies a category folder.
#[derive(Args, Debug)]
struct FolderArgs {
    /// Category: crest, resource-docs, request-docs, cartography, regulations, facility-info
    #[arg(value_parser = parse_category)]
    category: Category,
    /// Tenant id
    tenant: String,
    /// Resource or request id (resource-docs and request-docs only)
    #[arg(long)]
    resource: Option<String>,
}

impl FolderArgs {
    fn key(&self) -> cenad_files::FilesResult<FolderKey> {
        FolderKey::parse(self.category, &self.tenant, self.resource.as_deref())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the folder (or file) path an identifier resolves to
    Path {
        #[command(flatten)]
        folder: FolderArgs,
        /// File name inside the folder
        #[arg(long)]
        name: Option<String>,
    },
    /// Store local files in a category folder
    Put {
        #[command(flatten)]
        folder: FolderArgs,
        /// Local files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Stored name, when uploading a single file
        #[arg(long)]
        name: Option<String>,
    },
    /// Copy a stored file to a local path, or to stdout
    Get {
        #[command(flatten)]
        folder: FolderArgs,
        /// Stored file name
        name: String,
        /// Destination path
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// List a category folder
    List {
        #[command(flatten)]
        folder: FolderArgs,
        /// Show size, modification time and media type
        #[arg(long, short)]
        long: bool,
    },
    /// Delete one stored file
    Rm {
        #[command(flatten)]
        folder: FolderArgs,
        /// Stored file name
        name: String,
    },
    /// Delete a category folder and everything in it
    RmFolder {
        #[command(flatten)]
        folder: FolderArgs,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Delete every file belonging to a tenant
    RmTenant {
        /// Tenant id
        tenant: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = StorageConfig::from_lookup(|key| std::env::var(key).ok())?;
    tracing::debug!(root = %cfg.root().display(), "resolved storage config");
    let service = FilesService::new(Arc::new(cfg));

    let stdout = std::io::stdout();
    run(cli.command, &service, &mut stdout.lock())
}

fn run(command: Commands, service: &FilesService, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Path { folder, name } => {
            let key = folder.key()?;
            let path = match name {
                Some(name) => {
                    let name = paths::parse_file_name(&name)?;
                    paths::file_path(service.config(), &key, &name)
                }
                None => service.resolve(&key),
            };
            writeln!(out, "{}", path.display())?;
        }
        Commands::Put {
            folder,
            files,
            name,
        } => {
            let key = folder.key()?;
            if name.is_some() && files.len() != 1 {
                anyhow::bail!("--name can only be used with a single file");
            }

            let mut incoming = Vec::with_capacity(files.len());
            for path in &files {
                let bytes =
                    std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                let file_name = match &name {
                    Some(name) => name.clone(),
                    None => path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .with_context(|| format!("{} has no usable file name", path.display()))?
                        .to_owned(),
                };
                incoming.push(IncomingFile { file_name, bytes });
            }

            let mut failures = 0;
            for outcome in service.save_many(&key, &incoming)? {
                match outcome.result {
                    Ok(stored) => writeln!(out, "saved {stored}")?,
                    Err(e) => {
                        tracing::warn!(file = %outcome.file_name, "put failed: {e}");
                        failures += 1;
                        writeln!(out, "failed {}: {e}", outcome.file_name)?;
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} of {} files failed", incoming.len());
            }
        }
        Commands::Get {
            folder,
            name,
            out: destination,
        } => {
            let key = folder.key()?;
            let bytes = service.read(&key, &name)?;
            match destination {
                Some(path) => std::fs::write(&path, &bytes)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => out.write_all(&bytes)?,
            }
        }
        Commands::List { folder, long } => {
            let key = folder.key()?;
            if long {
                for file in service.list_metadata(&key)? {
                    let modified = file
                        .modified_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".into());
                    writeln!(
                        out,
                        "{:>12}  {}  {:<24}  {}",
                        file.size_bytes,
                        modified,
                        file.media_type.as_deref().unwrap_or("-"),
                        file.file_name
                    )?;
                }
            } else {
                for entry in service.list(&key)? {
                    writeln!(out, "{}", entry?.display())?;
                }
            }
        }
        Commands::Rm { folder, name } => {
            let key = folder.key()?;
            let deleted = service.delete_one(&key, &name)?;
            writeln!(out, "deleted {deleted}")?;
        }
        Commands::RmFolder { folder, yes } => {
            let key = folder.key()?;
            if !yes {
                anyhow::bail!(
                    "refusing to delete {} without --yes",
                    service.resolve(&key).display()
                );
            }
            tracing::info!(folder = %key, "operator removing category folder");
            writeln!(out, "{}", service.delete_category_folder(&key)?)?;
        }
        Commands::RmTenant { tenant, yes } => {
            let tenant = paths::parse_tenant(&tenant)?;
            if !yes {
                anyhow::bail!(
                    "refusing to delete {} without --yes",
                    paths::tenant_dir(service.config(), &tenant).display()
                );
            }
            tracing::info!(tenant = %tenant, "operator removing tenant");
            writeln!(out, "{}", service.delete_tenant(&tenant)?)?;
        }
    }
    Ok(())
}
