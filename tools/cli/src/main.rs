//! SealLink CLI - Inspect policies and exercise the encryption engine.
//!
//! Stores are in-memory, so each invocation is a self-contained run:
//! useful for checking policy parameters, integrity roots, and the
//! share-link gates without standing up a service.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use chrono::{Duration, Utc};
use seallink_common::{Classification, SensitivityLevel};
use seallink_engine::{
    AttemptTracker, CreateShareRequest, EncryptionPipeline, EngineConfig, PolicyResolver,
    ShareService,
};
use seallink_integrity::MerkleTree;
use seallink_storage::{MemoryDataStore, MemoryPolicyStore, MemoryShareStore};

#[derive(Parser)]
#[command(name = "seallink")]
#[command(about = "SealLink - Policy-driven encryption and sharing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the encryption policy for every sensitivity tier.
    Policies,

    /// Encrypt a file under a tier's policy, then decrypt and verify it.
    Roundtrip {
        /// Input file.
        #[arg(short, long)]
        file: PathBuf,

        /// Sensitivity tier: public, internal, confidential, or
        /// highly_sensitive.
        #[arg(short, long, default_value = "internal")]
        level: String,
    },

    /// Compute the Merkle root and chunk layout of a file.
    Merkle {
        /// Input file.
        #[arg(short, long)]
        file: PathBuf,

        /// Chunk size in bytes.
        #[arg(short, long, default_value_t = 4096)]
        chunk_size: usize,
    },

    /// Create a share link for a file and open it through the gates.
    Share {
        /// Input file.
        #[arg(short, long)]
        file: PathBuf,

        /// Protect the share with a password.
        #[arg(short, long)]
        password: Option<String>,

        /// Maximum number of downloads.
        #[arg(short, long)]
        max_downloads: Option<u32>,

        /// Expire the share after this many hours.
        #[arg(short, long)]
        expires_hours: Option<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Policies => cmd_policies(),
        Commands::Roundtrip { file, level } => cmd_roundtrip(&file, &level),
        Commands::Merkle { file, chunk_size } => cmd_merkle(&file, chunk_size),
        Commands::Share {
            file,
            password,
            max_downloads,
            expires_hours,
        } => cmd_share(&file, password, max_downloads, expires_hours),
    }
}

fn seeded_resolver() -> Result<PolicyResolver> {
    let resolver = PolicyResolver::new(Arc::new(MemoryPolicyStore::new()));
    resolver.seed_defaults().context("Failed to seed policies")?;
    Ok(resolver)
}

fn cmd_policies() -> Result<()> {
    let resolver = seeded_resolver()?;

    for policy in resolver.list().context("Failed to list policies")? {
        println!("{}:", policy.sensitivity_level);
        println!("  algorithm:  {}", resolver.algorithm_for(&policy));
        println!("  hash:       {}", policy.hash_algorithm);
        println!("  signature:  {}", policy.signature_required);
        println!("  mfa:        {:?}", policy.mfa_requirement);
        println!("  {}", policy.description);
    }
    Ok(())
}

fn cmd_roundtrip(file: &PathBuf, level: &str) -> Result<()> {
    let level: SensitivityLevel = level.parse().context("Invalid sensitivity level")?;
    let content = std::fs::read(file).context("Failed to read input file")?;

    let config = EngineConfig::default();
    let pipeline = EncryptionPipeline::new(
        seeded_resolver()?,
        Arc::new(MemoryDataStore::new()),
        &config,
    )
    .context("Failed to build pipeline")?;

    let record = pipeline
        .encrypt(&content, Classification::new(level, None))
        .context("Encryption failed")?;
    println!("Encrypted {} bytes", content.len());
    println!("  record:     {}", record.id);
    println!("  algorithm:  {}", record.algorithm);
    println!("  hash:       {}", record.content_hash);
    if let Some(root) = &record.merkle_root {
        println!("  merkle:     {root}");
    }

    let out = pipeline.decrypt(&record.id).context("Decryption failed")?;
    println!("Decrypted {} bytes", out.plaintext.len());
    println!("  hash verified:      {}", out.hash_verified);
    if let Some(ok) = out.signature_verified {
        println!("  signature verified: {ok}");
    }
    if let Some(ok) = out.merkle_verified {
        println!("  merkle verified:    {ok}");
    }

    if !out.fully_verified() {
        anyhow::bail!("Verification failed");
    }
    Ok(())
}

fn cmd_merkle(file: &PathBuf, chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        anyhow::bail!("Chunk size must be nonzero");
    }
    let content = std::fs::read(file).context("Failed to read input file")?;
    let tree = MerkleTree::new(&content, chunk_size);

    println!("{}", file.display());
    println!("  size:    {} bytes", tree.total_size());
    println!("  chunks:  {} x {} bytes", tree.chunk_count(), chunk_size);
    println!("  height:  {}", tree.height());
    println!("  root:    {}", tree.root());
    Ok(())
}

fn cmd_share(
    file: &PathBuf,
    password: Option<String>,
    max_downloads: Option<u32>,
    expires_hours: Option<i64>,
) -> Result<()> {
    let content = std::fs::read(file).context("Failed to read input file")?;

    let config = EngineConfig::default();
    let service = ShareService::new(
        Arc::new(MemoryDataStore::new()),
        Arc::new(MemoryShareStore::new()),
        &config,
    )
    .with_tracker(Arc::new(AttemptTracker::from_config(&config)));

    let attempt = password.clone();
    let share = service
        .create_share(
            &content,
            CreateShareRequest {
                filename: file
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned()),
                content_type: None,
                password,
                max_downloads,
                expires_at: expires_hours.map(|h| Utc::now() + Duration::hours(h)),
            },
        )
        .context("Failed to create share")?;

    println!("Share created");
    println!("  token:      {}", share.token);
    let meta = service.metadata(&share.token).context("Failed to read metadata")?;
    println!("  state:      {}", serde_json::to_string(&meta.state)?);
    println!("  password:   {}", meta.has_password);
    if let Some(at) = meta.expires_at {
        println!("  expires:    {at}");
    }

    let out = service
        .open_share(&share.token, attempt.as_deref())
        .context("Failed to open share")?;
    println!("Opened share: {} bytes", out.plaintext.len());
    println!("  hash verified:   {}", out.hash_verified);
    println!("  merkle verified: {}", out.merkle_verified);
    println!("  downloads:       {}", out.download_count);
    if let Some(remaining) = out.remaining_downloads {
        println!("  remaining:       {remaining}");
    }
    Ok(())
}
