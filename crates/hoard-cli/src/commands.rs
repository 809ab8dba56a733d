use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use hoard_client::{ClientResult, PutResult, UploadConfig, Uploader};
use hoard_crypto::{DigestRegistry, SigningKey};
use hoard_schema::Ed25519Signer;
use hoard_server::{HoardServer, ServerConfig};
use hoard_store::{BlobStore, DiskBlobStore};
use hoard_types::BlobRef;
use tracing::{debug, info, warn};

use crate::cli::*;
use crate::config::ClientConfig;

/// How a command finished when it did not fail outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// At least one item failed; the rest were still processed.
    ItemsFailed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::ItemsFailed => ExitCode::from(2),
        }
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<Outcome> {
    let config = ClientConfig::load(&cli.config)?;
    let verbose = cli.verbose;
    match cli.command {
        Command::Init(args) => cmd_init(&cli.config, config, args).await,
        Command::Blob(args) => cmd_blob(&config, args, verbose).await,
        Command::File(args) => cmd_file(&config, args, verbose).await,
        Command::Permanode => cmd_permanode(&config, verbose).await,
        Command::Share(args) => cmd_share(&config, args, verbose).await,
        Command::Serve(args) => cmd_serve(args).await,
    }
}

fn open_store(config: &ClientConfig) -> Arc<dyn BlobStore> {
    Arc::new(DiskBlobStore::with_scheme(
        config.blob_root.clone(),
        DigestRegistry::standard(),
        config.hash_scheme.clone(),
    ))
}

fn uploader(config: &ClientConfig) -> Uploader {
    Uploader::new(
        open_store(config),
        UploadConfig {
            parallelism: config.parallelism,
        },
    )
}

/// Uploader that can sign. The public-key blob is re-stored so the signer
/// ref always resolves in the local store.
async fn signing_uploader(config: &ClientConfig) -> anyhow::Result<Uploader> {
    let text = std::fs::read_to_string(&config.secret_key_path).with_context(|| {
        format!(
            "reading key file {} (run `hoard init` first)",
            config.secret_key_path.display()
        )
    })?;
    let key = SigningKey::from_hex(&text).context("decoding key file")?;
    let signer = Ed25519Signer::new(key);
    let uploader = uploader(config);
    let signer_ref = uploader
        .upload_bytes(signer.public_key_blob()?.into())
        .await?
        .blob;
    if let Some(configured) = &config.public_key {
        if configured != &signer_ref {
            warn!(%configured, actual = %signer_ref, "configured public key does not match key file");
        }
    }
    Ok(uploader.with_signer(signer_ref, Arc::new(signer)))
}

fn print_put(put: &PutResult, verbose: bool) {
    if verbose {
        println!("{} {}", put.blob.to_string().yellow(), put.size);
    } else {
        println!("{}", put.blob.to_string().yellow());
    }
}

/// Print each successful item; report failures and keep going.
fn report(label: &str, result: ClientResult<PutResult>, verbose: bool) -> bool {
    match result {
        Ok(put) => {
            print_put(&put, verbose);
            true
        }
        Err(e) => {
            eprintln!("{} {label}: {e}", "error:".red().bold());
            false
        }
    }
}

fn outcome(all_ok: bool) -> Outcome {
    if all_ok {
        Outcome::Success
    } else {
        Outcome::ItemsFailed
    }
}

async fn cmd_init(
    config_path: &Path,
    mut config: ClientConfig,
    args: InitArgs,
) -> anyhow::Result<Outcome> {
    if config.secret_key_path.exists() && !args.force {
        bail!(
            "key file {} already exists (use --force to replace it)",
            config.secret_key_path.display()
        );
    }
    let key = SigningKey::generate();
    write_key_file(&config.secret_key_path, &key)?;

    let signer = Ed25519Signer::new(key);
    let put = uploader(&config)
        .upload_bytes(signer.public_key_blob()?.into())
        .await?;
    config.public_key = Some(put.blob.clone());
    config.save(config_path)?;

    info!(public_key = %put.blob, config = %config_path.display(), "initialized");
    println!(
        "{} Initialized Hoard client in {}",
        "✓".green().bold(),
        config_path.display().to_string().bold()
    );
    println!("  Public key: {}", put.blob.to_string().cyan());
    Ok(Outcome::Success)
}

fn write_key_file(path: &Path, key: &SigningKey) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{}\n", key.to_hex()))
        .with_context(|| format!("writing key file {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

async fn cmd_blob(config: &ClientConfig, args: PathsArgs, verbose: bool) -> anyhow::Result<Outcome> {
    let uploader = uploader(config);
    let mut all_ok = true;
    for path in &args.paths {
        debug!(path = %path.display(), "uploading blob");
        let result = uploader.upload_blob_file(path).await;
        all_ok &= report(&path.display().to_string(), result, verbose);
    }
    Ok(outcome(all_ok))
}

async fn cmd_file(config: &ClientConfig, args: PathsArgs, verbose: bool) -> anyhow::Result<Outcome> {
    let uploader = uploader(config);
    let mut all_ok = true;
    for path in &args.paths {
        debug!(path = %path.display(), "uploading file tree");
        let result = uploader.upload_path(path).await;
        all_ok &= report(&path.display().to_string(), result, verbose);
    }
    Ok(outcome(all_ok))
}

async fn cmd_permanode(config: &ClientConfig, verbose: bool) -> anyhow::Result<Outcome> {
    let uploader = signing_uploader(config).await?;
    let result = uploader.upload_permanode().await;
    Ok(outcome(report("permanode", result, verbose)))
}

async fn cmd_share(config: &ClientConfig, args: ShareArgs, verbose: bool) -> anyhow::Result<Outcome> {
    let target = BlobRef::parse(&args.target)
        .with_context(|| format!("invalid blobref {:?}", args.target))?;
    let uploader = signing_uploader(config).await?;
    let result = uploader.upload_share(&target, args.transitive).await;
    Ok(outcome(report("share", result, verbose)))
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<Outcome> {
    let mut config = match &args.server_config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading server config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    println!(
        "Hoard server on {} (root: {})",
        config.bind_addr.to_string().bold(),
        config.blob_root.display()
    );
    HoardServer::new(config).serve().await?;
    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use hoard_schema::Schema;
    use hoard_store::BlobFetcher;
    use std::path::PathBuf;

    struct Env {
        dir: tempfile::TempDir,
        config_path: PathBuf,
    }

    impl Env {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config_path = dir.path().join("hoard.toml");
            let config = ClientConfig {
                blob_root: dir.path().join("blobs"),
                secret_key_path: dir.path().join("hoard.key"),
                ..ClientConfig::default()
            };
            config.save(&config_path).unwrap();
            Self { dir, config_path }
        }

        async fn run(&self, args: &[&str]) -> anyhow::Result<Outcome> {
            let mut argv = vec!["hoard", "--config", self.config_path.to_str().unwrap()];
            argv.extend_from_slice(args);
            run_command(Cli::try_parse_from(argv).unwrap()).await
        }

        fn config(&self) -> ClientConfig {
            ClientConfig::load(&self.config_path).unwrap()
        }
    }

    #[tokio::test]
    async fn init_writes_key_and_public_key_blob() {
        let env = Env::new();
        assert_eq!(env.run(&["init"]).await.unwrap(), Outcome::Success);

        let config = env.config();
        let public_key = config.public_key.clone().unwrap();
        assert!(config.secret_key_path.exists());

        let store = open_store(&config);
        let fetched = store.fetch(&public_key).await.unwrap();
        let bytes = fetched.read_limited(1 << 16).await.unwrap();
        assert!(matches!(Schema::parse(&bytes).unwrap(), Schema::PublicKey(_)));
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite_key() {
        let env = Env::new();
        env.run(&["init"]).await.unwrap();
        assert!(env.run(&["init"]).await.is_err());
        assert!(env.run(&["init", "--force"]).await.is_ok());
    }

    #[tokio::test]
    async fn missing_blob_path_exits_with_two() {
        let env = Env::new();
        let file = env.dir.path().join("present.txt");
        std::fs::write(&file, b"hello").unwrap();
        let missing = env.dir.path().join("missing.txt");

        let status = env
            .run(&["blob", file.to_str().unwrap(), missing.to_str().unwrap()])
            .await
            .unwrap();
        assert_eq!(status, Outcome::ItemsFailed);

        // The present file was still stored.
        let config = env.config();
        let blob = DigestRegistry::standard()
            .digest_bytes("sha1", b"hello")
            .unwrap();
        assert!(open_store(&config).exists(&blob).await.unwrap());
    }

    #[tokio::test]
    async fn file_uploads_directory() {
        let env = Env::new();
        let tree = env.dir.path().join("tree");
        std::fs::create_dir(&tree).unwrap();
        std::fs::write(tree.join("a.txt"), b"a").unwrap();
        let status = env.run(&["file", tree.to_str().unwrap()]).await.unwrap();
        assert_eq!(status, Outcome::Success);
    }

    #[tokio::test]
    async fn permanode_requires_init() {
        let env = Env::new();
        assert!(env.run(&["permanode"]).await.is_err());
        env.run(&["init"]).await.unwrap();
        assert_eq!(env.run(&["permanode"]).await.unwrap(), Outcome::Success);
    }

    #[tokio::test]
    async fn share_rejects_bad_target() {
        let env = Env::new();
        env.run(&["init"]).await.unwrap();
        assert!(env.run(&["share", "not-a-ref"]).await.is_err());
        let status = env
            .run(&["share", "sha1-0123456789abcdef0123456789abcdef01234567"])
            .await
            .unwrap();
        assert_eq!(status, Outcome::Success);
    }
}
