//! Transform command implementation

use std::fs;
use std::path::{Path, PathBuf};

use hotcomp_compiler::ProcessCompiler;
use hotcomp_core::{CompiledArtifact, DevConfig, DevPipeline, FileStamps, RequestPath, Served};
use miette::{IntoDiagnostic, Result};
use tracing::{error, info};

use crate::cli::OutputFormat;
use crate::output::{RequestRecord, RequestStatus, output_report};

pub struct TransformArgs<'a> {
    pub files: &'a [String],
    pub compiler: &'a str,
    pub repeat: usize,
    pub root: Option<&'a Path>,
    pub out_dir: Option<&'a Path>,
    pub format: OutputFormat,
}

/// Serves every file `repeat` times. Returns true if any request failed.
pub fn run_transform(config: &DevConfig, args: TransformArgs<'_>) -> Result<bool> {
    let compiler = ProcessCompiler::from_command_line(args.compiler).into_diagnostic()?;
    let root = resolve_root(config, args.root);
    let stamps = FileStamps::new(&root);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    let pipeline = DevPipeline::new(config, compiler).into_diagnostic()?;
    info!("Serving {} file(s) from {}", args.files.len(), root.display());

    let mut records = Vec::with_capacity(args.files.len() * args.repeat);
    for round in 1..=args.repeat {
        for file in args.files {
            let path = RequestPath::new(file.as_str());
            let status = match runtime.block_on(pipeline.serve_file(&stamps, &path, false)) {
                Ok(served) => {
                    if let (Some(out_dir), Some(artifact)) = (args.out_dir, served.artifact()) {
                        write_artifact(out_dir, &path, artifact)?;
                    }
                    RequestStatus::from_served(&served)
                }
                // Errors are scoped to their request; the remaining files are still served.
                Err(e) => {
                    error!("{}", e);
                    RequestStatus::Failed(e.to_string())
                }
            };
            records.push(RequestRecord {
                path: path.to_string(),
                round,
                status,
            });
        }
    }

    let has_errors = records
        .iter()
        .any(|r| matches!(r.status, RequestStatus::Failed(_)));
    output_report(&records, &pipeline.cache_stats(), pipeline.cache_len(), args.format)?;

    Ok(has_errors)
}

fn resolve_root(config: &DevConfig, root: Option<&Path>) -> PathBuf {
    root.map(Path::to_path_buf)
        .or_else(|| config.base_dir.clone())
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn write_artifact(out_dir: &Path, path: &RequestPath, artifact: &CompiledArtifact) -> Result<()> {
    let target = out_dir.join(path.relative());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(&target, &artifact.code).into_diagnostic()?;

    if let Some(map) = &artifact.map {
        let mut map_path = target.into_os_string();
        map_path.push(".map");
        fs::write(map_path, map).into_diagnostic()?;
    }

    Ok(())
}

impl RequestStatus {
    fn from_served(served: &Served) -> Self {
        match served {
            Served::Passthrough(_) => RequestStatus::Passthrough,
            Served::Artifact {
                cache_hit: true, ..
            } => RequestStatus::Cached,
            Served::Artifact { artifact, .. } => RequestStatus::Compiled {
                warnings: artifact.warnings.clone(),
            },
        }
    }
}
