#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hotcomp_core::{CompileError, CompileOptions, CompiledArtifact, Compiler, DevConfig};

/// Source containing this marker fails to compile.
pub const BROKEN: &str = "<<broken>>";

/// Upper-cases its input and counts how often it ran.
#[derive(Default)]
pub struct CountingCompiler {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingCompiler {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Compiler for CountingCompiler {
    fn name(&self) -> &str {
        "counting"
    }

    async fn compile(
        &self,
        path: &str,
        source: &str,
        _options: &CompileOptions,
    ) -> Result<CompiledArtifact, CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if source.contains(BROKEN) {
            return Err(CompileError::failed(path, "unexpected token"));
        }
        Ok(CompiledArtifact::new(source.to_uppercase(), source))
    }
}

/// Builds its artifact from a line-ending-normalised copy of the source.
#[derive(Default)]
pub struct NormalizingCompiler {
    calls: AtomicUsize,
}

impl NormalizingCompiler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Compiler for NormalizingCompiler {
    fn name(&self) -> &str {
        "normalizing"
    }

    async fn compile(
        &self,
        _path: &str,
        source: &str,
        _options: &CompileOptions,
    ) -> Result<CompiledArtifact, CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let normalized = source.replace("\r\n", "\n");
        Ok(CompiledArtifact::new(normalized.to_uppercase(), &normalized))
    }
}

/// Configuration compiling `.src` files.
pub fn src_config() -> DevConfig {
    DevConfig {
        extensions: vec![".src".to_string()],
        ..DevConfig::default()
    }
}
