//! Compiler trait definition.

use std::future::Future;

use crate::{CompileError, CompileOptions, CompiledArtifact};

/// Trait for compiling a single source file.
///
/// Implementations must be deterministic: the same `source` and `options`
/// must always produce the same artifact. Callers rely on this to reuse and
/// overwrite cached artifacts freely.
///
/// # Example
///
/// ```rust,ignore
/// use hotcomp_compiler::{CompileError, CompileOptions, CompiledArtifact, Compiler};
///
/// struct Uppercase;
///
/// impl Compiler for Uppercase {
///     fn name(&self) -> &str {
///         "uppercase"
///     }
///
///     async fn compile(
///         &self,
///         _path: &str,
///         source: &str,
///         _options: &CompileOptions,
///     ) -> Result<CompiledArtifact, CompileError> {
///         Ok(CompiledArtifact::new(source.to_uppercase(), source))
///     }
/// }
/// ```
pub trait Compiler: Send + Sync + 'static {
    /// Returns the name of this compiler.
    fn name(&self) -> &str;

    /// Compiles `source`, the content of the file served at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Request path of the file, used for diagnostics and module ids
    /// * `source` - The source text to compile
    /// * `options` - Compiler options
    ///
    /// # Returns
    ///
    /// The compiled artifact, or an error describing why the source could not
    /// be compiled.
    fn compile(
        &self,
        path: &str,
        source: &str,
        options: &CompileOptions,
    ) -> impl Future<Output = Result<CompiledArtifact, CompileError>> + Send;
}
