//! Options forwarded to the compiler.

use serde::{Deserialize, Serialize};

/// Options passed to every `Compiler::compile` call.
///
/// Deciding which values apply in development versus production builds is the
/// caller's concern; the compiler receives them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Module format of the generated code.
    #[serde(default = "default_format")]
    pub format: String,

    /// Code generation target.
    #[serde(default = "default_generate")]
    pub generate: String,

    /// Compile in development mode (extra runtime checks).
    #[serde(default)]
    pub dev: bool,

    /// Inject component CSS into the generated code.
    #[serde(default)]
    pub css: bool,

    /// Emit hot-module-replacement hooks.
    #[serde(default)]
    pub hot: bool,

    /// Compiler-specific options.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_format() -> String {
    "esm".to_string()
}

fn default_generate() -> String {
    "dom".to_string()
}

impl CompileOptions {
    /// Creates options suitable for a development server.
    pub fn dev() -> Self {
        Self {
            dev: true,
            css: true,
            hot: true,
            ..Self::default()
        }
    }

    /// Computes a hash of the options, used to tell configurations apart in logs.
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            format: default_format(),
            generate: default_generate(),
            dev: false,
            css: false,
            hot: false,
            extra: serde_json::Map::new(),
        }
    }
}
