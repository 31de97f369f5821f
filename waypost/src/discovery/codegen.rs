//! Manifest source generation.
//!
//! Turns a planned discovery pass into Rust source that declares every route
//! module and registers its export, so the manifest can be built at compile
//! time from a `build.rs`:
//!
//! ```ignore
//! // build.rs
//! use waypost::discovery::{Discovery, codegen};
//!
//! fn main() {
//!     let out = std::path::Path::new(&std::env::var("OUT_DIR").unwrap()).join("routes.rs");
//!     codegen::write_manifest(&Discovery::new("src/routes"), &out, &Default::default()).unwrap();
//!     println!("cargo:rerun-if-changed=src/routes");
//! }
//!
//! // main.rs
//! include!(concat!(env!("OUT_DIR"), "/routes.rs"));
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::{Discovery, DiscoveryError, PlannedMount};

/// Options for [`render_manifest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Name of the function every route module exports.
    pub export: String,
    /// Path under which the `waypost` crate is reachable from the output.
    pub crate_path: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            export: "router".to_string(),
            crate_path: "::waypost".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("cannot write manifest to `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders manifest source for `planned`, declaring modules in plan order.
pub fn render_manifest(planned: &[PlannedMount], options: &CodegenOptions) -> String {
    let krate = &options.crate_path;
    let mut out = String::new();

    let _ = writeln!(out, "// @generated by waypost. Do not edit.");
    let _ = writeln!(out);

    for (index, mount) in planned.iter().enumerate() {
        let source = mount.entry.absolute_path().display().to_string();
        let _ = writeln!(out, "#[path = {source:?}]");
        let _ = writeln!(out, "mod route_{index};");
    }
    if !planned.is_empty() {
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "/// Route modules found by discovery, in mount order.");
    let _ = writeln!(out, "pub fn manifest() -> {krate}::discovery::Manifest {{");
    let _ = write!(out, "    {krate}::discovery::Manifest::new()");
    for (index, mount) in planned.iter().enumerate() {
        let key = mount.entry.manifest_key();
        let _ = write!(out, "\n        .with({key:?}, route_{index}::{})", options.export);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "}}");

    out
}

/// Plans `discovery` and writes the rendered manifest to `out`.
///
/// Returns the number of route modules written.
pub fn write_manifest(
    discovery: &Discovery,
    out: impl AsRef<Path>,
    options: &CodegenOptions,
) -> Result<usize, CodegenError> {
    let out = out.as_ref();
    let planned = discovery.plan()?;
    let source = render_manifest(&planned, options);

    fs::write(out, source).map_err(|source| CodegenError::Io {
        path: out.to_path_buf(),
        source,
    })?;

    info!(modules = planned.len(), out = %out.display(), "wrote route manifest");
    Ok(planned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        dir
    }

    fn planned_tree(files: &[&str]) -> (TempDir, Vec<PlannedMount>) {
        let dir = tree(files);
        let planned = Discovery::new(dir.path()).plan().unwrap();
        (dir, planned)
    }

    #[test]
    fn test_render_declares_each_module_once_in_order() {
        let (_dir, planned) = planned_tree(&["index.rs", "user/index.rs", "user/me.rs"]);
        let source = render_manifest(&planned, &CodegenOptions::default());

        assert_eq!(source.matches("#[path = ").count(), 3);
        let first = source.find(r#".with("index.rs", route_0::router)"#).unwrap();
        let second = source.find(r#".with("user/index.rs", route_1::router)"#).unwrap();
        let third = source.find(r#".with("user/me.rs", route_2::router)"#).unwrap();
        assert!(first < second && second < third);
        assert!(source.contains("pub fn manifest() -> ::waypost::discovery::Manifest {"));
    }

    #[test]
    fn test_render_uses_options() {
        let (_dir, planned) = planned_tree(&["health.rs"]);
        let options = CodegenOptions {
            export: "routes".to_string(),
            crate_path: "crate::web".to_string(),
        };
        let source = render_manifest(&planned, &options);

        assert!(source.contains(r#".with("health.rs", route_0::routes)"#));
        assert!(source.contains("crate::web::discovery::Manifest::new()"));
    }

    #[test]
    fn test_render_empty_plan() {
        let source = render_manifest(&[], &CodegenOptions::default());
        assert!(!source.contains("mod route_"));
        assert!(source.contains("::waypost::discovery::Manifest::new()\n}"));
    }

    #[test]
    fn test_write_manifest_reports_module_count() {
        let dir = tree(&["index.rs", "_draft.rs", "user.dto.rs"]);
        let out = dir.path().join("generated.txt");

        let written =
            write_manifest(&Discovery::new(dir.path()), &out, &CodegenOptions::default()).unwrap();
        assert_eq!(written, 1);
        assert!(fs::read_to_string(&out).unwrap().contains("mod route_0;"));
    }

    #[test]
    fn test_write_manifest_propagates_collisions() {
        let dir = tree(&["user.rs", "user/index.rs"]);
        let out = dir.path().join("generated.txt");

        let err = write_manifest(&Discovery::new(dir.path()), &out, &CodegenOptions::default())
            .unwrap_err();
        assert!(matches!(err, CodegenError::Discovery(DiscoveryError::Collision(_))));
        assert!(!out.exists());
    }
}
