//! Build script for storefront crate.
//!
//! Generates content-based hashes for static assets (CSS and the checkout
//! glue scripts) to enable immutable caching.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// (path under `static/`, env var carrying the hash)
const ASSETS: &[(&str, &str)] = &[
    ("css/main.css", "CSS_HASH"),
    ("js/checkout.js", "CHECKOUT_JS_HASH"),
    ("js/cep.js", "CEP_JS_HASH"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for (relative, var) in ASSETS {
        hash_asset(&static_dir, relative, var);
    }
}

/// Hash an asset and copy it to `derived/` next to it with the hash in the
/// filename, e.g. `static/js/derived/checkout.1a2b3c4d.js`.
///
/// Sets `var` for use with `env!`.
fn hash_asset(static_dir: &Path, relative: &str, var: &str) {
    let path = static_dir.join(relative);
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {relative}: {e}");
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = format!("{:x}", hasher.finalize());
    let short_hash = &hash[..8];

    println!("cargo:rustc-env={var}={short_hash}");

    let parent = path.parent().expect("asset path has a parent directory");
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .expect("asset has a UTF-8 file stem");
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .expect("asset has a UTF-8 extension");

    let derived_dir = parent.join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    fs::copy(&path, derived_dir.join(format!("{stem}.{short_hash}.{extension}")))
        .expect("Failed to copy asset to derived directory");
}
