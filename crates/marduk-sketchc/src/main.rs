//! `marduk-sketchc <input.sketch> [output]`
//!
//! Compiles one sketch document. Without an explicit output path the result
//! is written next to the input with its extension replaced by `.html`.

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use logging::init_logging;

/// Extension given to compiled output.
pub const OUTPUT_EXTENSION: &str = "html";

/// Extension expected on sketch sources.
pub const SOURCE_EXTENSION: &str = "sketch";

const USAGE: &str = "usage: marduk-sketchc <input.sketch> [output]";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args_os().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let output = args.next().map(PathBuf::from).unwrap_or_else(|| output_path(&input));
    if args.next().is_some() {
        bail!(USAGE);
    }

    if input.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
        log::warn!("{} does not have a .{SOURCE_EXTENSION} extension", input.display());
    }

    let source = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let html = marduk_sketch::compile(&source)
        .with_context(|| format!("failed to compile {}", input.display()))?;
    std::fs::write(&output, &html)
        .with_context(|| format!("failed to write {}", output.display()))?;

    log::info!("{} -> {} ({} bytes)", input.display(), output.display(), html.len());
    Ok(())
}

/// `input` with its extension replaced by [`OUTPUT_EXTENSION`].
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_source_extension() {
        assert_eq!(output_path(Path::new("ui/card.sketch")), PathBuf::from("ui/card.html"));
    }

    #[test]
    fn adds_extension_when_missing() {
        assert_eq!(output_path(Path::new("card")), PathBuf::from("card.html"));
    }
}
