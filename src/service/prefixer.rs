//! Vendor prefixing backed by lightningcss.
//!
//! Browserslist queries are resolved into lightningcss targets. The
//! stylesheet is minified against those targets, which adds the prefixes
//! they need and drops the ones they do not, then printed compressed or
//! expanded to follow the run's output style.

use crate::build::options::PrefixOptions;
use crate::service::{PostProcessError, PostProcessor};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

/// Autoprefixer-style post-processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prefixer;

impl Prefixer {
    /// Create a new prefixer.
    pub fn new() -> Self {
        Self
    }

    /// Prefix `css` synchronously.
    pub fn prefix(css: &str, options: &PrefixOptions) -> Result<String, PostProcessError> {
        let browsers = resolve_browsers(&options.browser_targets)?;
        let targets = Targets { browsers, ..Targets::default() };

        let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| PostProcessError::new(format!("cannot parse CSS: {}", e)))?;

        stylesheet
            .minify(MinifyOptions { targets: targets.clone(), ..MinifyOptions::default() })
            .map_err(|e| PostProcessError::new(format!("cannot prefix CSS: {}", e)))?;

        let printed = stylesheet
            .to_css(PrinterOptions {
                minify: options.compress,
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| PostProcessError::new(format!("cannot print CSS: {}", e)))?;

        Ok(printed.code)
    }
}

/// Resolve browserslist queries. An empty list means no specific targets.
fn resolve_browsers(queries: &[String]) -> Result<Option<Browsers>, PostProcessError> {
    if queries.is_empty() {
        return Ok(None);
    }
    Browsers::from_browserslist(queries.iter().map(String::as_str))
        .map_err(|e| PostProcessError::new(format!("invalid browser targets: {}", e)))
}

impl PostProcessor for Prefixer {
    async fn process(
        &self,
        css: String,
        options: &PrefixOptions,
    ) -> Result<String, PostProcessError> {
        let options = options.clone();
        tokio::task::spawn_blocking(move || Self::prefix(&css, &options))
            .await
            .map_err(|e| PostProcessError::new(format!("prefixer task failed: {}", e)))?
    }
}
