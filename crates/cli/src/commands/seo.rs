//! SEO audit command.
//!
//! The report is informational, so failures are printed and never turn into
//! a non-zero exit.

use std::path::Path;

use ankkor_storefront::error::AppError;
use ankkor_storefront::seo_audit;

use crate::output;

pub fn audit(path: &Path) {
    match seo_audit::audit(path) {
        Ok(report) => output::seo_report(&report),
        Err(e) => output::error(&AppError::from(e)),
    }
}
