//! Remote fetch of the advertising dataset CSV.

use reqwest::blocking::Client;

use crate::error::AppError;

/// Default location of the advertising dataset (TV/radio/newspaper spend vs
/// sales, with an unnamed index column).
pub const DEFAULT_URL: &str = "http://www-bcf.usc.edu/~gareth/ISL/Advertising.csv";

/// Resolve which URL to fetch: an explicit flag wins, then the
/// `ADVERTISING_URL` environment variable (a `.env` file is honored), then
/// the built-in default.
pub fn resolve_url(flag: Option<&str>) -> String {
    if let Some(url) = flag {
        return url.to_string();
    }
    dotenvy::dotenv().ok();
    std::env::var("ADVERTISING_URL").unwrap_or_else(|_| DEFAULT_URL.to_string())
}

/// Download the CSV body from `url`.
pub fn fetch_csv(url: &str) -> Result<String, AppError> {
    let client = Client::new();
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::runtime(format!("Dataset request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::runtime(format!(
            "Dataset request failed with status {}.",
            resp.status()
        )));
    }

    resp.text()
        .map_err(|e| AppError::runtime(format!("Failed to read dataset response body: {e}")))
}
