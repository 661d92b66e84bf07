//! Remote fetch of the provincial COVID case feed.

use reqwest::blocking::Client;

use crate::error::{AppError, ErrorKind};

const DEFAULT_CASES_URL: &str = "https://raw.githubusercontent.com/ccodwg/Covid19Canada/master/timeseries_prov/cases_timeseries_prov.csv";

const CASES_URL_VAR: &str = "PROVCAST_CASES_URL";

pub struct CaseFeed {
    client: Client,
    url: String,
}

impl CaseFeed {
    /// Build a feed client. `PROVCAST_CASES_URL` (from the environment or a
    /// `.env` file) overrides the upstream URL, e.g. to point at a mirror.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let url =
            std::env::var(CASES_URL_VAR).unwrap_or_else(|_| DEFAULT_CASES_URL.to_string());
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the raw feed CSV as text.
    pub fn fetch_csv(&self) -> Result<String, AppError> {
        let resp = self.client.get(&self.url).send().map_err(|e| {
            AppError::new(ErrorKind::Io, format!("Case feed request failed: {e}"))
        })?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                ErrorKind::Io,
                format!("Case feed request failed with status {}.", resp.status()),
            ));
        }

        resp.text().map_err(|e| {
            AppError::new(ErrorKind::Io, format!("Failed to read case feed body: {e}"))
        })
    }
}
