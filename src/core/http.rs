use std::time::Duration;

use reqwest::blocking::{
    Client,
    Response,
};

use crate::core::LazyError;

pub const USER_AGENT: &str = "lazy-english/0.3 (+reqwest)";

pub fn http_client(timeout: Duration) -> Result<Client, LazyError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| LazyError::Custom(format!("HTTP client build failed: {e}")))
}

pub fn ensure_success(resp: &Response) -> Result<(), LazyError> {
    if !resp.status().is_success() {
        return Err(LazyError::Transport(format!(
            "HTTP error {} from {}",
            resp.status(),
            resp.url()
        )));
    }
    Ok(())
}
