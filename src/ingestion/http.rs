//! Remote loading over HTTP (feature `http`).

use reqwest::{Client, IntoUrl, RequestBuilder};

use crate::dataset::DataSet;
use crate::error::{DatasetError, DatasetResult};

use super::file::stats_of;
use super::observability::{report, LoadContext};
use super::options::TableOptions;

/// GET `url` and parse the response body.
///
/// A non-success status fails with [`DatasetError::HttpStatus`]; transport failures with
/// [`DatasetError::Http`].
pub async fn load(url: impl IntoUrl, options: &TableOptions) -> DatasetResult<DataSet> {
    let client = Client::builder().build()?;
    load_request(client.get(url), options).await
}

/// Send a caller-built request (custom headers, auth, timeout) and parse the response body.
pub async fn load_request(request: RequestBuilder, options: &TableOptions) -> DatasetResult<DataSet> {
    let (client, request) = request.build_split();
    let source = request
        .as_ref()
        .map(|r| r.url().to_string())
        .unwrap_or_else(|_| "<invalid request>".to_string());
    let ctx = LoadContext::new(source.clone());

    let result = fetch(client, request, &source)
        .await
        .and_then(|text| DataSet::parse(&text, options));

    report(options, &ctx, &result, stats_of);
    result
}

async fn fetch(
    client: Client,
    request: reqwest::Result<reqwest::Request>,
    source: &str,
) -> DatasetResult<String> {
    let response = client.execute(request?).await?;
    let status = response.status();
    if !status.is_success() {
        tracing::debug!(url = %source, status = status.as_u16(), "non-success response");
        return Err(DatasetError::HttpStatus {
            status: status.as_u16(),
            url: source.to_string(),
        });
    }
    Ok(response.text().await?)
}
