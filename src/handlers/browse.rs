use actix_web::http::StatusCode;
use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use serde::Deserialize;

use crate::core::ports::fetcher::Fetcher;
use crate::error::Error;

#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    url: String,
}

pub async fn fetch_page<F: Fetcher>(Query(BrowseParams { url }): Query<BrowseParams>, fetcher: Data<F>) -> Result<HttpResponse, Error> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::ValidationFailed("only http and https urls are supported".into()));
    }
    let page = fetcher.fetch(&url).await?;
    let mut builder = HttpResponse::build(StatusCode::from_u16(page.status).unwrap_or(StatusCode::OK));
    if let Some(content_type) = page.content_type {
        builder.content_type(content_type);
    }
    Ok(builder.body(page.body))
}
