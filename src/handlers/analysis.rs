use actix_multipart::Multipart;
use actix_web::web::{Data, Json};
use futures_util::TryStreamExt;

use crate::core::ports::analyzer::{AnalysisReport, Analyzer};
use crate::error::Error;

/// Drains every uploaded file and runs it through the configured analyzer,
/// one report per file.
pub async fn analyze<A: Analyzer>(mut payload: Multipart, analyzer: Data<A>) -> Result<Json<Vec<AnalysisReport>>, Error> {
    let mut reports = Vec::new();
    while let Some(mut field) = payload.try_next().await? {
        let file_name = field.content_disposition().get_filename().unwrap_or("unnamed").to_owned();
        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            content.extend_from_slice(&chunk);
        }
        reports.push(analyzer.analyze(&file_name, &content).await?);
    }
    if reports.is_empty() {
        return Err(Error::ValidationFailed("no file was uploaded".into()));
    }
    Ok(Json(reports))
}
