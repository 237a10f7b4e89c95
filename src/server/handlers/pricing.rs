use axum::extract::{Extension, Json};

use crate::api::{DynAPI, SurgeInfo};
use crate::error::Error;

pub async fn surge(Extension(api): Extension<DynAPI>) -> Result<Json<SurgeInfo>, Error> {
    let info = api.surge_info().await?;

    Ok(info.into())
}
