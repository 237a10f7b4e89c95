use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{DynAPI, RideDetails, RideIntent, RideReceipt};
use crate::error::Error;

pub async fn request(
    Extension(api): Extension<DynAPI>,
    Json(intent): Json<RideIntent>,
) -> Result<Json<RideReceipt>, Error> {
    let receipt = api.request_ride(intent).await?;

    Ok(receipt.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideDetails>, Error> {
    let details = api.find_ride_details(id).await?;

    Ok(details.into())
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    api.cancel_ride(id).await?;

    Ok(Json(json!({
        "message": "ride cancelled",
        "passenger_id": id,
    })))
}
