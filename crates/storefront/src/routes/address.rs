//! CEP lookup endpoints used by the address forms.

use axum::{
    Form, Json,
    extract::{Path, State},
};
use tracing::instrument;

use aprova_facil_core::{Address, AddressLookup, Cep};

use crate::error::AppError;
use crate::state::AppState;

const INVALID_CEP: &str = "CEP inválido";

fn parse_cep(raw: &str) -> Result<Cep, AppError> {
    Cep::parse(raw).map_err(|_| AppError::BadRequest(INVALID_CEP.to_string()))
}

/// Look up a CEP.
///
/// 400 for a malformed code, 404 when the service does not know it and 502
/// when the service could not be reached.
#[instrument(skip(state))]
pub async fn lookup(
    State(state): State<AppState>,
    Path(cep): Path<String>,
) -> Result<Json<AddressLookup>, AppError> {
    let cep = parse_cep(&cep)?;
    let found = state.cep().lookup(&cep).await?;
    Ok(Json(found))
}

/// Merge a lookup into the address the customer has typed so far.
///
/// On any failure the submitted fields are left as they were and the error
/// is returned instead.
#[instrument(skip(state, address), fields(cep = %address.cep))]
pub async fn autofill(
    State(state): State<AppState>,
    Form(mut address): Form<Address>,
) -> Result<Json<Address>, AppError> {
    let cep = parse_cep(&address.cep)?;
    let found = state.cep().lookup(&cep).await?;

    address.cep = cep.formatted();
    address.apply_lookup(&found);
    Ok(Json(address))
}
