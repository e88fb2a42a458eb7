// 3rd party imports
use axum::extract::Json;

// internal imports
use crate::entities::protein::ProteinIdentifiers;
use crate::verification::validation::{
    validate_metadata, validate_protein_identifiers, validate_state, MetadataInput, StateInput,
    ValidationResponse,
};

/// Validates a state before it is added to a dataset.
///
/// # API
/// ## Request
/// * Path: `/api/validate/state`
/// * Method: `POST`
/// * Body: state with `name`, `protein_state` and `peptides`
///
/// ## Response
/// ```json
/// {"valid": true, "errors": [], "warnings": ["No oligomeric state specified (recommended)"]}
/// ```
///
pub async fn post_validate_state(Json(state): Json<StateInput>) -> Json<ValidationResponse> {
    Json(validate_state(&state))
}

/// Validates authors, license and publication.
///
/// # API
/// ## Request
/// * Path: `/api/validate/metadata`
/// * Method: `POST`
///
pub async fn post_validate_metadata(
    Json(metadata): Json<MetadataInput>,
) -> Json<ValidationResponse> {
    Json(validate_metadata(&metadata))
}

pub async fn post_validate_protein(
    Json(identifiers): Json<ProteinIdentifiers>,
) -> Json<ValidationResponse> {
    Json(validate_protein_identifiers(&identifiers))
}
