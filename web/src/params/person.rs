use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters accepted by the greeting endpoints
///
/// # Fields
///
/// * `name` - Caller supplied name; only logged, never echoed back
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct NameParams {
    pub(crate) name: Option<String>,
}
