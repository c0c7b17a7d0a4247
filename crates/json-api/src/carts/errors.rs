//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::carts::{CartsErrorKind, CartsServiceError};

pub(crate) fn into_status_error(error: CartsServiceError, request_id: &str) -> StatusError {
    match error.kind() {
        CartsErrorKind::InvalidArgument | CartsErrorKind::NotFound => {
            StatusError::bad_request().brief(error.to_string())
        }
        CartsErrorKind::Storage => {
            error!(request_id, "carts storage error: {error:?}");

            StatusError::internal_server_error()
        }
    }
}
