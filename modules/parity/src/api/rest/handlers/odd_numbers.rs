use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, OriginalUri};
use tracing::{debug, info};

use crate::api::problem::Problem;
use crate::api::rest::dto::{OddNumbersResponse, OddRangeQuery, ParityCheckResponse};
use crate::api::rest::error::{RANGE_TOO_WIDE, ToProblem, with_context};
use crate::api::rest::extract::{ValidPath, ValidQuery};
use crate::api::rest::state::AppState;
use crate::domain::odd_numbers::{is_odd, odd_numbers_in_range, validate_range};

/// `GET /odd-numbers?start=&end=`
pub async fn list_odd_numbers(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    ValidQuery(OddRangeQuery { start, end }): ValidQuery<OddRangeQuery>,
) -> Result<Json<OddNumbersResponse>, Problem> {
    info!(start, end, "Getting odd numbers in range");
    let instance = uri.path();

    // Out-of-range sums are reported before the width guard applies.
    validate_range(start, end).map_err(|e| e.to_problem(instance))?;

    let span = end.abs_diff(start);
    let max_span = state.api.max_range_span;
    if span > max_span {
        debug!(span, max_span, "range rejected as too wide");
        return Err(with_context(
            RANGE_TOO_WIDE.as_problem(format!(
                "Range width {span} exceeds the maximum of {max_span}"
            )),
            instance,
        ));
    }

    let odd_numbers = odd_numbers_in_range(start, end).map_err(|e| e.to_problem(instance))?;
    Ok(Json(OddNumbersResponse { odd_numbers }))
}

/// `GET /odd-numbers/check/{number}`
pub async fn check_number(ValidPath(number): ValidPath<i64>) -> Json<ParityCheckResponse> {
    debug!(number, "Checking parity");
    Json(ParityCheckResponse {
        number,
        is_odd: is_odd(number),
    })
}
