pub mod form;
pub mod users;

use validator::Validate;

use crate::error::AppResult;

/// Run `validator` checks on a deserialized request.
pub(crate) fn validate_request<T: Validate>(request: &T) -> AppResult<()> {
    request.validate()?;
    Ok(())
}
