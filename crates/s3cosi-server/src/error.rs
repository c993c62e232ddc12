use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use s3cosi_common::{Code, Failure};

pub struct ApiError(pub Failure);

impl From<Failure> for ApiError {
    fn from(value: Failure) -> Self {
        Self(value)
    }
}

pub fn status_for(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (status_for(self.0.code), Json(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use s3cosi_common::Code;

    use super::status_for;

    #[test]
    fn status_follows_code() {
        assert_eq!(status_for(Code::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_for(Code::FailedPrecondition), StatusCode::PRECONDITION_FAILED);
        assert_eq!(status_for(Code::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(Code::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
