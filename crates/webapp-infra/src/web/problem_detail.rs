use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Serialize, Serializer};

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

fn serialize_status_code<S>(value: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(value.as_u16())
}

/// Controls the amount of the diagnostic details sent to the client.
#[derive(Clone, Debug)]
pub struct ProblemConfig {
    pub include_internal: bool,
}

impl ProblemConfig {
    pub fn new(include_internal: bool) -> Self {
        Self { include_internal }
    }

    pub fn into_layer(self) -> Extension<Self> {
        Extension(self)
    }

    /// Remove the request specific `detail` and `instance` unless the full response is enabled.
    pub fn configure(&self, problem: Problem) -> Problem {
        if self.include_internal {
            problem
        } else {
            Problem {
                instance: None,
                detail: String::new(),
                ..problem
            }
        }
    }
}

/// Implementation of a Problem Details response for HTTP APIs as of
/// the specification [RFC-7807](https://datatracker.ietf.org/doc/html/rfc7807).
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(serialize_with = "serialize_status_code")]
    status: StatusCode,
    #[serde(rename = "type")]
    ty: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    detail: String,
}

impl Problem {
    pub fn new(status: StatusCode, ty: &'static str) -> Self {
        Problem {
            status,
            ty,
            instance: None,
            detail: String::new(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not-found")
    }

    pub fn with_detail<S: ToString>(self, detail: S) -> Self {
        Self {
            detail: detail.to_string(),
            ..self
        }
    }

    pub fn with_instance<S: Into<String>>(self, instance: S) -> Self {
        Self {
            instance: Some(instance.into()),
            ..self
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_CONTENT_TYPE));
        response
    }
}

/// Fallback handler for the requests without a matching route.
pub async fn route_not_found(
    Extension(problem_config): Extension<ProblemConfig>,
    method: Method,
    uri: Uri,
) -> Problem {
    log::debug!("No route for {method} {uri}");
    let problem = Problem::not_found()
        .with_instance(uri.path())
        .with_detail(format!("No route for {method} {}", uri.path()));
    problem_config.configure(problem)
}
