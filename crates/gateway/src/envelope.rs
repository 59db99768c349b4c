//! The GraphQL request body and the `{data, errors}` response envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::GatewayError;

/// JSON body POSTed to the GraphQL endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    /// Query document.
    pub query: &'a str,
    /// Variables object; `{}` when the query takes none.
    pub variables: &'a Value,
}

/// The envelope every GraphQL response shares.
///
/// Returned verbatim by the executor; neither field is validated until an
/// operation calls [`GraphQlResponse::extract`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// Query result; absent or `null` when execution failed outright.
    #[serde(default)]
    pub data: Option<Value>,
    /// Server-reported errors, in server order.
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorEntry>>,
}

/// One entry of the envelope's `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlErrorEntry {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Where in the result the error occurred. Kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
}

impl GraphQlResponse {
    /// Fails with [`GatewayError::GraphQl`] if the envelope carries a
    /// non-empty `errors` list, otherwise returns `data` (which may be `None`).
    pub fn check_errors(self) -> Result<Option<Value>, GatewayError> {
        match self.errors {
            Some(errors) if !errors.is_empty() => {
                Err(GatewayError::graphql(errors.into_iter().map(|e| e.message)))
            }
            _ => Ok(self.data.filter(|d| !d.is_null())),
        }
    }

    /// Checks for errors, then decodes `data` into `T`.
    ///
    /// A missing `data` object or a `data` that does not fit `T` fails with
    /// [`GatewayError::UnexpectedShape`] naming `operation`.
    pub fn extract<T: DeserializeOwned>(self, operation: &'static str) -> Result<T, GatewayError> {
        let data = self
            .check_errors()?
            .ok_or_else(|| GatewayError::UnexpectedShape {
                operation,
                detail: "response has no data".to_string(),
            })?;
        serde_json::from_value(data).map_err(|e| GatewayError::UnexpectedShape {
            operation,
            detail: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn envelope(value: Value) -> GraphQlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_body_has_query_and_variables() {
        let variables = json!({"query": "foo"});
        let body = serde_json::to_value(GraphQlRequest {
            query: "query Q { x }",
            variables: &variables,
        })
        .unwrap();
        assert_eq!(body, json!({"query": "query Q { x }", "variables": {"query": "foo"}}));
    }

    #[test]
    fn empty_errors_list_is_not_an_error() {
        let named: Named = envelope(json!({"data": {"name": "a"}, "errors": []}))
            .extract("test")
            .unwrap();
        assert_eq!(named.name, "a");
    }

    #[test]
    fn errors_win_over_data() {
        let err = envelope(json!({
            "data": {"name": "a"},
            "errors": [
                {"message": "one", "path": ["repository"]},
                {"message": "two", "path": "weird"}
            ]
        }))
        .extract::<Named>("test")
        .unwrap_err();
        assert_eq!(err.to_string(), "GraphQL Error:one\ntwo");
    }

    #[test]
    fn missing_data_is_an_unexpected_shape() {
        for value in [json!({}), json!({"data": null})] {
            let err = envelope(value).extract::<Named>("test").unwrap_err();
            assert!(matches!(
                err,
                GatewayError::UnexpectedShape { operation: "test", .. }
            ));
        }
    }

    #[test]
    fn mistyped_data_is_an_unexpected_shape() {
        let err = envelope(json!({"data": {"name": 7}}))
            .extract::<Named>("test")
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnexpectedShape { .. }));
    }
}
