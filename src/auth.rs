//! Customer identification.
//!
//! The storefront API runs without authentication: the customer is identified
//! by the `X-Customer-ID` header and the value is trusted as-is. Any caller
//! who can reach the service can act as any customer, so this surface must
//! only be exposed on a network where that is acceptable (see DESIGN.md).

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::errors::AppError;

pub const CUSTOMER_HEADER: &str = "X-Customer-ID";

/// Customer identity taken from the `X-Customer-ID` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerId(pub Uuid);

impl FromRequest for CustomerId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let id = req
            .headers()
            .get(CUSTOMER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok());

        ready(id.map(CustomerId).ok_or_else(|| {
            AppError::BadRequest(format!("missing or invalid {CUSTOMER_HEADER} header"))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn extracts_a_valid_customer_id() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((CUSTOMER_HEADER, id.to_string()))
            .to_http_request();
        let extracted = CustomerId::extract(&req).await.expect("should extract");
        assert_eq!(extracted, CustomerId(id));
    }

    #[actix_web::test]
    async fn rejects_a_missing_header() {
        let req = TestRequest::default().to_http_request();
        let result = CustomerId::extract(&req).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[actix_web::test]
    async fn rejects_a_malformed_id() {
        let req = TestRequest::default()
            .insert_header((CUSTOMER_HEADER, "not-a-uuid"))
            .to_http_request();
        let result = CustomerId::extract(&req).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
