//! `/api/save` accepts the browser's multipart form as well as a plain
//! urlencoded form.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};
use ocrlabel_core::LabelError;

use crate::error::ApiError;
use crate::schema::SaveLabelForm;

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn bad_form(err: impl std::fmt::Display) -> ApiError {
    ApiError(LabelError::Validation(format!("Invalid form data: {err}")))
}

#[async_trait]
impl<S> FromRequest<S> for SaveLabelForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(form) = Form::<SaveLabelForm>::from_request(req, state)
                .await
                .map_err(bad_form)?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state).await.map_err(bad_form)?;
        let mut form = SaveLabelForm::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            match field.name() {
                Some("image_name") => form.image_name = field.text().await.map_err(bad_form)?,
                Some("corrected_text") => {
                    form.corrected_text = field.text().await.map_err(bad_form)?
                }
                _ => {}
            }
        }
        Ok(form)
    }
}
