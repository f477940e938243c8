use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::error::ScanError;
use crate::parser::{parse_predict_response, PredictResponse};
use crate::types::{FileRef, ScanModel};

/// A file the user picked and that can be sent as a `files` part.
pub trait UploadFile {
    fn file_name(&self) -> String;
    fn size(&self) -> u64;

    fn to_ref(&self) -> FileRef {
        FileRef {
            name: self.file_name(),
            size: self.size(),
        }
    }
}

impl UploadFile for web_sys::File {
    fn file_name(&self) -> String {
        self.name()
    }

    fn size(&self) -> u64 {
        web_sys::Blob::size(self) as u64
    }
}

/// The remote vulnerability prediction service.
#[async_trait(?Send)]
pub trait PredictionClient {
    type File: UploadFile;

    async fn predict(
        &self,
        files: &[Self::File],
        model: ScanModel,
    ) -> Result<PredictResponse, ScanError>;
}

/// One part of the `multipart/form-data` scan request.
#[derive(Debug, PartialEq)]
pub enum FormPart<'a, F> {
    File {
        field: &'static str,
        file: &'a F,
        filename: String,
    },
    Text {
        field: &'static str,
        value: &'static str,
    },
}

/// One `files` part per file, in order and duplicates included, then a single `status` part.
pub fn scan_form_parts<F: UploadFile>(files: &[F], model: ScanModel) -> Vec<FormPart<'_, F>> {
    files
        .iter()
        .map(|file| FormPart::File {
            field: "files",
            file,
            filename: file.file_name(),
        })
        .chain(std::iter::once(FormPart::Text {
            field: "status",
            value: model.as_str(),
        }))
        .collect()
}

/// Posts `multipart/form-data` to the prediction endpoint with `fetch`.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchClient {
    endpoint: String,
}

impl FetchClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl PredictionClient for FetchClient {
    type File = web_sys::File;

    async fn predict(
        &self,
        files: &[web_sys::File],
        model: ScanModel,
    ) -> Result<PredictResponse, ScanError> {
        let form = web_sys::FormData::new().map_err(browser_error)?;
        for part in scan_form_parts(files, model) {
            let appended = match part {
                FormPart::File {
                    field,
                    file,
                    filename,
                } => form.append_with_blob_and_filename(field, file, &filename),
                FormPart::Text { field, value } => form.append_with_str(field, value),
            };
            appended.map_err(browser_error)?;
        }

        // The browser sets the multipart boundary header itself.
        let opts = web_sys::RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&form.into());

        let request = web_sys::Request::new_with_str_and_init(&self.endpoint, &opts)
            .map_err(browser_error)?;
        let window = web_sys::window()
            .ok_or_else(|| ScanError::Browser("window not available".to_string()))?;

        tracing::debug!(endpoint = %self.endpoint, files = files.len(), %model, "Posting scan request");
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network_error)?;
        let resp: web_sys::Response = resp_value.dyn_into().map_err(browser_error)?;

        if !resp.ok() {
            return Err(ScanError::Http {
                status: resp.status(),
            });
        }

        let text = JsFuture::from(resp.text().map_err(browser_error)?)
            .await
            .map_err(network_error)?;
        Ok(parse_predict_response(
            &text.as_string().unwrap_or_default(),
        ))
    }
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn browser_error(value: JsValue) -> ScanError {
    ScanError::Browser(js_message(&value))
}

fn network_error(value: JsValue) -> ScanError {
    ScanError::Network(js_message(&value))
}
