use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::error::RegistryError;
use crate::config::RegistryConfig;
use crate::workflows::admin::{
    AdminRegistry, ApplicationStatus, ApplicationSummary, CardRecord, NewCard, RenewalRecord,
};
use crate::workflows::application::{
    ApplicationId, CardRegistry, CardType, StagedFile, SubmissionResult,
};

const CARD_RESOURCE: &str = "Card";
const RENEWAL_RESOURCE: &str = "Renewal";

/// reqwest-backed client for the card registry REST API.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    base_url: String,
}

/// Stored names returned by the batch upload, either bare or wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredNames {
    Bare(Vec<String>),
    Wrapped {
        #[serde(alias = "filenames", alias = "fileNames")]
        files: Vec<String>,
    },
}

#[derive(Serialize)]
struct StatusUpdate {
    status: ApplicationStatus,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &RegistryConfig) -> Self {
        Self {
            http,
            base_url: config.base_url().to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RegistryError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = RegistryError::from_failure(status.as_u16(), &body);
        debug!(status = status.as_u16(), error = %error, "registry call failed");
        Err(error)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, RegistryError> {
        let url = self.url(path);
        debug!(%url, "registry GET");
        let response = self.send(self.http.get(&url)).await?;
        Ok(response.json::<T>().await?)
    }
}

fn file_part(file: &StagedFile) -> Result<Part, RegistryError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(|err| RegistryError::Request(err.to_string()))
}

impl CardRegistry for RegistryClient {
    async fn create_application(
        &self,
        card_type: CardType,
        body: Map<String, Value>,
    ) -> Result<SubmissionResult, RegistryError> {
        let url = self.url(card_type.resource());
        debug!(%url, fields = body.len(), "registry POST application");
        let response = self.send(self.http.post(&url).json(&body)).await?;
        Ok(response.json::<SubmissionResult>().await?)
    }

    async fn upload_document(
        &self,
        card_type: CardType,
        id: ApplicationId,
        file: &StagedFile,
    ) -> Result<(), RegistryError> {
        let url = self.url(&format!("{}/{id}/medical-documents", card_type.resource()));
        debug!(%url, file = %file.file_name, bytes = file.len(), "registry upload document");
        let form = Form::new().part("file", file_part(file)?);
        self.send(self.http.post(&url).multipart(form)).await?;
        Ok(())
    }

    async fn upload_documents(
        &self,
        card_type: CardType,
        files: &[StagedFile],
    ) -> Result<Vec<String>, RegistryError> {
        let url = self.url(&format!("{}/upload-documents", card_type.resource()));
        debug!(%url, files = files.len(), "registry batch upload");
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file_part(file)?);
        }

        let response = self.send(self.http.post(&url).multipart(form)).await?;
        let names = match response.json::<StoredNames>().await? {
            StoredNames::Bare(names) => names,
            StoredNames::Wrapped { files } => files,
        };
        Ok(names)
    }
}

impl AdminRegistry for RegistryClient {
    async fn list_applications(
        &self,
        card_type: CardType,
    ) -> Result<Vec<ApplicationSummary>, RegistryError> {
        self.fetch(card_type.resource()).await
    }

    async fn update_application_status(
        &self,
        card_type: CardType,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RegistryError> {
        let url = self.url(&format!("{}/{id}/status", card_type.resource()));
        debug!(%url, status = status.label(), "registry PUT status");
        self.send(self.http.put(&url).json(&StatusUpdate { status }))
            .await?;
        Ok(())
    }

    async fn list_cards(&self) -> Result<Vec<CardRecord>, RegistryError> {
        self.fetch(CARD_RESOURCE).await
    }

    async fn create_card(&self, card: &NewCard) -> Result<CardRecord, RegistryError> {
        let url = self.url(CARD_RESOURCE);
        debug!(%url, card_number = %card.card_number, "registry POST card");
        let response = self.send(self.http.post(&url).json(card)).await?;
        Ok(response.json::<CardRecord>().await?)
    }

    async fn list_renewals(&self) -> Result<Vec<RenewalRecord>, RegistryError> {
        self.fetch(RENEWAL_RESOURCE).await
    }
}
