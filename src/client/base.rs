use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::ClientError;
use crate::api::HEARTBEAT_HEALTH_EP;
use crate::config::ClientConfig;
use crate::errors::decode_error;
use crate::metrics::registry::{CLIENT_CONNECTIVITY_FAILURES_TOTAL, CLIENT_ERRORS_TOTAL};

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Path prefix the server is mounted under, without slashes
    pub prefix: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ClientConfig> for ClientOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            timeout: config.timeout(),
        }
    }
}

/// Base client for a server built on this crate.
///
/// Application clients wrap it and add one method per endpoint on top of
/// [`ServiceClient::get`], [`ServiceClient::post`] and friends. Every error
/// response comes back as [`ClientError::Service`] carrying the same error
/// the handler returned.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    host: String,
    port: u16,
    base_url: String,
    http_client: reqwest::Client,
}

impl ServiceClient {
    /// Build a client and check the server answers its heartbeat
    pub async fn connect(
        host: impl Into<String>,
        port: u16,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Self::new(host, port, options)?;

        // A failing heartbeat means nobody is listening
        client.get(HEARTBEAT_HEALTH_EP).await?;
        info!(base_url = %client.base_url, "Connected to server");

        Ok(client)
    }

    /// Build a client without contacting the server
    pub fn new(
        host: impl Into<String>,
        port: u16,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let host = host.into();
        let prefix = options.prefix.trim_matches('/');
        let base_url = if prefix.is_empty() {
            format!("http://{}:{}", host, port)
        } else {
            format!("http://{}:{}/{}", host, port, prefix)
        };

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("http-scaffold/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            host,
            port,
            base_url,
            http_client,
        })
    }

    /// Address of the server as a URL, including the prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Start a request against `path`; finish it with [`ServiceClient::send`]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client.request(method, self.url(path))
    }

    /// Send a request and turn any error response into a `ClientError`
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let (client, request) = builder.build_split();
        let request = request.map_err(ClientError::Request)?;
        let method = request.method().clone();
        let url = request.url().to_string();

        debug!(method = %method, url = %url, "Sending request");

        let response = client.execute(request).await.map_err(|source| {
            CLIENT_CONNECTIVITY_FAILURES_TOTAL
                .with_label_values(&[method.as_str()])
                .inc();
            warn!(method = %method, url = %url, error = %source, "Request never reached the server");
            ClientError::Connectivity {
                method: method.clone(),
                url: url.clone(),
                source,
            }
        })?;

        raise_for_taxonomy(response).await
    }

    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    /// GET with `params` encoded as the query string
    pub async fn get_with<Q>(&self, path: &str, params: &Q) -> Result<Response, ClientError>
    where
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::GET, path).query(params)).await
    }

    /// Start a request with an optional JSON body
    fn request_with_body<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(method, path);
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    pub async fn post<B>(&self, path: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request_with_body(Method::POST, path, body)).await
    }

    pub async fn put<B>(&self, path: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request_with_body(Method::PUT, path, body)).await
    }

    pub async fn patch<B>(&self, path: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request_with_body(Method::PATCH, path, body)).await
    }

    pub async fn delete<B>(&self, path: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request_with_body(Method::DELETE, path, body)).await
    }

    /// GET and deserialize the successful body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.get(path)
            .await?
            .json()
            .await
            .map_err(ClientError::Body)
    }

    /// POST and deserialize the successful body
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, Some(body))
            .await?
            .json()
            .await
            .map_err(ClientError::Body)
    }
}

/// Pass a 2xx response through untouched; decode anything else into the
/// error it carries.
pub async fn raise_for_taxonomy(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(
                url = %url,
                status = %status.as_u16(),
                error = %e,
                "Failed to read error body"
            );
            String::new()
        }
    };
    let err = decode_error(status, &body);

    CLIENT_ERRORS_TOTAL
        .with_label_values(&[err.kind().as_str()])
        .inc();
    warn!(
        url = %url,
        status = %status.as_u16(),
        exception_type = %err.kind(),
        detail = %err,
        "Server returned an error"
    );

    Err(ClientError::Service(err))
}
