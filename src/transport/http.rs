use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder};
use url::Url;

use super::{endpoint_url, RequestBody, Transport, TransportRequest, TransportResponse};
use crate::auth::Credentials;
use crate::config::JenkinsConfig;
use crate::error::{JenkinsError, Result};

/// `reqwest`-backed transport with optional basic auth.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    debug: bool,
}

impl HttpTransport {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::build(base_url, credentials, None)
    }

    pub fn from_config(config: &JenkinsConfig) -> Result<Self> {
        let credentials = config
            .username
            .as_ref()
            .map(|user| Credentials::new(user, config.token.clone().unwrap_or_default()));
        let timeout = config.timeout_secs.map(Duration::from_secs);

        Ok(Self::build(&config.url, credentials, timeout)?.with_debug(config.debug))
    }

    fn build(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "jclient/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| JenkinsError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| JenkinsError::Config(format!("Invalid Jenkins URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
            debug: false,
        })
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Attaches the configured credentials to a request.
    pub fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(credentials.username(), Some(credentials.token()))
            }
            None => request,
        }
    }
}

impl Transport for HttpTransport {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn execute(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send {
        async move {
            let url = endpoint_url(&self.base_url, &request.path, &request.query)?;
            if self.debug {
                debug!("{} {} body={:?}", request.method, url, request.body);
            }

            let builder = self
                .authenticate(self.client.request(request.method, url))
                .headers(request.headers);
            let builder = match request.body {
                RequestBody::Empty => builder,
                RequestBody::Form(pairs) => builder.form(&pairs),
                RequestBody::Multipart(form) => builder.multipart(form),
            };

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();

            if self.debug {
                debug!("<- {status} ({} bytes)", body.len());
            }

            Ok(TransportResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_rejects_invalid_url() {
        let err = HttpTransport::new("not a url", None).err().unwrap();
        assert!(err.to_string().contains("Invalid Jenkins URL"));
    }

    #[test]
    fn test_from_config_applies_debug() {
        let config = JenkinsConfig {
            url: "http://localhost:8080".to_string(),
            username: Some("admin".to_string()),
            token: Some("secret".to_string()),
            debug: true,
            timeout_secs: Some(5),
        };
        let transport = HttpTransport::from_config(&config).unwrap();
        assert!(transport.debug());
        assert_eq!(transport.base_url().as_str(), "http://localhost:8080/");
    }

    #[tokio::test]
    async fn test_execute_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        // base64("admin:secret")
        let mock = server
            .mock("GET", "/api/json")
            .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let transport =
            HttpTransport::new(&server.url(), Some(Credentials::new("admin", "secret"))).unwrap();
        let response = transport
            .execute(TransportRequest::get("/api/json"))
            .await
            .unwrap();

        assert_eq!(response.status.as_u16(), 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_encodes_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/job/a/restFul/addParameter")
            .match_header("content-type", super::super::APPLICATION_FORM)
            .match_body(Matcher::UrlEncoded("params".into(), "[1, 2]".into()))
            .with_status(200)
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url(), None).unwrap();
        let request = TransportRequest::post("/job/a/restFul/addParameter")
            .form(vec![("params".to_string(), "[1, 2]".to_string())]);
        transport.execute(request).await.unwrap();

        mock.assert_async().await;
    }
}
