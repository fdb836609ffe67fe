use std::sync::Arc;

use crate::error::Result;
use crate::job::JenkinsItem;
use crate::paths::resolve_pipeline_path;
use crate::transport::{send_json, Transport, TransportRequest};

pub const DEFAULT_ORGANIZATION: &str = "jenkins";

const FLATTENING_EXCLUDES: &str =
    "jenkins.branch.MultiBranchProject,com.cloudbees.hudson.plugins.folder.AbstractFolder";

/// Read access to the Blue Ocean REST API of one organization.
pub struct BlueOceanClient<T> {
    transport: Arc<T>,
    organization: String,
}

impl<T: Transport> BlueOceanClient<T> {
    pub fn new(transport: Arc<T>, organization: impl Into<String>) -> Self {
        Self {
            transport,
            organization: organization.into(),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Looks up a pipeline by its folder chain, outermost first.
    pub async fn get_pipeline<S: AsRef<str>>(&self, names: &[S]) -> Result<JenkinsItem> {
        let path = format!(
            "/blue/rest/organizations/{}/{}/",
            self.organization,
            resolve_pipeline_path(names)
        );
        send_json(self.transport.as_ref(), TransportRequest::get(path), &[200]).await
    }

    /// Pipelines whose name contains `name`, folders flattened away.
    pub async fn search(&self, name: &str, start: u32, limit: u32) -> Result<Vec<JenkinsItem>> {
        let query = format!(
            "pipeline:*{name}*;type:pipeline;organization:{};excludedFromFlattening={FLATTENING_EXCLUDES}",
            self.organization
        );
        let request = TransportRequest::get("/blue/rest/search/")
            .query("q", query)
            .query("filter", "no-folders")
            .query("start", start)
            .query("limit", limit);
        send_json(self.transport.as_ref(), request, &[200]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpTransport;
    use mockito::{Matcher, Server, ServerGuard};

    async fn setup() -> (ServerGuard, BlueOceanClient<HttpTransport>) {
        let server = Server::new_async().await;
        let transport = HttpTransport::new(&server.url(), None).unwrap();
        (
            server,
            BlueOceanClient::new(Arc::new(transport), DEFAULT_ORGANIZATION),
        )
    }

    #[tokio::test]
    async fn test_get_pipeline_nested() {
        let (mut server, client) = setup().await;
        let mock = server
            .mock("GET", "/blue/rest/organizations/jenkins/pipelines/team/pipelines/app/")
            .with_status(200)
            .with_body(r#"{"name": "app", "fullName": "team/app", "disabled": false}"#)
            .create_async()
            .await;

        let item = client.get_pipeline(&["team", "app"]).await.unwrap();
        assert_eq!(item.name, "app");
        assert_eq!(item.full_name, "team/app");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_builds_query() {
        let (mut server, client) = setup().await;
        let mock = server
            .mock("GET", "/blue/rest/search/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "q".into(),
                    "pipeline:*app*;type:pipeline;organization:jenkins;\
                     excludedFromFlattening=jenkins.branch.MultiBranchProject,\
                     com.cloudbees.hudson.plugins.folder.AbstractFolder"
                        .into(),
                ),
                Matcher::UrlEncoded("filter".into(), "no-folders".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
                Matcher::UrlEncoded("limit".into(), "25".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"name": "app"}, {"name": "app-deploy"}]"#)
            .create_async()
            .await;

        let items = client.search("app", 0, 25).await.unwrap();
        let names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["app", "app-deploy"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_surfaces_status() {
        let (mut server, client) = setup().await;
        server
            .mock("GET", "/blue/rest/search/")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = client.search("app", 0, 10).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
