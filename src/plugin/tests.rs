use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use tokio_test::assert_ok;

use super::*;
use crate::config::PluginConfig;
use crate::error::JenkinsError;
use crate::transport::HttpTransport;

async fn setup(config: PluginConfig) -> (ServerGuard, PluginManager<HttpTransport>) {
    let server = Server::new_async().await;
    let transport = HttpTransport::new(&server.url(), None).unwrap();
    (server, PluginManager::new(Arc::new(transport), config))
}

#[tokio::test]
async fn test_installed_raises_depth_to_one() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    let mock = server
        .mock("GET", "/pluginManager/api/json")
        .match_query(Matcher::UrlEncoded("depth".into(), "1".into()))
        .with_status(200)
        .with_body(
            r#"{"plugins": [
                {"shortName": "git", "version": "4.11.0", "active": true},
                {"shortName": "workflow-aggregator", "version": "2.6", "hasUpdate": true}
            ]}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let plugins = manager.installed(0).await.unwrap();
    assert_eq!(plugins.len(), 2);
    assert!(plugins[1].has_update);

    let found = manager.find_installed("git").await.unwrap();
    assert_eq!(found.map(|plugin| plugin.version).as_deref(), Some("4.11.0"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_available_plugins() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    server
        .mock("GET", "/pluginManager/plugins")
        .with_status(200)
        .with_body(
            r#"{"status": "ok", "data": [
                {"name": "blueocean", "title": "Blue Ocean", "installed": false}
            ]}"#,
        )
        .create_async()
        .await;

    let plugins = manager.available().await.unwrap();
    assert_eq!(plugins[0].name, "blueocean");
    assert_eq!(plugins[0].title.as_deref(), Some("Blue Ocean"));
}

#[tokio::test]
async fn test_install_latest_posts_plugin_query() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    let mock = server
        .mock("POST", "/pluginManager/install")
        .match_query(Matcher::UrlEncoded("plugin.git".into(), "".into()))
        .with_status(302)
        .create_async()
        .await;

    let batch = manager.install(&["git"]).await;
    assert!(batch.is_complete());
    assert_eq!(batch.items, vec!["git".to_string()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_install_reports_x_error_header() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    server
        .mock("POST", "/pluginManager/install")
        .match_query(Matcher::UrlEncoded("plugin.nope".into(), "".into()))
        .with_status(400)
        .with_header("X-Error", "No such plugin: nope")
        .create_async()
        .await;

    let batch = manager.install(&["nope"]).await;
    match batch.error {
        Some(JenkinsError::PluginInstall(message)) => assert_eq!(message, "No such plugin: nope"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_install_without_x_error_names_plugin() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    server
        .mock("POST", "/pluginManager/install")
        .match_query(Matcher::Any)
        .with_status(400)
        .create_async()
        .await;

    let err = manager.install(&["ghost"]).await.into_result().unwrap_err();
    assert_eq!(err.to_string(), "Plugin install failed: cannot find plugin ghost");
}

#[tokio::test]
async fn test_install_halts_on_first_failure() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    server
        .mock("POST", "/pluginManager/install")
        .match_query(Matcher::UrlEncoded("plugin.git".into(), "".into()))
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("POST", "/pluginManager/install")
        .match_query(Matcher::UrlEncoded("plugin.broken".into(), "".into()))
        .with_status(500)
        .create_async()
        .await;
    let never = server
        .mock("POST", "/pluginManager/install")
        .match_query(Matcher::UrlEncoded("plugin.later".into(), "".into()))
        .expect(0)
        .create_async()
        .await;

    let batch = manager.install(&["git", "", "broken", "later"]).await;

    assert_eq!(batch.items, vec!["git".to_string()]);
    assert_eq!(batch.error.as_ref().and_then(JenkinsError::status), Some(500));
    never.assert_async().await;
}

#[tokio::test]
async fn test_install_versioned_downloads_then_uploads() {
    let mut center = Server::new_async().await;
    let download = center
        .mock("GET", "/plugins/git/4.11.0/git.hpi")
        .with_status(200)
        .with_body("hpi-bytes")
        .create_async()
        .await;

    let config = PluginConfig {
        update_center_url: format!("{}/", center.url()),
        ..PluginConfig::default()
    };
    let (mut server, manager) = setup(config).await;
    let upload = server
        .mock("POST", "/pluginManager/uploadPlugin")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="@name"; filename="git.hpi""#.into()),
            Matcher::Regex("hpi-bytes".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let batch = manager.install(&["git@4.11.0"]).await;

    assert!(batch.is_complete(), "{:?}", batch.error);
    assert_eq!(batch.items, vec!["git@4.11.0".to_string()]);
    download.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_install_versioned_download_failure_skips_upload() {
    let mut center = Server::new_async().await;
    center
        .mock("GET", "/plugins/git/0.0.0/git.hpi")
        .with_status(404)
        .create_async()
        .await;

    let config = PluginConfig {
        update_center_url: center.url(),
        ..PluginConfig::default()
    };
    let (mut server, manager) = setup(config).await;
    let upload = server
        .mock("POST", "/pluginManager/uploadPlugin")
        .expect(0)
        .create_async()
        .await;

    let batch = manager.install(&["git@0.0.0"]).await;
    assert_eq!(batch.error.as_ref().and_then(JenkinsError::status), Some(404));
    upload.assert_async().await;
}

#[tokio::test]
async fn test_download_url_uses_mirror_when_enabled() {
    let (_server, manager) = setup(PluginConfig::default()).await;
    assert_eq!(
        manager.download_url("git", "4.11.0"),
        "https://updates.jenkins-ci.org/download/plugins/git/4.11.0/git.hpi"
    );

    let config = PluginConfig {
        use_mirror: true,
        ..PluginConfig::default()
    };
    let (_server, manager) = setup(config).await;
    assert_eq!(
        manager.download_url("git", "4.11.0"),
        "https://mirrors.tuna.tsinghua.edu.cn/jenkins/plugins/git/4.11.0/git.hpi"
    );
}

#[tokio::test]
async fn test_uninstall_expects_ok() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    server
        .mock("POST", "/pluginManager/plugin/git/doUninstall")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("POST", "/pluginManager/plugin/core/doUninstall")
        .with_status(500)
        .with_body("<html>cannot uninstall</html>")
        .create_async()
        .await;

    assert_ok!(manager.uninstall("git").await);
    let err = manager.uninstall("core").await.unwrap_err();
    assert_eq!(err.to_string(), "unexpected status code: 500");
}

#[tokio::test]
async fn test_upload_with_progress_streams_file() {
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("custom.hpi");
    std::fs::write(&package, "custom-plugin-content").unwrap();

    let config = PluginConfig {
        show_progress: true,
        ..PluginConfig::default()
    };
    let (mut server, manager) = setup(config).await;
    let mock = server
        .mock("POST", "/pluginManager/uploadPlugin")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="@name"; filename="custom.hpi""#.into()),
            Matcher::Regex("custom-plugin-content".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    assert_ok!(manager.upload(&package).await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_missing_file_is_io_error() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    let mock = server
        .mock("POST", "/pluginManager/uploadPlugin")
        .expect(0)
        .create_async()
        .await;

    let result = manager.upload(std::path::Path::new("/no/such/plugin.hpi")).await;
    assert!(matches!(result, Err(JenkinsError::Io(_))));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_check_update_accepts_redirect() {
    let (mut server, manager) = setup(PluginConfig::default()).await;
    server
        .mock("POST", "/pluginManager/checkUpdatesServer")
        .with_status(302)
        .create_async()
        .await;

    assert_ok!(manager.check_update().await);
}
