//! Jenkins URL path conventions for jobs and Blue Ocean pipelines.

/// Converts a job name into its `/job/...` URL path.
///
/// Nested folders are written as space separated tokens, so `"team app"`
/// becomes `/job/team/job/app`. Names that are empty or already start with
/// `/job/` or `job/` are returned unchanged. Slashes inside a token are kept
/// as part of that token.
pub fn resolve_job_path(name: &str) -> String {
    if name.is_empty() || name.starts_with("/job/") || name.starts_with("job/") {
        return name.to_string();
    }

    name.split(' ').fold(String::new(), |mut path, segment| {
        path.push_str("/job/");
        path.push_str(segment);
        path
    })
}

/// Joins pipeline names into the Blue Ocean `pipelines/<a>/pipelines/<b>` form.
pub fn resolve_pipeline_path<S: AsRef<str>>(pipelines: &[S]) -> String {
    if pipelines.is_empty() {
        return String::new();
    }

    let joined = pipelines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/pipelines/");
    format!("pipelines/{joined}")
}
