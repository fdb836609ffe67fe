use futures::StreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::Body;

const CHUNK_SIZE: usize = 64 * 1024;

/// Progress bar tracking how much of an upload body has been sent.
pub struct UploadProgress {
    pb: ProgressBar,
}

impl UploadProgress {
    pub fn new(total: u64, title: &str) -> Self {
        let pb = ProgressBar::new(total);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.set_message(format!("Uploading {title}"));
        Self { pb }
    }

    /// Streams `content` in chunks, advancing the bar as each chunk is read.
    pub fn body(&self, content: Vec<u8>) -> Body {
        let chunks: Vec<std::io::Result<Vec<u8>>> = content
            .chunks(CHUNK_SIZE)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();

        let pb = self.pb.clone();
        let stream = futures::stream::iter(chunks).inspect(move |chunk| {
            if let Ok(chunk) = chunk {
                pb.inc(chunk.len() as u64);
            }
        });
        Body::wrap_stream(stream)
    }

    pub fn finish(&self) {
        self.pb.finish_with_message("Upload complete ✓");
    }

    pub fn abandon(&self) {
        self.pb.abandon_with_message("Upload failed");
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_progress_starts_at_zero() {
        let progress = UploadProgress::new(10, "demo.hpi");
        assert_eq!(progress.position(), 0);
        progress.finish();
    }
}
