use crate::config::thumbnail::ThumbnailConfig;
use crate::service::compositor::{output_format, TextCompositor};
use crate::service::prompt::build_prompt;
use crate::service::synthesizer::ImageSynthesizer;
use crate::utils::error::{Result, ThumbnailError};
use crate::utils::file::{atomic_save_file, TempImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Title in, thumbnail file out.
///
/// Each run owns a uniquely named base image in the temp directory, so runs
/// may overlap freely. On error the destination is guaranteed not to exist.
#[derive(Clone)]
pub struct ThumbnailWorkflow {
    synthesizer: Arc<dyn ImageSynthesizer>,
    compositor: Arc<TextCompositor>,
    temp_dir: PathBuf,
}

impl ThumbnailWorkflow {
    pub fn new(synthesizer: Arc<dyn ImageSynthesizer>, config: &ThumbnailConfig) -> Self {
        Self {
            synthesizer,
            compositor: Arc::new(TextCompositor::new(config.clone())),
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub async fn run(&self, title: &str, dest: &Path) -> Result<PathBuf> {
        let result = self.run_inner(title, dest).await;
        if let Err(e) = &result {
            warn!("Thumbnail workflow for '{}' failed: {}", title, e);
            if dest.exists() {
                let _ = std::fs::remove_file(dest);
            }
        }
        result
    }

    async fn run_inner(&self, title: &str, dest: &Path) -> Result<PathBuf> {
        let prompt = build_prompt(title);
        let base = TempImage::new_in(&self.temp_dir);

        self.synthesizer.synthesize(&prompt, base.path()).await?;
        info!(
            "Base image ready from {} backend at {}",
            self.synthesizer.name(),
            base.path().display()
        );

        // `base` moves into the blocking task and is removed when it finishes.
        let compositor = self.compositor.clone();
        let title = title.to_string();
        let dest = dest.to_path_buf();
        let cancel = CancelOnDrop::default();
        let cancelled = cancel.flag();
        let task = tokio::task::spawn_blocking(move || {
            let encoded = compositor.encode(base.path(), &title, output_format(&dest))?;
            save_unless_cancelled(&cancelled, &dest, &encoded)
        });
        let result = task
            .await
            .map_err(|e| ThumbnailError::Internal(format!("compositing task failed: {}", e)))?;
        cancel.disarm();
        result
    }
}

/// Raises its flag when dropped before [`CancelOnDrop::disarm`], e.g. when the
/// request future awaiting the blocking task is dropped on client disconnect.
#[derive(Debug)]
pub(crate) struct CancelOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl CancelOnDrop {
    fn flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Default for CancelOnDrop {
    fn default() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            armed: true,
        }
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

/// Writes the finished thumbnail unless the caller has gone away.
pub(crate) fn save_unless_cancelled(
    cancelled: &AtomicBool,
    dest: &Path,
    encoded: &[u8],
) -> Result<PathBuf> {
    if cancelled.load(Ordering::SeqCst) {
        info!("Request for {} was cancelled, discarding thumbnail", dest.display());
        return Err(ThumbnailError::Internal("request cancelled".into()));
    }
    atomic_save_file(dest, encoded)?;
    info!("Final thumbnail saved to {}", dest.display());
    Ok(dest.to_path_buf())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::synthesis::SynthesisConfig;
    use crate::service::prompt::Prompt;
    use crate::service::synthesizer;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;
    use tempfile::TempDir;

    const FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/fonts/DejaVuSans-Bold.ttf");

    /// Writes a solid 1024x512 image and records every prompt and path it saw.
    #[derive(Default)]
    pub(crate) struct SolidColorSynthesizer {
        pub prompts: Mutex<Vec<String>>,
        pub paths: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl ImageSynthesizer for SolidColorSynthesizer {
        async fn synthesize(&self, prompt: &Prompt, dest: &Path) -> Result<PathBuf> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.paths.lock().unwrap().push(dest.to_path_buf());
            RgbImage::from_pixel(1024, 512, Rgb([90, 30, 120]))
                .save(dest)
                .map_err(|e| ThumbnailError::WriteFailed(e.to_string()))?;
            Ok(dest.to_path_buf())
        }

        fn name(&self) -> &'static str {
            "solid-color"
        }
    }

    pub(crate) fn test_config(temp_dir: &Path) -> ThumbnailConfig {
        ThumbnailConfig {
            font_path: PathBuf::from(FONT),
            temp_dir: temp_dir.to_path_buf(),
            ..ThumbnailConfig::default()
        }
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_end_to_end_with_stub() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let stub = Arc::new(SolidColorSynthesizer::default());
        let workflow = ThumbnailWorkflow::new(stub.clone(), &test_config(temp.path()));
        let dest = out.path().join("thumb.png");

        let path = workflow.run("The Rise of Generative AI", &dest).await.unwrap();

        assert_eq!(path, dest);
        assert!(stub.prompts.lock().unwrap()[0].contains("artificial intelligence, neural network"));
        let result = image::open(&dest).unwrap().to_rgb8();
        assert_eq!(result.dimensions(), (1024, 512));
        let base = RgbImage::from_pixel(1024, 512, Rgb([90, 30, 120]));
        assert_ne!(result, base);
        assert_eq!(entries(temp.path()), 0);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_independent() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let stub = Arc::new(SolidColorSynthesizer::default());
        let workflow = ThumbnailWorkflow::new(stub.clone(), &test_config(temp.path()));
        let first = out.path().join("first.png");
        let second = out.path().join("second.png");

        let (a, b) = tokio::join!(
            workflow.run("Docker Deep Dive", &first),
            workflow.run("Docker Deep Dive", &second)
        );
        a.unwrap();
        b.unwrap();

        assert!(image::open(&first).is_ok());
        assert!(image::open(&second).is_ok());
        let paths = stub.paths.lock().unwrap().clone();
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0], paths[1]);
        assert_eq!(entries(temp.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_leaves_nothing() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let synthesizer = synthesizer::from_config(&SynthesisConfig::default()).unwrap();
        let workflow = ThumbnailWorkflow::new(synthesizer, &test_config(temp.path()));
        let dest = out.path().join("thumb.png");

        let err = workflow.run("Anything", &dest).await.unwrap_err();

        assert!(matches!(err, ThumbnailError::MissingCredential));
        assert!(!dest.exists());
        assert_eq!(entries(temp.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_font_cleans_up_base_image() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let stub = Arc::new(SolidColorSynthesizer::default());
        let config = ThumbnailConfig {
            font_path: temp.path().join("Missing.ttf"),
            ..test_config(temp.path())
        };
        let workflow = ThumbnailWorkflow::new(stub.clone(), &config);
        let dest = out.path().join("thumb.png");

        let err = workflow.run("Docker", &dest).await.unwrap_err();

        assert!(matches!(err, ThumbnailError::AssetUnavailable(_)));
        assert_eq!(stub.paths.lock().unwrap().len(), 1);
        assert!(!dest.exists());
        assert_eq!(entries(temp.path()), 0);
    }

    #[test]
    fn test_cancelled_request_writes_nothing() {
        let out = TempDir::new().unwrap();
        let dest = out.path().join("thumb.png");

        let err = save_unless_cancelled(&AtomicBool::new(true), &dest, b"png").unwrap_err();

        assert!(matches!(err, ThumbnailError::Internal(_)));
        assert!(!dest.exists());
        assert_eq!(entries(out.path()), 0);

        save_unless_cancelled(&AtomicBool::new(false), &dest, b"png").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"png");
    }

    #[test]
    fn test_dropped_guard_raises_flag() {
        let dropped = CancelOnDrop::default();
        let flag = dropped.flag();
        drop(dropped);
        assert!(flag.load(Ordering::SeqCst));

        let finished = CancelOnDrop::default();
        let flag = finished.flag();
        finished.disarm();
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_abandoned_run_leaves_no_output() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let stub = Arc::new(SolidColorSynthesizer::default());
        let workflow = ThumbnailWorkflow::new(stub.clone(), &test_config(temp.path()));
        let dest = out.path().join("thumb.png");

        // Drop the run as soon as the blocking compositing task has started.
        let run = workflow.run("The Rise of Generative AI", &dest);
        tokio::select! {
            _ = run => panic!("run finished before being abandoned"),
            _ = async {
                while stub.paths.lock().unwrap().is_empty() {
                    tokio::task::yield_now().await;
                }
            } => {}
        }

        // The base image is removed once the detached blocking task returns.
        tokio::time::timeout(std::time::Duration::from_secs(30), async {
            while entries(temp.path()) > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap();
        assert!(!dest.exists());
        assert_eq!(entries(out.path()), 0);
    }
}
