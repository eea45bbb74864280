//! Create meme use case implementation.

use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::application::dto::CreateMemeResponse;
use crate::application::services::ArtifactCache;
use crate::domain::entities::{ArtifactName, CacheKey, ContentHash, Noun, Size};
use crate::domain::errors::{MemeError, MemeResult};
use crate::domain::ports::CaptionRenderer;
use crate::domain::services::{FrameCompositor, caption_anchor};
use crate::infrastructure::image::{AddressedImage, encode_gif, encode_mask_png};

/// Turns a decoded upload and a noun into a cached shaking-caption GIF.
#[derive(Clone)]
pub struct CreateMemeUseCase {
    renderer: Arc<dyn CaptionRenderer>,
    cache: Arc<ArtifactCache>,
    compositor: FrameCompositor,
    debug_masks: bool,
}

struct Rendered {
    gif: Vec<u8>,
    mask_png: Option<Vec<u8>>,
}

impl CreateMemeUseCase {
    /// Creates new create meme use case.
    #[must_use]
    pub const fn new(
        renderer: Arc<dyn CaptionRenderer>,
        cache: Arc<ArtifactCache>,
        compositor: FrameCompositor,
        debug_masks: bool,
    ) -> Self {
        Self {
            renderer,
            cache,
            compositor,
            debug_masks,
        }
    }

    /// Returns the artifact for this upload and noun, producing it on a miss.
    ///
    /// # Errors
    /// Returns [`MemeError::DegenerateGeometry`] for images too small to
    /// shake, otherwise rendering, encoding, storage or task errors.
    pub async fn execute(
        &self,
        noun: Noun,
        upload: AddressedImage,
    ) -> MemeResult<CreateMemeResponse> {
        let key = CacheKey::new(upload.hash, noun);
        let name = key.artifact_name();
        debug!(artifact = %name, "Creating meme");

        let lookup = self
            .cache
            .get_or_create(&key, || self.produce(&key, upload))
            .await?;

        if lookup.is_hit() {
            info!(artifact = %name, "Served cached meme");
        }

        Ok(CreateMemeResponse::new(
            name,
            lookup.path().to_path_buf(),
            lookup.is_hit(),
        ))
    }

    async fn produce(&self, key: &CacheKey, upload: AddressedImage) -> MemeResult<Vec<u8>> {
        let renderer = Arc::clone(&self.renderer);
        let compositor = self.compositor;
        let caption = key.noun().caption();
        let seed = key.hash();
        let debug_masks = self.debug_masks;

        let rendered = tokio::task::spawn_blocking(move || {
            render_animation(
                renderer.as_ref(),
                compositor,
                &caption,
                seed,
                &upload.image,
                debug_masks,
            )
        })
        .await
        .map_err(|e| MemeError::task(e.to_string()))??;

        if let Some(png) = rendered.mask_png {
            self.store_mask(&key.artifact_name(), png).await;
        }

        Ok(rendered.gif)
    }

    async fn store_mask(&self, name: &ArtifactName, png: Vec<u8>) {
        let companion = name.mask_companion();
        match self.cache.store().put(&companion, png).await {
            Ok(path) => debug!(path = %path.display(), "Stored caption mask"),
            Err(e) => warn!(
                mask = %companion,
                error = &e as &(dyn std::error::Error + 'static),
                "Failed to store caption mask"
            ),
        }
    }
}

fn render_animation(
    renderer: &dyn CaptionRenderer,
    compositor: FrameCompositor,
    caption: &str,
    seed: ContentHash,
    image: &DynamicImage,
    debug_masks: bool,
) -> MemeResult<Rendered> {
    let crop = compositor.crop_size(Size::new(image.width(), image.height()))?;
    let source = image.to_rgba8();

    let mask = renderer.render(caption, crop.caption_mask())?;
    let anchor = caption_anchor(crop, mask.advance());
    debug!(
        caption,
        advance = mask.advance(),
        x = anchor.x,
        y = anchor.y,
        "Placed caption"
    );

    let frames = compositor.compose(&source, &mask, anchor, seed)?;
    let gif = encode_gif(&frames)?;
    let mask_png = if debug_masks {
        Some(encode_mask_png(&mask)?)
    } else {
        None
    };

    Ok(Rendered { gif, mask_png })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::codecs::gif::GifDecoder;
    use image::codecs::jpeg::JpegEncoder;
    use image::{AnimationDecoder, Rgb, RgbImage};
    use tempfile::TempDir;

    use crate::domain::ports::mocks::MockCaptionRenderer;
    use crate::domain::services::CompositorSettings;
    use crate::infrastructure::image::{ContentAddresser, DEFAULT_UPLOAD_LIMIT};
    use crate::infrastructure::storage::FsArtifactStore;

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 90])
        });
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, 90)
            .encode_image(&img)
            .unwrap();
        out
    }

    fn upload(bytes: &[u8]) -> AddressedImage {
        ContentAddresser::address_reader(bytes, DEFAULT_UPLOAD_LIMIT).unwrap()
    }

    struct Fixture {
        _dir: TempDir,
        root: std::path::PathBuf,
        renderer: Arc<MockCaptionRenderer>,
        use_case: CreateMemeUseCase,
    }

    async fn fixture(debug_masks: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("work");
        let store = FsArtifactStore::new(root.clone()).await.unwrap();
        let cache = Arc::new(ArtifactCache::new(Arc::new(store)));
        let renderer = Arc::new(MockCaptionRenderer::default());
        let use_case = CreateMemeUseCase::new(
            renderer.clone(),
            cache,
            FrameCompositor::new(CompositorSettings::default()),
            debug_masks,
        );
        Fixture {
            _dir: dir,
            root,
            renderer,
            use_case,
        }
    }

    fn gif_count(root: &std::path::Path) -> usize {
        std::fs::read_dir(root)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".gif"))
            .count()
    }

    #[tokio::test]
    async fn test_cat_scenario() {
        let fx = fixture(false).await;
        let bytes = jpeg(200, 200);
        let upload = upload(&bytes);
        let hash = upload.hash;

        let response = fx
            .use_case
            .execute(Noun::parse("cat").unwrap(), upload)
            .await
            .unwrap();

        assert_eq!(response.name.as_str(), format!("{hash}-cat.gif"));
        assert_eq!(response.location(), format!("/img/{hash}-cat.gif"));
        assert!(!response.cache_hit);
        assert_eq!(response.path, fx.root.join(response.name.as_str()));

        let gif = std::fs::read(&response.path).unwrap();
        assert!(gif.starts_with(b"GIF89a"));
        let frames = GifDecoder::new(Cursor::new(gif))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(frames.len(), 10);
        for frame in &frames {
            assert_eq!(frame.buffer().dimensions(), (180, 180));
            assert_eq!(frame.delay().numer_denom_ms(), (50, 1));
        }
        assert_eq!(fx.renderer.calls(), 1);
    }

    #[tokio::test]
    async fn test_reupload_is_a_cache_hit() {
        let fx = fixture(false).await;
        let bytes = jpeg(120, 90);

        let first = fx
            .use_case
            .execute(Noun::parse("dog").unwrap(), upload(&bytes))
            .await
            .unwrap();
        let second = fx
            .use_case
            .execute(Noun::parse("dog").unwrap(), upload(&bytes))
            .await
            .unwrap();

        assert_eq!(first.name, second.name);
        assert!(second.cache_hit);
        assert_eq!(fx.renderer.calls(), 1);
        assert_eq!(gif_count(&fx.root), 1);
    }

    #[tokio::test]
    async fn test_same_image_different_noun_is_a_new_artifact() {
        let fx = fixture(false).await;
        let bytes = jpeg(64, 64);

        let cat = fx
            .use_case
            .execute(Noun::parse("cat").unwrap(), upload(&bytes))
            .await
            .unwrap();
        let dog = fx
            .use_case
            .execute(Noun::parse("dog").unwrap(), upload(&bytes))
            .await
            .unwrap();

        assert_ne!(cat.name, dog.name);
        assert_eq!(fx.renderer.calls(), 2);
        assert_eq!(gif_count(&fx.root), 2);
    }

    #[tokio::test]
    async fn test_too_small_image_is_rejected_without_artifact() {
        let fx = fixture(false).await;

        let err = fx
            .use_case
            .execute(Noun::parse("ant").unwrap(), upload(&jpeg(20, 200)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MemeError::DegenerateGeometry {
                width: 20,
                height: 200,
                shake: 20
            }
        ));
        assert!(err.is_client_error());
        assert_eq!(fx.renderer.calls(), 0);
        assert_eq!(gif_count(&fx.root), 0);
    }

    #[tokio::test]
    async fn test_debug_masks_are_stored_next_to_artifact() {
        let fx = fixture(true).await;

        let response = fx
            .use_case
            .execute(Noun::parse("cat").unwrap(), upload(&jpeg(100, 100)))
            .await
            .unwrap();

        let mask_path = fx.root.join(response.name.mask_companion().as_str());
        let mask = image::open(&mask_path).unwrap();
        assert_eq!((mask.width(), mask.height()), (64, 12));
    }
}
