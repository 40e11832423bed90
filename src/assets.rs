//! # Assets Module
//!
//! Posters and soundtracks are read from disk at runtime, relative to the
//! working directory. Nothing here is fatal: a poster that fails to decode
//! becomes a flat placeholder colour and a clip that fails to load is simply
//! never played. Both failures are logged with `warn!`.

use crate::game::entity::ClipId;
use image::RgbaImage;
use kira::sound::static_sound::StaticSoundData;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Failure to load a single asset file.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to load audio {path}: {source}")]
    Audio {
        path: PathBuf,
        #[source]
        source: kira::sound::FromFileError,
    },
}

/// What a material samples: a decoded poster or a flat colour.
#[derive(Debug, Clone)]
pub enum PosterSurface {
    Texture(RgbaImage),
    Placeholder([u8; 3]),
}

impl PosterSurface {
    /// Width, height and RGBA bytes ready for a texture upload.
    pub fn to_rgba(&self) -> (u32, u32, Vec<u8>) {
        match self {
            PosterSurface::Texture(image) => (image.width(), image.height(), image.to_vec()),
            PosterSurface::Placeholder([r, g, b]) => (1, 1, vec![*r, *g, *b, 255]),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PosterSurface::Placeholder(_))
    }
}

pub fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
    image::open(path)
        .map(|image| image.to_rgba8())
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the poster at `path`, falling back to `placeholder` on any error.
pub fn load_surface(path: &Path, placeholder: [u8; 3]) -> PosterSurface {
    match load_image(path) {
        Ok(image) => {
            tracing::debug!("loaded poster {} ({}x{})", path.display(), image.width(), image.height());
            PosterSurface::Texture(image)
        }
        Err(err) => {
            tracing::warn!("{err}, using a flat placeholder");
            PosterSurface::Placeholder(placeholder)
        }
    }
}

pub fn load_clip(path: &Path) -> Result<StaticSoundData, AssetError> {
    StaticSoundData::from_file(path).map_err(|source| AssetError::Audio {
        path: path.to_path_buf(),
        source,
    })
}

/// Result of decoding one soundtrack in the background.
pub type ClipLoad = (ClipId, Result<StaticSoundData, AssetError>);

/// Decodes every clip on its own thread and streams the results back.
///
/// The receiver yields exactly one message per source, in completion order.
/// Dropping it early is fine; the loader threads just discard their result.
pub fn spawn_clip_loader(sources: Vec<(ClipId, PathBuf)>) -> Receiver<ClipLoad> {
    let (sender, receiver) = mpsc::channel();
    for (clip, path) in sources {
        let sender = sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("clip-loader-{}", clip.0))
            .spawn(move || {
                let _ = sender.send((clip, load_clip(&path)));
            });
        if let Err(err) = spawned {
            tracing::warn!("could not start loader thread for clip {}: {err}", clip.0);
        }
    }
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// A poster that does not exist yields its placeholder colour.
    #[test]
    fn test_missing_poster_becomes_placeholder() {
        let surface = load_surface(Path::new("no/such/poster.webp"), [10, 20, 30]);
        assert!(surface.is_placeholder());
        assert_eq!(surface.to_rgba(), (1, 1, vec![10, 20, 30, 255]));
    }

    /// Every requested clip reports back, even when loading fails.
    #[test]
    fn test_clip_loader_reports_each_source() {
        let receiver = spawn_clip_loader(vec![
            (ClipId(0), PathBuf::from("no/such/a.mp3")),
            (ClipId(1), PathBuf::from("no/such/b.mp3")),
        ]);
        let mut seen = Vec::new();
        for _ in 0..2 {
            let (clip, result) = receiver
                .recv_timeout(Duration::from_secs(5))
                .expect("loader reply");
            assert!(matches!(result, Err(AssetError::Audio { .. })));
            seen.push(clip.0);
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1]);
    }
}
