//! Background texture loading.
//!
//! [`TextureLoader::load`] hands out a [`TextureHandle`] immediately and
//! queues the file for a worker thread, which decodes it to RGBA8. The main
//! thread collects finished images once per frame with
//! [`TextureLoader::drain`]. Nothing blocks on I/O, and a material can
//! reference a handle long before its pixels exist.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How the texels of a texture are encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Color data authored in sRGB (albedo maps).
    Srgb,
    /// Non-color data (normal maps).
    Linear,
}

/// Opaque reference to a texture that may still be loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    id: u32,
    color_space: ColorSpace,
}

impl TextureHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }
}

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} has zero size")]
    Empty { path: PathBuf },

    #[error("texture loader worker is not running")]
    WorkerGone,

    #[error("failed to spawn texture loader thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Decoded RGBA8 pixels, rows tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Outcome of one [`TextureLoader::load`] request.
#[derive(Debug)]
pub struct LoadedTexture {
    pub handle: TextureHandle,
    pub path: PathBuf,
    pub result: Result<DecodedImage, TextureLoadError>,
}

struct LoadRequest {
    handle: TextureHandle,
    path: PathBuf,
}

/// Single-worker image decoder.
pub struct TextureLoader {
    request_tx: Option<Sender<LoadRequest>>,
    result_tx: Sender<LoadedTexture>,
    result_rx: Receiver<LoadedTexture>,
    worker: Option<JoinHandle<()>>,
    next_id: u32,
    pending: usize,
}

impl TextureLoader {
    pub fn new() -> Result<Self, TextureLoadError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let tx = result_tx.clone();
        let worker = std::thread::Builder::new()
            .name("texture-loader".into())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let result = decode(&request.path);
                    let _ = tx.send(LoadedTexture {
                        handle: request.handle,
                        path: request.path,
                        result,
                    });
                }
            })?;

        Ok(Self {
            request_tx: Some(request_tx),
            result_tx,
            result_rx,
            worker: Some(worker),
            next_id: 0,
            pending: 0,
        })
    }

    /// Queue an sRGB color texture.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        self.load_with(path, ColorSpace::Srgb)
    }

    /// Queue a texture with an explicit color space.
    pub fn load_with(&mut self, path: impl AsRef<Path>, color_space: ColorSpace) -> TextureHandle {
        let handle = TextureHandle {
            id: self.next_id,
            color_space,
        };
        self.next_id += 1;
        self.pending += 1;

        let path = path.as_ref().to_path_buf();
        debug!(id = handle.id, path = %path.display(), "texture queued");
        let request = LoadRequest {
            handle,
            path: path.clone(),
        };
        let sent = self
            .request_tx
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            let _ = self.result_tx.send(LoadedTexture {
                handle,
                path,
                result: Err(TextureLoadError::WorkerGone),
            });
        }
        handle
    }

    /// Collect every load that finished since the last call. Failures are
    /// logged here and still returned.
    pub fn drain(&mut self) -> Vec<LoadedTexture> {
        let mut finished = Vec::new();
        while let Ok(loaded) = self.result_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            match &loaded.result {
                Ok(image) => info!(
                    path = %loaded.path.display(),
                    width = image.width,
                    height = image.height,
                    "texture decoded"
                ),
                Err(e) => warn!(
                    path = %loaded.path.display(),
                    error = %e,
                    "texture load failed, keeping placeholder"
                ),
            }
            finished.push(loaded);
        }
        finished
    }

    /// Requests not yet returned by [`drain`](Self::drain).
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Stop the worker after it finishes queued requests.
    pub fn shutdown(&mut self) {
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn decode(path: &Path) -> Result<DecodedImage, TextureLoadError> {
    let image = image::open(path)
        .map_err(|source| TextureLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureLoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}
