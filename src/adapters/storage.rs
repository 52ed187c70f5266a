use crate::domain::model::{FrameKind, OutputFormat};
use crate::domain::ports::FrameStore;
use crate::utils::error::{EleganceError, Result};
use image::{ColorType, DynamicImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when reading a frame.
pub const READ_EXTENSIONS: [&str; 2] = ["jpeg", "png"];

/// Frames on the local filesystem, laid out as
/// `<root>/images/<kind>/frame_NNNNNN.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalFrameStore {
    root: PathBuf,
}

impl LocalFrameStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind_dir(&self, kind: FrameKind) -> PathBuf {
        self.root.join("images").join(kind.as_str())
    }

    pub fn frame_file_name(frame: u32, extension: &str) -> String {
        format!("frame_{:06}.{}", frame, extension)
    }

    pub fn frame_path(&self, frame: u32, kind: FrameKind, extension: &str) -> PathBuf {
        self.kind_dir(kind).join(Self::frame_file_name(frame, extension))
    }

    fn candidate_paths(&self, frame: u32, kind: FrameKind) -> Vec<PathBuf> {
        READ_EXTENSIONS
            .iter()
            .map(|ext| self.frame_path(frame, kind, ext))
            .collect()
    }

    fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        // JPEG only takes 8-bit gray or RGB
        let normalized = match image.color() {
            ColorType::L8 | ColorType::Rgb8 => None,
            ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                Some(DynamicImage::ImageLuma8(image.to_luma8()))
            }
            _ if format == OutputFormat::Jpeg => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
            _ => None,
        };

        let mut buffer = Cursor::new(Vec::new());
        normalized
            .as_ref()
            .unwrap_or(image)
            .write_to(&mut buffer, format.image_format())?;
        Ok(buffer.into_inner())
    }
}

impl FrameStore for LocalFrameStore {
    async fn read_frame(&self, frame: u32, kind: FrameKind) -> Result<DynamicImage> {
        let candidates = self.candidate_paths(frame, kind);

        for path in &candidates {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                tracing::trace!("Reading frame {}", path.display());
                let data = tokio::fs::read(path).await?;
                return Ok(image::load_from_memory(&data)?);
            }
        }

        Err(EleganceError::FrameNotFound {
            frame,
            kind: kind.to_string(),
            searched: candidates,
        })
    }

    async fn write_frame(
        &self,
        frame: u32,
        kind: FrameKind,
        image: &DynamicImage,
        format: OutputFormat,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(self.kind_dir(kind)).await?;

        let path = self.frame_path(frame, kind, format.extension());
        let data = Self::encode(image, format)?;
        tokio::fs::write(&path, data).await?;

        // A leftover frame in another format would shadow this one on read.
        for ext in READ_EXTENSIONS
            .iter()
            .filter(|ext| **ext != format.extension())
        {
            let stale = self.frame_path(frame, kind, ext);
            match tokio::fs::remove_file(&stale).await {
                Ok(()) => tracing::debug!("Removed stale frame {}", stale.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(path)
    }

    async fn frame_exists(&self, frame: u32, kind: FrameKind) -> bool {
        for path in self.candidate_paths(frame, kind) {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return true;
            }
        }
        false
    }

    async fn read_artifact(&self, name: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.root.join(name)).await?;
        Ok(data)
    }

    async fn write_artifact(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let full_path = self.root.join(name);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path)
    }
}
