//! Region screen capture through external tools.
//!
//! The first installed tool wins. Each lets the user drag a rectangle and
//! writes a PNG to the capture path; a missing file afterwards means the
//! selection was cancelled.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use sage_core::command::path::resolve_on_path;
use sage_core::system::ScreenCapture;
use sage_types::error::ExecutionError;
use sage_types::llm::ImageAttachment;

/// A supported capture tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTool {
    GnomeScreenshot,
    Scrot,
    Maim,
    /// `grim` with a region chosen by `slurp` (Wayland).
    GrimSlurp,
}

impl CaptureTool {
    pub const ALL: [CaptureTool; 4] = [
        CaptureTool::GnomeScreenshot,
        CaptureTool::Scrot,
        CaptureTool::Maim,
        CaptureTool::GrimSlurp,
    ];

    pub fn program(self) -> &'static str {
        match self {
            CaptureTool::GnomeScreenshot => "gnome-screenshot",
            CaptureTool::Scrot => "scrot",
            CaptureTool::Maim => "maim",
            CaptureTool::GrimSlurp => "grim",
        }
    }

    fn is_installed(self) -> bool {
        let found = resolve_on_path(self.program()).is_some();
        match self {
            CaptureTool::GrimSlurp => found && resolve_on_path("slurp").is_some(),
            _ => found,
        }
    }

    /// Arguments for a single region capture into `output`.
    pub fn args(self, output: &Path) -> Vec<String> {
        let out = output.display().to_string();
        match self {
            CaptureTool::GnomeScreenshot => vec!["-a".to_string(), "-f".to_string(), out],
            CaptureTool::Scrot | CaptureTool::Maim => vec!["-s".to_string(), out],
            CaptureTool::GrimSlurp => vec![out],
        }
    }
}

/// Captures a user-selected screen region to a fixed file.
pub struct ExternalScreenCapture {
    output: PathBuf,
}

impl ExternalScreenCapture {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    async fn run(&self, tool: CaptureTool) -> Result<(), ExecutionError> {
        let spawn_err = |program: &str, err: std::io::Error| ExecutionError::Spawn {
            program: program.to_string(),
            reason: err.to_string(),
        };

        let mut command = tokio::process::Command::new(tool.program());
        if tool == CaptureTool::GrimSlurp {
            let region = tokio::process::Command::new("slurp")
                .output()
                .await
                .map_err(|e| spawn_err("slurp", e))?;
            if !region.status.success() {
                return Err(ExecutionError::CaptureCancelled);
            }
            let geometry = String::from_utf8_lossy(&region.stdout).trim().to_string();
            command.arg("-g").arg(geometry);
        }

        let status = command
            .args(tool.args(&self.output))
            .status()
            .await
            .map_err(|e| spawn_err(tool.program(), e))?;

        if !status.success() {
            tracing::debug!(tool = tool.program(), ?status, "capture tool exited unsuccessfully");
            return Err(ExecutionError::CaptureCancelled);
        }
        Ok(())
    }
}

impl ScreenCapture for ExternalScreenCapture {
    async fn capture(&self) -> Result<PathBuf, ExecutionError> {
        let tool = CaptureTool::ALL
            .into_iter()
            .find(|tool| tool.is_installed())
            .ok_or_else(|| {
                let names: Vec<_> = CaptureTool::ALL.iter().map(|t| t.program()).collect();
                ExecutionError::CaptureUnavailable(names.join(", "))
            })?;

        if let Some(parent) = self.output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExecutionError::Spawn {
                    program: tool.program().to_string(),
                    reason: e.to_string(),
                })?;
        }
        // A stale file from a previous capture must not pass for a new one.
        let _ = tokio::fs::remove_file(&self.output).await;

        tracing::info!(tool = tool.program(), "starting region capture");
        self.run(tool).await?;

        match tokio::fs::try_exists(&self.output).await {
            Ok(true) => Ok(self.output.clone()),
            _ => Err(ExecutionError::CaptureCancelled),
        }
    }
}

/// Read an image file into a base64 attachment.
pub async fn load_attachment(path: &Path) -> std::io::Result<ImageAttachment> {
    let bytes = tokio::fs::read(path).await?;
    Ok(ImageAttachment {
        media_type: media_type_for(path).to_string(),
        data_base64: STANDARD.encode(bytes),
    })
}

fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
