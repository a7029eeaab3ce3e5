use crate::domain::av::concat::{concatenate, ConcatMode, Playlist};
use crate::domain::av::preprocess::{preprocess, CaptionStyle};
use crate::domain::av::probe;
use crate::domain::av::title_card::{self, TitleCard};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::jobs::{Clip, MergeRequest, Upload};
use crate::domain::timestamp::RunningTimestamp;
use crate::domain::workspace::{
    original_file, processed_file, Workspace, WorkspaceId, OUTPUT_FILE, TITLE_CARD_FILE,
};
use crate::ports::command::CommandRunner;
use crate::ports::storage::StoragePort;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Directory under which every workspace is created
    pub workspace_root: PathBuf,
    pub font_file: Option<PathBuf>,
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    pub workspace: WorkspaceId,
    /// `{workspace}/output.mp4`, relative to the workspace root
    pub download_path: String,
    pub output_path: PathBuf,
    /// Segment names in concatenation order
    pub playlist: Vec<String>,
    /// Caption burned into each clip, in clip order
    pub captions: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    WorkspaceCreated,
    Staged,
    TitleCardReady,
    Probed(usize),
    Preprocessed(usize),
    PlaylistWritten,
    Concatenated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::WorkspaceCreated => write!(f, "workspace_created"),
            Stage::Staged => write!(f, "staged"),
            Stage::TitleCardReady => write!(f, "title_card_ready"),
            Stage::Probed(n) => write!(f, "probed_{}", n),
            Stage::Preprocessed(n) => write!(f, "preprocessed_{}", n),
            Stage::PlaylistWritten => write!(f, "playlist_written"),
            Stage::Concatenated => write!(f, "concatenated"),
        }
    }
}

pub struct OrchestratorService<S, C> {
    storage: S,
    runner: C,
    settings: PipelineSettings,
}

impl<S, C> OrchestratorService<S, C>
where
    S: StoragePort,
    C: CommandRunner,
{
    pub fn new(storage: S, runner: C, settings: PipelineSettings) -> Self {
        Self {
            storage,
            runner,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs the whole merge. Failures are logged here and returned as is; the
    /// workspace and any partial artifacts stay on disk for the janitor.
    pub async fn handle_merge(&self, request: MergeRequest) -> PipelineResult<MergeOutput> {
        let clip_count = request.uploads.len();
        match self.merge(request).await {
            Ok(output) => {
                info!(
                    workspace = %output.workspace,
                    clips = clip_count,
                    output = %output.download_path,
                    "videos processed"
                );
                Ok(output)
            }
            Err(e) => {
                error!(kind = ?e.kind(), error = %e, "video processing failed");
                Err(e)
            }
        }
    }

    async fn merge(&self, request: MergeRequest) -> PipelineResult<MergeOutput> {
        if request.uploads.is_empty() {
            return Err(PipelineError::Validation("no videos uploaded".to_string()));
        }
        let mut clock = match request.started_at.as_deref() {
            Some(seed) => RunningTimestamp::parse(seed)?,
            None => RunningTimestamp::now(),
        };
        let intro = request
            .intro
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());

        let workspace = Workspace::create(&self.settings.workspace_root).await?;
        let ws = workspace.id().clone();
        info!(workspace = %ws, stage = %Stage::WorkspaceCreated, clips = request.uploads.len());

        let clips = self.stage(&workspace, &request.uploads).await?;
        info!(workspace = %ws, stage = %Stage::Staged);

        let mut playlist = Playlist::new();
        if let Some(text) = intro {
            let card = TitleCard::new(text).with_font_file(self.settings.font_file.clone());
            title_card::generate(&self.runner, &card, &workspace.path_of(TITLE_CARD_FILE)).await?;
            playlist.push(TITLE_CARD_FILE);
            info!(workspace = %ws, stage = %Stage::TitleCardReady);
        }

        let style = CaptionStyle {
            font_file: self.settings.font_file.clone(),
            ..CaptionStyle::default()
        };
        let mut captions = Vec::with_capacity(clips.len());
        for clip in &clips {
            let seconds = probe::duration(&self.runner, &clip.path).await?;
            // The caption printed on a clip is the clock after that clip's own duration.
            clock = clock.advanced_by(seconds)?;
            let caption = clock.to_string();
            info!(workspace = %ws, stage = %Stage::Probed(clip.index), seconds, caption = %caption);

            let processed = processed_file(clip.index);
            preprocess(
                &self.runner,
                &style,
                &caption,
                &clip.path,
                &workspace.path_of(&processed),
            )
            .await?;
            info!(workspace = %ws, stage = %Stage::Preprocessed(clip.index));

            playlist.push(processed);
            captions.push(caption);
        }

        let list_path = playlist.write(&workspace).await?;
        info!(workspace = %ws, stage = %Stage::PlaylistWritten, entries = playlist.len());

        let mode = if intro.is_some() {
            ConcatMode::WithTitleCard
        } else {
            ConcatMode::ClipsOnly
        };
        let output_path = workspace.path_of(OUTPUT_FILE);
        concatenate(&self.runner, &list_path, &output_path, mode).await?;
        info!(workspace = %ws, stage = %Stage::Concatenated);

        Ok(MergeOutput {
            download_path: workspace.relative(OUTPUT_FILE),
            workspace: ws,
            output_path,
            playlist: playlist.entries().to_vec(),
            captions,
        })
    }

    /// Copies each upload to `original_{n}.{ext}` in upload order.
    async fn stage(&self, workspace: &Workspace, uploads: &[Upload]) -> PipelineResult<Vec<Clip>> {
        let mut clips = Vec::with_capacity(uploads.len());
        for (i, upload) in uploads.iter().enumerate() {
            let index = i + 1;
            let path = workspace.path_of(&original_file(index, &upload.extension));
            self.storage
                .download(&upload.source.to_string_lossy(), &path)
                .await
                .map_err(|e| {
                    PipelineError::storage(
                        format!("stage {}", upload.file_name),
                        std::io::Error::other(e),
                    )
                })?;
            clips.push(Clip {
                original_name: upload.file_name.clone(),
                extension: upload.extension.clone(),
                path,
                index,
            });
        }
        Ok(clips)
    }
}
