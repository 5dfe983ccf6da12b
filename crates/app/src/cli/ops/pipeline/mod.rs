use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use common::prelude::PipelineDefinition;

pub mod create;
pub mod delete;
pub mod list;
pub mod update;

use crate::cli::op::Op;

crate::command_enum! {
    (List, list::List),
    (Create, create::Create),
    (Update, update::Update),
    (Delete, delete::Delete),
}

pub type PipelineCommand = Command;

/// Manage stored pipeline definitions
#[derive(Args, Debug, Clone)]
pub struct Pipeline {
    #[command(subcommand)]
    pub command: PipelineCommand,
}

#[async_trait::async_trait]
impl Op for Pipeline {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DefinitionFileError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("{0} is not a pipeline definition: {1}")]
    Parse(PathBuf, serde_json::Error),
}

/// Load a JSON pipeline definition from disk
pub async fn read_definition(path: &Path) -> Result<PipelineDefinition, DefinitionFileError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| DefinitionFileError::Read(path.to_path_buf(), e))?;
    serde_json::from_slice(&raw).map_err(|e| DefinitionFileError::Parse(path.to_path_buf(), e))
}

fn summarize(definition: &PipelineDefinition) -> String {
    let steps = definition
        .components
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" -> ");
    format!("{} ({})", definition.name, steps)
}
