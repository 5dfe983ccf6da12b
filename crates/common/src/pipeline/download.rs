use crate::component::{Role, Step};
use crate::registry::Registry;
use crate::shadow_url;

use super::{PipelineError, PipelineStateError, StepError};

/// A source followed by transformers that are undone in order.
#[derive(Debug, Clone, Default)]
pub struct DownloadPipeline {
    steps: Vec<Step>,
}

impl DownloadPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `url` and assemble the pipeline it describes.
    pub fn from_url(url: &str, registry: &Registry) -> Result<Self, PipelineError> {
        let steps = shadow_url::decode(url, registry)?;
        let mut pipeline = Self::new();
        pipeline.add_steps(steps)?;
        Ok(pipeline)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a batch of steps. The first step of the pipeline must be a
    /// source, and no source may appear anywhere else.
    pub fn add_steps(&mut self, steps: Vec<Step>) -> Result<(), PipelineStateError> {
        let offset = self.steps.len();
        for (i, step) in steps.iter().enumerate() {
            let position = offset + i;
            match step.role() {
                Role::Source if position == 0 => {}
                Role::Source => return Err(PipelineStateError::SourceNotFirst),
                _ if position == 0 => return Err(PipelineStateError::FirstStepNotSource),
                Role::Transformer => {}
                Role::Sink => {
                    return Err(PipelineStateError::UnexpectedRole {
                        role: Role::Sink,
                        position,
                    })
                }
            }
        }

        self.steps.extend(steps);
        Ok(())
    }

    /// Fetch from the source with its own id, then reverse every
    /// transformer in order.
    pub async fn download(&self) -> Result<Vec<u8>, PipelineError> {
        if self.steps.is_empty() {
            return Err(PipelineStateError::Empty.into());
        }

        let mut data = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, name = step.name(), "download step");
            match step {
                Step::Source(source) => {
                    let id = source_id(step)
                        .ok_or_else(|| PipelineError::step(index, step.name(), StepError::InvalidId))?;
                    data = source
                        .get(&id)
                        .await
                        .map_err(|e| PipelineError::step(index, step.name(), e))?;
                }
                Step::Transformer(transformer) => {
                    data = transformer
                        .reverse(&data)
                        .map_err(|e| PipelineError::step(index, step.name(), e))?;
                }
                // add_steps never lets a sink in
                Step::Sink(_) => {
                    return Err(PipelineStateError::UnexpectedRole {
                        role: Role::Sink,
                        position: index,
                    }
                    .into())
                }
            }
        }

        tracing::info!(steps = self.steps.len(), bytes = data.len(), "download complete");
        Ok(data)
    }
}

fn source_id(step: &Step) -> Option<String> {
    let mut params = step.params();
    if params.len() != 1 {
        return None;
    }
    String::from_utf8(params.remove(0)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn rot(registry: &Registry) -> Step {
        registry.resolve(Role::Transformer, "rot", &[]).unwrap()
    }

    fn mem_source(registry: &Registry, id: &str) -> Step {
        registry
            .resolve(Role::Source, "mem", &[id.as_bytes().to_vec()])
            .unwrap()
    }

    #[test]
    fn test_first_step_must_be_source() {
        let registry = Registry::builtin();
        let mut pipeline = DownloadPipeline::new();
        assert_eq!(
            pipeline.add_steps(vec![rot(&registry)]),
            Err(PipelineStateError::FirstStepNotSource)
        );
        assert!(pipeline.is_empty());

        pipeline.add_steps(vec![mem_source(&registry, "a")]).unwrap();
        pipeline.add_steps(vec![rot(&registry), rot(&registry)]).unwrap();
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn test_source_only_at_position_zero() {
        let registry = Registry::builtin();
        let mut pipeline = DownloadPipeline::new();

        let batch = vec![mem_source(&registry, "a"), rot(&registry), mem_source(&registry, "b")];
        assert_eq!(pipeline.add_steps(batch), Err(PipelineStateError::SourceNotFirst));
        assert!(pipeline.is_empty());

        pipeline.add_steps(vec![mem_source(&registry, "a")]).unwrap();
        assert_eq!(
            pipeline.add_steps(vec![mem_source(&registry, "b")]),
            Err(PipelineStateError::SourceNotFirst)
        );
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_sink_is_rejected() {
        let registry = Registry::builtin();
        let sink = registry.resolve(Role::Sink, "mem", &[]).unwrap();
        let mut pipeline = DownloadPipeline::new();
        pipeline.add_steps(vec![mem_source(&registry, "a")]).unwrap();
        assert_eq!(
            pipeline.add_steps(vec![sink]),
            Err(PipelineStateError::UnexpectedRole {
                role: Role::Sink,
                position: 1
            })
        );
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        assert!(matches!(
            DownloadPipeline::new().download().await,
            Err(PipelineError::State(PipelineStateError::Empty))
        ));
    }

    #[tokio::test]
    async fn test_download_reverses_transforms() {
        let store = MemoryStore::new();
        let id = store.insert(b"uryyb");
        let registry = Registry::with_memory_store(store);

        let mut pipeline = DownloadPipeline::new();
        pipeline
            .add_steps(vec![mem_source(&registry, &id), rot(&registry)])
            .unwrap();

        assert_eq!(pipeline.download().await.unwrap(), b"hello".to_vec());
        // repeatable
        assert_eq!(pipeline.download().await.unwrap(), b"hello".to_vec());
    }

    #[tokio::test]
    async fn test_missing_entry_fails_at_source() {
        let registry = Registry::builtin();
        let mut pipeline = DownloadPipeline::new();
        pipeline
            .add_steps(vec![mem_source(&registry, "gone"), rot(&registry)])
            .unwrap();

        match pipeline.download().await {
            Err(PipelineError::Step { index, name, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(name, "mem");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_ciphertext_fails_at_transformer() {
        let store = MemoryStore::new();
        let id = store.insert(b"short");
        let registry = Registry::with_memory_store(store);
        let aes = registry
            .resolve(Role::Transformer, "aes", &[vec![1u8; 32], vec![2u8; 16]])
            .unwrap();

        let mut pipeline = DownloadPipeline::new();
        pipeline
            .add_steps(vec![mem_source(&registry, &id), aes])
            .unwrap();

        match pipeline.download().await {
            Err(PipelineError::Step { index, name, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(name, "aes");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
