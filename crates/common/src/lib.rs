/**
 * The component contract every pipeline step implements,
 *  and the role a resolved step plays.
 */
pub mod component;
/**
 * Upload and download pipelines, plus the named
 *  definitions the service stores and builds them from.
 */
pub mod pipeline;
/**
 * Name keyed lookup that turns (role, name, params)
 *  into a live component.
 */
pub mod registry;
/**
 * Shadow URL codec. Serializes a finished upload
 *  pipeline into a single path-safe string and
 *  parses it back into the matching download steps.
 */
pub mod shadow_url;
/**
 * Built-in sinks and sources: in-memory, pastebin,
 *  dropbox and plain HTTP.
 */
pub mod storage;
/**
 * Built-in reversible transforms: AES-CBC,
 *  ChaCha20-Poly1305, base64 and ROT13.
 */
pub mod transform;

pub mod prelude {
    pub use crate::component::{Component, Params, Role, Step};
    pub use crate::pipeline::{
        ComponentDefinition, DefinitionError, DownloadPipeline, PipelineDefinition, PipelineError,
        PipelineStateError, UploadPipeline,
    };
    pub use crate::registry::{Registry, ResolveError};
    pub use crate::shadow_url::{CodecError, StepToken};
    pub use crate::storage::{MemoryStore, Sink, Source, StorageError};
    pub use crate::transform::{TransformError, Transformer};
}
