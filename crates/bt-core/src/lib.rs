pub mod coords;
pub mod generation;
pub mod id;
pub mod model;
pub mod queue;
pub mod tags;
pub mod wire;
pub mod working_set;

pub use coords::{ContainerRect, CoordinateMapper, NaturalSize, normalize, normalize_rect};
pub use generation::{Generation, GenerationCounter, RequestTicket};
pub use id::{DraftId, ImageId, RemoteId};
pub use model::*;
pub use queue::ImageQueue;
pub use tags::TagVocabulary;
pub use wire::{AnnotationPayload, CreateAnnotationRequest, ImagePage, RemoteAnnotation, UNTAGGED};
pub use working_set::{AnnotationWorkingSet, WorkingSetMutation};
