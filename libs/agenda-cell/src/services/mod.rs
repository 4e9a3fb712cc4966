pub mod backend;
pub mod normalize;
pub mod reconciler;
pub mod sequence;
pub mod slots;
pub mod taxonomy;

pub use backend::ApiAgendaBackend;
pub use reconciler::{AgendaApi, AgendaReconciler};
pub use sequence::RequestSequencer;
