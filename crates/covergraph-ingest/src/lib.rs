//! Graph builders: company knowledge records and user question events in,
//! typed graphs out. Builders are pure functions over immutable snapshots
//! of the source records; graphs are rebuilt wholesale, never patched.

pub mod category;
pub mod company;
pub mod user;

pub use category::{categorize_tags, FALLBACK_CATEGORY};
pub use company::{CompanyGraphBuilder, KnowledgeDoc, ProductRecord};
pub use user::{question_id, QuestionEvent, UserGraphBuilder};
