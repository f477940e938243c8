pub mod chat_view;
pub mod session_list;
pub mod staged_files;

pub use chat_view::ChatView;
pub use session_list::{SessionList, SessionSummary};
pub use staged_files::StagedFiles;
