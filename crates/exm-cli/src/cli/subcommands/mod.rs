mod ai;
mod auth;
mod exam;
mod goal;
mod question;

pub use ai::AiCommands;
pub use auth::AuthCommands;
pub use exam::ExamCommands;
pub use goal::GoalCommands;
pub use question::QuestionCommands;
