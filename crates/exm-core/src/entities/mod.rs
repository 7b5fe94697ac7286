//! Entity structs for Examind domain objects.
//!
//! All structs derive `Serialize` and `Deserialize` with the backend's
//! `snake_case` field names. Nothing here enforces cross-entity integrity:
//! a goal's exams are only linked by `Exam::goal_id`.

mod exam;
mod goal;
mod material;
mod message;
mod question;
mod user;

pub use exam::{Answer, Exam, NewExam};
pub use goal::{Goal, NewGoal};
pub use material::Material;
pub use message::Message;
pub use question::{NewQuestion, Question, QuestionUpdate};
pub use user::User;
